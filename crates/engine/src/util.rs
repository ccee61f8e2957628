//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the engine enforces the same rules for every entry point
//! (server, admin cli, tests).

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Normalize a required display name: NFC, trimmed, inner whitespace
/// collapsed, at most `max_chars` characters.
pub(crate) fn normalize_required_name(
    value: &str,
    field: &'static str,
    max_chars: usize,
) -> ResultEngine<String> {
    let mut out = String::new();
    for token in value.nfc().collect::<String>().split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    if out.chars().count() > max_chars {
        return Err(EngineError::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(out)
}

/// Trim optional free text; empty strings become `None`.
pub(crate) fn normalize_optional_text(
    value: Option<&str>,
    field: &'static str,
    max_chars: usize,
) -> ResultEngine<Option<String>> {
    let Some(text) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > max_chars {
        return Err(EngineError::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(Some(text.to_string()))
}

/// Validate a `#RRGGBB` color, falling back to `default` when missing.
pub(crate) fn normalize_color(value: Option<&str>, default: &str) -> ResultEngine<String> {
    let Some(color) = value.map(str::trim) else {
        return Ok(default.to_string());
    };
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(EngineError::validation("color", "expected #RRGGBB"));
    }
    Ok(color.to_string())
}

/// Icons are free-form (usually an emoji); blank falls back to `default`.
pub(crate) fn normalize_icon(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Require a strictly positive amount no larger than [`MoneyCents::MAX_AMOUNT`].
pub(crate) fn require_positive(amount: MoneyCents, field: &'static str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::validation(field, "must be greater than 0"));
    }
    require_within_limit(amount, field)
}

pub(crate) fn require_within_limit(amount: MoneyCents, field: &'static str) -> ResultEngine<()> {
    if !amount.within_limit() {
        return Err(EngineError::validation(
            field,
            format!("must not exceed {}", MoneyCents::MAX_AMOUNT),
        ));
    }
    Ok(())
}
