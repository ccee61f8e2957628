//! Monthly records: one gross income per user and calendar month.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{
    CategorySnapshot, EngineError, MoneyCents, ResultEngine,
    util::{normalize_optional_text, require_positive},
};

/// First year accepted for a record.
pub const MIN_YEAR: i32 = 2020;
const MAX_NOTES_CHARS: usize = 500;

/// A month's gross income with the category breakdown captured for it.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyRecord {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub income: MoneyCents,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Snapshots in category display order.
    pub snapshots: Vec<CategorySnapshot>,
    /// `true` when some live category changed after the snapshots were taken.
    pub stale: bool,
}

impl MonthlyRecord {
    /// Moment the snapshots were last synchronized with the categories.
    pub fn synced_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Sum of the snapshot amounts. Differs from `income` when the
    /// percentages did not add up to 100.
    pub fn allocated(&self) -> ResultEngine<MoneyCents> {
        MoneyCents::try_sum(self.snapshots.iter().map(|s| s.amount))
    }

    pub(crate) fn from_parts(model: Model, snapshots: Vec<CategorySnapshot>, stale: bool) -> Self {
        Self {
            id: model.id,
            year: model.year,
            month: model.month as u32,
            income: MoneyCents::new(model.income_minor),
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            snapshots,
            stale,
        }
    }
}

/// Input for registering the income of a month.
#[derive(Clone, Debug)]
pub struct NewMonthlyRecord {
    pub year: i32,
    pub month: u32,
    pub income: MoneyCents,
    pub notes: Option<String>,
}

impl NewMonthlyRecord {
    /// Validates ranges; years are accepted up to `current_year + 1`.
    pub(crate) fn validate(&self, current_year: i32) -> ResultEngine<Option<String>> {
        if self.year < MIN_YEAR || self.year > current_year + 1 {
            return Err(EngineError::validation(
                "year",
                format!("must be between {MIN_YEAR} and {}", current_year + 1),
            ));
        }
        if !(1..=12).contains(&self.month) {
            return Err(EngineError::validation("month", "must be between 1 and 12"));
        }
        validate_income_and_notes(self.income, self.notes.as_deref())
    }
}

/// Input for editing the income and notes of an existing record.
#[derive(Clone, Debug)]
pub struct MonthlyRecordUpdate {
    pub income: MoneyCents,
    pub notes: Option<String>,
}

impl MonthlyRecordUpdate {
    pub(crate) fn validate(&self) -> ResultEngine<Option<String>> {
        validate_income_and_notes(self.income, self.notes.as_deref())
    }
}

fn validate_income_and_notes(income: MoneyCents, notes: Option<&str>) -> ResultEngine<Option<String>> {
    require_positive(income, "income")?;
    normalize_optional_text(notes, "notes", MAX_NOTES_CHARS)
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "monthly_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub year: i32,
    pub month: i32,
    pub income_minor: i64,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::category_snapshots::Entity")]
    Snapshots,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::category_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Snapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
