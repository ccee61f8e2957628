//! Budget categories: named buckets receiving a percentage of the income.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{
    EngineError, ResultEngine,
    util::{normalize_color, normalize_icon, normalize_required_name},
};

pub const DEFAULT_COLOR: &str = "#6366f1";
pub const DEFAULT_ICON: &str = "💰";
const MAX_NAME_CHARS: usize = 50;
const MIN_PERCENTAGE: f64 = 0.1;
const MAX_PERCENTAGE: f64 = 100.0;

/// A live category definition.
///
/// Categories are freely editable; monthly records never reference them,
/// they copy them into snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub percentage: f64,
    pub color: String,
    pub icon: String,
    pub display_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Last time this definition changed (creation counts as a change).
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.created_at.max(self.updated_at)
    }
}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            percentage: model.percentage,
            color: model.color,
            icon: model.icon,
            display_order: model.display_order,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Input for creating or replacing a category.
#[derive(Clone, Debug, Default)]
pub struct CategoryInput {
    pub name: String,
    pub percentage: f64,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub display_order: Option<i32>,
    pub active: Option<bool>,
}

/// Validated and normalized [`CategoryInput`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CategoryFields {
    pub(crate) name: String,
    pub(crate) percentage: f64,
    pub(crate) color: String,
    pub(crate) icon: String,
    pub(crate) display_order: i32,
    pub(crate) active: bool,
}

impl CategoryInput {
    pub(crate) fn validate(&self) -> ResultEngine<CategoryFields> {
        let name = normalize_required_name(&self.name, "name", MAX_NAME_CHARS)?;
        if !self.percentage.is_finite()
            || self.percentage < MIN_PERCENTAGE
            || self.percentage > MAX_PERCENTAGE
        {
            return Err(EngineError::validation(
                "percentage",
                format!("must be between {MIN_PERCENTAGE} and {MAX_PERCENTAGE}"),
            ));
        }
        Ok(CategoryFields {
            name,
            percentage: self.percentage,
            color: normalize_color(self.color.as_deref(), DEFAULT_COLOR)?,
            icon: normalize_icon(self.icon.as_deref(), DEFAULT_ICON),
            display_order: self.display_order.unwrap_or(0),
            active: self.active.unwrap_or(true),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[sea_orm(column_type = "Double")]
    pub percentage: f64,
    pub color: String,
    pub icon: String,
    pub display_order: i32,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
