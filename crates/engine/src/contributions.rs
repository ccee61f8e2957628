//! Signed deposits and withdrawals on a savings goal.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    util::{normalize_optional_text, require_within_limit},
};

const MAX_NOTES_CHARS: usize = 200;

/// One ledger line. Positive amounts are deposits, negative ones withdrawals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub id: i64,
    pub goal_id: i64,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Contribution {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            goal_id: model.goal_id,
            amount: MoneyCents::new(model.amount_minor),
            date: model.date,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewContribution {
    pub amount: MoneyCents,
    /// Defaults to today when missing.
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewContribution {
    pub(crate) fn validate(&self) -> ResultEngine<Option<String>> {
        if self.amount.is_zero() {
            return Err(EngineError::validation("amount", "must not be zero"));
        }
        require_within_limit(self.amount, "amount")?;
        normalize_optional_text(self.notes.as_deref(), "notes", MAX_NOTES_CHARS)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contributions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub goal_id: i64,
    pub amount_minor: i64,
    pub date: Date,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::savings_goals::Entity",
        from = "Column::GoalId",
        to = "super::savings_goals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Goal,
}

impl Related<super::savings_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
