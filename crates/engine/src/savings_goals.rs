//! Savings goals ("piggy banks") and the ledger math derived from their
//! contributions.
//!
//! A goal never stores its balance: [`SavingsGoal::balance`] sums the
//! contributions every time it is asked, failing instead of wrapping when the
//! total leaves the `i64` range.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

use crate::{
    Contribution, MoneyCents, ResultEngine,
    util::{
        normalize_color, normalize_icon, normalize_optional_text, normalize_required_name,
        require_positive,
    },
};

pub const DEFAULT_COLOR: &str = "#4ECDC4";
pub const DEFAULT_ICON: &str = "🐷";
const MAX_NAME_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 200;

/// A savings goal with its contributions (newest date first).
#[derive(Clone, Debug, PartialEq)]
pub struct SavingsGoal {
    pub id: i64,
    pub name: String,
    pub target: MoneyCents,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub target_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub contributions: Vec<Contribution>,
}

/// Balance after one contribution, as returned by [`SavingsGoal::balance_history`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalancePoint {
    pub contribution_id: i64,
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub balance: MoneyCents,
}

impl SavingsGoal {
    /// Sum of all contributions. May be negative.
    pub fn balance(&self) -> ResultEngine<MoneyCents> {
        MoneyCents::try_sum(self.contributions.iter().map(|c| c.amount))
    }

    /// `balance / target`, capped at `1.0` but not floored: withdrawals below
    /// zero give a negative progress.
    pub fn progress(&self) -> ResultEngine<f64> {
        if !self.target.is_positive() {
            return Ok(0.0);
        }
        let balance = self.balance()?;
        Ok((balance.cents() as f64 / self.target.cents() as f64).min(1.0))
    }

    pub fn is_complete(&self) -> ResultEngine<bool> {
        Ok(self.progress()? >= 1.0)
    }

    /// What is still missing to reach the target, never negative.
    pub fn remaining(&self) -> ResultEngine<MoneyCents> {
        let missing = self.target.try_sub(self.balance()?)?;
        Ok(if missing.is_negative() {
            MoneyCents::ZERO
        } else {
            missing
        })
    }

    /// Running balance ordered by date (ties by id).
    pub fn balance_history(&self) -> ResultEngine<Vec<BalancePoint>> {
        let mut ordered: Vec<&Contribution> = self.contributions.iter().collect();
        ordered.sort_by_key(|c| (c.date, c.id));

        let mut balance = MoneyCents::ZERO;
        let mut points = Vec::with_capacity(ordered.len());
        for c in ordered {
            balance = balance.try_add(c.amount)?;
            points.push(BalancePoint {
                contribution_id: c.id,
                date: c.date,
                amount: c.amount,
                balance,
            });
        }
        Ok(points)
    }

    pub(crate) fn from_parts(model: Model, contributions: Vec<Contribution>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            target: MoneyCents::new(model.target_minor),
            description: model.description,
            color: model.color,
            icon: model.icon,
            target_date: model.target_date,
            active: model.active,
            created_at: model.created_at,
            contributions,
        }
    }
}

/// Input for creating or replacing a goal.
#[derive(Clone, Debug, Default)]
pub struct GoalInput {
    pub name: String,
    pub target: MoneyCents,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GoalFields {
    pub(crate) name: String,
    pub(crate) target: MoneyCents,
    pub(crate) description: Option<String>,
    pub(crate) color: String,
    pub(crate) icon: String,
    pub(crate) target_date: Option<NaiveDate>,
    pub(crate) active: bool,
}

impl GoalInput {
    pub(crate) fn validate(&self) -> ResultEngine<GoalFields> {
        let name = normalize_required_name(&self.name, "name", MAX_NAME_CHARS)?;
        require_positive(self.target, "target")?;
        Ok(GoalFields {
            name,
            target: self.target,
            description: normalize_optional_text(
                self.description.as_deref(),
                "description",
                MAX_DESCRIPTION_CHARS,
            )?,
            color: normalize_color(self.color.as_deref(), DEFAULT_COLOR)?,
            icon: normalize_icon(self.icon.as_deref(), DEFAULT_ICON),
            target_date: self.target_date,
            active: self.active.unwrap_or(true),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_minor: i64,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub target_date: Option<Date>,
    pub active: bool,
    pub created_at: DateTimeUtc,
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
    #[sea_orm(has_many = "super::contributions::Entity")]
    Contributions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn goal(target: i64, amounts: &[(i64, u32)]) -> SavingsGoal {
        let contributions = amounts
            .iter()
            .enumerate()
            .map(|(i, (amount, d))| Contribution {
                id: i as i64 + 1,
                goal_id: 1,
                amount: MoneyCents::new(*amount),
                date: day(*d),
                notes: None,
                created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            })
            .collect();
        SavingsGoal {
            id: 1,
            name: "Trip".to_string(),
            target: MoneyCents::new(target),
            description: None,
            color: DEFAULT_COLOR.to_string(),
            icon: DEFAULT_ICON.to_string(),
            target_date: None,
            active: true,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            contributions,
        }
    }

    #[test]
    fn deposits_and_withdrawals() {
        let goal = goal(50_000, &[(20_000, 1), (10_000, 2), (-5_000, 3)]);
        assert_eq!(goal.balance().unwrap(), MoneyCents::new(25_000));
        assert_eq!(goal.progress().unwrap(), 0.5);
        assert!(!goal.is_complete().unwrap());
        assert_eq!(goal.remaining().unwrap(), MoneyCents::new(25_000));
    }

    #[test]
    fn progress_is_capped_at_one() {
        let goal = goal(50_000, &[(60_000, 1)]);
        assert_eq!(goal.balance().unwrap(), MoneyCents::new(60_000));
        assert_eq!(goal.progress().unwrap(), 1.0);
        assert!(goal.is_complete().unwrap());
        assert_eq!(goal.remaining().unwrap(), MoneyCents::ZERO);
    }

    #[test]
    fn negative_balance_is_not_floored() {
        let goal = goal(10_000, &[(-2_500, 1)]);
        assert_eq!(goal.balance().unwrap(), MoneyCents::new(-2_500));
        assert_eq!(goal.progress().unwrap(), -0.25);
        assert_eq!(goal.remaining().unwrap(), MoneyCents::new(12_500));
    }

    #[test]
    fn empty_goal() {
        let goal = goal(10_000, &[]);
        assert_eq!(goal.balance().unwrap(), MoneyCents::ZERO);
        assert_eq!(goal.progress().unwrap(), 0.0);
        assert!(goal.balance_history().unwrap().is_empty());
    }

    #[test]
    fn history_runs_in_date_order() {
        let goal = goal(10_000, &[(500, 9), (1_000, 2), (-200, 9), (300, 5)]);
        let history = goal.balance_history().unwrap();
        let balances: Vec<i64> = history.iter().map(|p| p.balance.cents()).collect();
        assert_eq!(balances, vec![1_000, 1_300, 1_800, 1_600]);
        assert_eq!(history.last().unwrap().balance, goal.balance().unwrap());
    }

    #[test]
    fn overflowing_ledger_is_an_error() {
        let overflowing = goal(10_000, &[(i64::MAX, 1), (i64::MAX, 2)]);
        assert_eq!(overflowing.balance().unwrap_err().field(), Some("amount"));
        assert!(overflowing.progress().is_err());
        assert!(overflowing.remaining().is_err());
        assert!(overflowing.balance_history().is_err());

        // the total fits but `target - balance` does not
        let drained = goal(10_000, &[(i64::MIN + 1, 1)]);
        assert!(drained.balance().is_ok());
        assert!(drained.remaining().is_err());
    }

    #[test]
    fn validation() {
        let mut input = GoalInput {
            name: "Trip".to_string(),
            target: MoneyCents::new(50_000),
            ..Default::default()
        };
        let fields = input.validate().unwrap();
        assert_eq!(fields.color, DEFAULT_COLOR);
        assert_eq!(fields.icon, DEFAULT_ICON);
        assert!(fields.active);

        input.target = MoneyCents::ZERO;
        assert_eq!(input.validate().unwrap_err().field(), Some("target"));

        input.target = MoneyCents::new(1);
        input.description = Some("d".repeat(201));
        assert_eq!(input.validate().unwrap_err().field(), Some("description"));
    }
}
