use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Contribution, EngineError, GoalInput, NewContribution, ResultEngine, SavingsGoal,
    contributions, savings_goals, savings_goals::GoalFields,
};

use super::{Engine, with_tx};

impl Engine {
    /// Goals of the user, newest first, each with its contributions.
    pub async fn savings_goals(&self, user_id: i64) -> ResultEngine<Vec<SavingsGoal>> {
        with_tx!(self, |db_tx| {
            let models = savings_goals::Entity::find()
                .filter(savings_goals::Column::UserId.eq(user_id))
                .order_by_desc(savings_goals::Column::CreatedAt)
                .order_by_desc(savings_goals::Column::Id)
                .all(&db_tx)
                .await?;
            hydrate_goals(&db_tx, models).await
        })
    }

    pub async fn savings_goal(&self, goal_id: i64, user_id: i64) -> ResultEngine<SavingsGoal> {
        with_tx!(self, |db_tx| {
            let model = require_goal(&db_tx, goal_id, user_id).await?;
            let contributions = load_contributions(&db_tx, goal_id).await?;
            Ok(SavingsGoal::from_parts(model, contributions))
        })
    }

    /// Active goals whose balance is still below the target.
    pub async fn goals_in_progress(&self, user_id: i64) -> ResultEngine<Vec<SavingsGoal>> {
        let mut in_progress = Vec::new();
        for goal in self.savings_goals(user_id).await? {
            if goal.active && goal.balance()? < goal.target {
                in_progress.push(goal);
            }
        }
        Ok(in_progress)
    }

    /// Creates a goal. Its balance starts at zero.
    pub async fn new_savings_goal(
        &self,
        user_id: i64,
        input: &GoalInput,
    ) -> ResultEngine<SavingsGoal> {
        let fields = input.validate()?;
        let model = savings_goals::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..fields_to_active(fields)
        }
        .insert(&self.database)
        .await?;
        tracing::debug!(user_id, goal_id = model.id, "savings goal created");
        Ok(SavingsGoal::from_parts(model, Vec::new()))
    }

    /// Replaces the editable fields of a goal. Contributions are kept.
    pub async fn update_savings_goal(
        &self,
        goal_id: i64,
        user_id: i64,
        input: &GoalInput,
    ) -> ResultEngine<SavingsGoal> {
        with_tx!(self, |db_tx| {
            require_goal(&db_tx, goal_id, user_id).await?;
            let fields = input.validate()?;
            let model = savings_goals::ActiveModel {
                id: ActiveValue::Unchanged(goal_id),
                ..fields_to_active(fields)
            }
            .update(&db_tx)
            .await?;
            let contributions = load_contributions(&db_tx, goal_id).await?;
            Ok(SavingsGoal::from_parts(model, contributions))
        })
    }

    /// Deletes a goal and all of its contributions.
    pub async fn delete_savings_goal(&self, goal_id: i64, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_goal(&db_tx, goal_id, user_id).await?;
            contributions::Entity::delete_many()
                .filter(contributions::Column::GoalId.eq(goal_id))
                .exec(&db_tx)
                .await?;
            savings_goals::Entity::delete_by_id(goal_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Appends a deposit (positive) or withdrawal (negative) to a goal.
    ///
    /// The balance may go below zero, but a contribution that would push the
    /// ledger out of the representable range is rejected.
    pub async fn add_contribution(
        &self,
        goal_id: i64,
        user_id: i64,
        input: &NewContribution,
    ) -> ResultEngine<Contribution> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let goal = require_goal(&db_tx, goal_id, user_id).await?;
            let notes = input.validate()?;
            let mut ledger = load_contributions(&db_tx, goal_id).await?;
            let model = contributions::ActiveModel {
                id: ActiveValue::NotSet,
                goal_id: ActiveValue::Set(goal_id),
                amount_minor: ActiveValue::Set(input.amount.cents()),
                date: ActiveValue::Set(input.date.unwrap_or_else(|| now.date_naive())),
                notes: ActiveValue::Set(notes),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            let contribution = Contribution::from(model);

            ledger.push(contribution.clone());
            let goal = SavingsGoal::from_parts(goal, ledger);
            goal.balance_history()?;
            goal.remaining()?;
            tracing::debug!(
                user_id,
                goal_id,
                amount = %contribution.amount,
                "contribution added"
            );
            Ok(contribution)
        })
    }

    /// Removes one contribution. A contribution of another goal, or of a goal
    /// owned by somebody else, is reported as missing.
    pub async fn delete_contribution(
        &self,
        goal_id: i64,
        contribution_id: i64,
        user_id: i64,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_goal(&db_tx, goal_id, user_id).await?;
            let result = contributions::Entity::delete_many()
                .filter(contributions::Column::Id.eq(contribution_id))
                .filter(contributions::Column::GoalId.eq(goal_id))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(
                    "contribution not exists".to_string(),
                ));
            }
            Ok(())
        })
    }
}

fn fields_to_active(fields: GoalFields) -> savings_goals::ActiveModel {
    savings_goals::ActiveModel {
        name: ActiveValue::Set(fields.name),
        target_minor: ActiveValue::Set(fields.target.cents()),
        description: ActiveValue::Set(fields.description),
        color: ActiveValue::Set(fields.color),
        icon: ActiveValue::Set(fields.icon),
        target_date: ActiveValue::Set(fields.target_date),
        active: ActiveValue::Set(fields.active),
        ..Default::default()
    }
}

async fn require_goal<C: ConnectionTrait>(
    db: &C,
    goal_id: i64,
    user_id: i64,
) -> ResultEngine<savings_goals::Model> {
    savings_goals::Entity::find_by_id(goal_id)
        .filter(savings_goals::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("savings goal not exists".to_string()))
}

/// Contributions of one goal, newest date first.
async fn load_contributions<C: ConnectionTrait>(
    db: &C,
    goal_id: i64,
) -> ResultEngine<Vec<Contribution>> {
    let models = contributions::Entity::find()
        .filter(contributions::Column::GoalId.eq(goal_id))
        .order_by_desc(contributions::Column::Date)
        .order_by_desc(contributions::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Contribution::from).collect())
}

async fn hydrate_goals<C: ConnectionTrait>(
    db: &C,
    models: Vec<savings_goals::Model>,
) -> ResultEngine<Vec<SavingsGoal>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let mut by_goal: HashMap<i64, Vec<Contribution>> = HashMap::new();
    for model in contributions::Entity::find()
        .filter(contributions::Column::GoalId.is_in(ids))
        .order_by_desc(contributions::Column::Date)
        .order_by_desc(contributions::Column::Id)
        .all(db)
        .await?
    {
        by_goal
            .entry(model.goal_id)
            .or_default()
            .push(Contribution::from(model));
    }
    Ok(models
        .into_iter()
        .map(|model| {
            let contributions = by_goal.remove(&model.id).unwrap_or_default();
            SavingsGoal::from_parts(model, contributions)
        })
        .collect())
}
