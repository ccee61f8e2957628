//! Conversions from engine values to the JSON views of `api_types`.

use api_types::{
    category::CategoryView,
    goal::{BalancePointView, ContributionView, GoalDetail, GoalView},
    overview::IncomeStatsView,
    record::{RecordView, SnapshotView},
    user::UserView,
};
use engine::{
    BalancePoint, Category, CategorySnapshot, Contribution, IncomeStats, MonthlyRecord,
    SavingsGoal, User,
};

use crate::ServerError;

pub(crate) fn category(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        percentage: category.percentage,
        color: category.color,
        icon: category.icon,
        display_order: category.display_order,
        active: category.active,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

fn snapshot(snapshot: CategorySnapshot) -> SnapshotView {
    SnapshotView {
        id: snapshot.id,
        category_name: snapshot.category_name,
        percentage: snapshot.percentage,
        color: snapshot.color,
        icon: snapshot.icon,
        amount_minor: snapshot.amount.cents(),
    }
}

pub(crate) fn record(record: MonthlyRecord) -> Result<RecordView, ServerError> {
    Ok(RecordView {
        id: record.id,
        year: record.year,
        month: record.month,
        income_minor: record.income.cents(),
        allocated_minor: record.allocated()?.cents(),
        notes: record.notes,
        created_at: record.created_at,
        updated_at: record.updated_at,
        stale: record.stale,
        snapshots: record.snapshots.into_iter().map(snapshot).collect(),
    })
}

pub(crate) fn contribution(contribution: Contribution) -> ContributionView {
    ContributionView {
        id: contribution.id,
        amount_minor: contribution.amount.cents(),
        date: contribution.date,
        notes: contribution.notes,
        created_at: contribution.created_at,
    }
}

fn balance_point(point: BalancePoint) -> BalancePointView {
    BalancePointView {
        contribution_id: point.contribution_id,
        date: point.date,
        amount_minor: point.amount.cents(),
        balance_minor: point.balance.cents(),
    }
}

pub(crate) fn goal(goal: SavingsGoal) -> Result<GoalView, ServerError> {
    // derived values first, the goal is consumed below
    let balance_minor = goal.balance()?.cents();
    let remaining_minor = goal.remaining()?.cents();
    let progress = goal.progress()?;
    let complete = goal.is_complete()?;
    Ok(GoalView {
        id: goal.id,
        name: goal.name,
        target_minor: goal.target.cents(),
        description: goal.description,
        color: goal.color,
        icon: goal.icon,
        target_date: goal.target_date,
        active: goal.active,
        created_at: goal.created_at,
        balance_minor,
        remaining_minor,
        progress,
        complete,
        contributions: goal.contributions.into_iter().map(contribution).collect(),
    })
}

pub(crate) fn goal_detail(savings_goal: SavingsGoal) -> Result<GoalDetail, ServerError> {
    let balance_history = savings_goal
        .balance_history()?
        .into_iter()
        .map(balance_point)
        .collect();
    Ok(GoalDetail {
        goal: goal(savings_goal)?,
        balance_history,
    })
}

pub(crate) fn records(records: Vec<MonthlyRecord>) -> Result<Vec<RecordView>, ServerError> {
    records.into_iter().map(record).collect()
}

pub(crate) fn goals(goals: Vec<SavingsGoal>) -> Result<Vec<GoalView>, ServerError> {
    goals.into_iter().map(goal).collect()
}

pub(crate) fn income_stats(stats: IncomeStats) -> IncomeStatsView {
    IncomeStatsView {
        months: stats.months,
        total_minor: stats.total.cents(),
        average_minor: stats.average.cents(),
        best_minor: stats.best.cents(),
    }
}

pub(crate) fn user(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        created_at: user.created_at,
    }
}
