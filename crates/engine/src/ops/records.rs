use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    Category, CategorySnapshot, EngineError, IncomeStats, MonthlyRecord, MonthlyRecordUpdate,
    MoneyCents, NewMonthlyRecord, ResultEngine, allocation, category_snapshots, monthly_records,
};

use super::{Engine, categories::load_categories, current_year, with_tx};

/// Records newest-first with aggregates over their incomes.
#[derive(Clone, Debug, PartialEq)]
pub struct History {
    pub records: Vec<MonthlyRecord>,
    pub stats: IncomeStats,
}

impl Engine {
    /// Monthly records of the user, newest month first.
    pub async fn monthly_records(&self, user_id: i64) -> ResultEngine<Vec<MonthlyRecord>> {
        with_tx!(self, |db_tx| {
            let models = monthly_records::Entity::find()
                .filter(monthly_records::Column::UserId.eq(user_id))
                .order_by_desc(monthly_records::Column::Year)
                .order_by_desc(monthly_records::Column::Month)
                .all(&db_tx)
                .await?;
            hydrate_records(&db_tx, user_id, models).await
        })
    }

    pub async fn monthly_record(&self, record_id: i64, user_id: i64) -> ResultEngine<MonthlyRecord> {
        with_tx!(self, |db_tx| {
            let model = require_record(&db_tx, record_id, user_id).await?;
            hydrate_record(&db_tx, user_id, model).await
        })
    }

    /// The record registered for `year`/`month`, if any.
    pub async fn monthly_record_for(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> ResultEngine<Option<MonthlyRecord>> {
        with_tx!(self, |db_tx| {
            match find_month(&db_tx, user_id, year, month).await? {
                Some(model) => hydrate_record(&db_tx, user_id, model).await.map(Some),
                None => Ok(None),
            }
        })
    }

    /// Registers the income of a month and snapshots the active categories.
    ///
    /// Fails with [`EngineError::Precondition`] when the user has no active
    /// category and with [`EngineError::ExistingKey`] when the month is
    /// already registered.
    pub async fn new_monthly_record(
        &self,
        user_id: i64,
        input: &NewMonthlyRecord,
    ) -> ResultEngine<MonthlyRecord> {
        let notes = input.validate(current_year())?;
        let month_key = format!("{}-{:02}", input.year, input.month);
        with_tx!(self, |db_tx| {
            let categories = load_categories(&db_tx, user_id).await?;
            if allocation::active_in_order(&categories).is_empty() {
                return Err(EngineError::Precondition(
                    "create at least one active category first".to_string(),
                ));
            }
            if find_month(&db_tx, user_id, input.year, input.month)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(month_key));
            }

            let model = monthly_records::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                year: ActiveValue::Set(input.year),
                month: ActiveValue::Set(input.month as i32),
                income_minor: ActiveValue::Set(input.income.cents()),
                notes: ActiveValue::Set(notes),
                created_at: ActiveValue::Set(Utc::now()),
                updated_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| EngineError::from_insert(err, month_key.clone()))?;

            let snapshots = replace_snapshots(&db_tx, model.id, input.income, &categories).await?;
            tracing::info!(
                user_id,
                record_id = model.id,
                month = %month_key,
                income = %input.income,
                snapshots = snapshots.len(),
                "monthly record created"
            );
            Ok(MonthlyRecord::from_parts(model, snapshots, false))
        })
    }

    /// Changes income and notes, then recomputes the snapshots from the
    /// current categories and the new income.
    pub async fn update_monthly_record(
        &self,
        record_id: i64,
        user_id: i64,
        input: &MonthlyRecordUpdate,
    ) -> ResultEngine<MonthlyRecord> {
        with_tx!(self, |db_tx| {
            require_record(&db_tx, record_id, user_id).await?;
            let notes = input.validate()?;
            let categories = load_categories(&db_tx, user_id).await?;

            let model = monthly_records::ActiveModel {
                id: ActiveValue::Unchanged(record_id),
                income_minor: ActiveValue::Set(input.income.cents()),
                notes: ActiveValue::Set(notes),
                updated_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            let snapshots = replace_snapshots(&db_tx, record_id, input.income, &categories).await?;
            tracing::debug!(user_id, record_id, "monthly record updated");
            Ok(MonthlyRecord::from_parts(model, snapshots, false))
        })
    }

    /// Recomputes the snapshots from the current categories, keeping the
    /// stored income.
    pub async fn regenerate_snapshots(
        &self,
        record_id: i64,
        user_id: i64,
    ) -> ResultEngine<MonthlyRecord> {
        with_tx!(self, |db_tx| {
            let record = require_record(&db_tx, record_id, user_id).await?;
            let categories = load_categories(&db_tx, user_id).await?;
            if allocation::active_in_order(&categories).is_empty() {
                return Err(EngineError::Precondition(
                    "no active categories to regenerate from".to_string(),
                ));
            }

            let income = MoneyCents::new(record.income_minor);
            let model = monthly_records::ActiveModel {
                id: ActiveValue::Unchanged(record_id),
                updated_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            let snapshots = replace_snapshots(&db_tx, record_id, income, &categories).await?;
            tracing::debug!(user_id, record_id, "snapshots regenerated");
            Ok(MonthlyRecord::from_parts(model, snapshots, false))
        })
    }

    /// Deletes a record together with its snapshots.
    pub async fn delete_monthly_record(&self, record_id: i64, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_record(&db_tx, record_id, user_id).await?;
            category_snapshots::Entity::delete_many()
                .filter(category_snapshots::Column::RecordId.eq(record_id))
                .exec(&db_tx)
                .await?;
            monthly_records::Entity::delete_by_id(record_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// All records (newest first) plus income statistics.
    pub async fn history(&self, user_id: i64) -> ResultEngine<History> {
        let records = self.monthly_records(user_id).await?;
        let stats = IncomeStats::from_records(&records)?;
        Ok(History { records, stats })
    }
}

pub(super) async fn require_record<C: ConnectionTrait>(
    db: &C,
    record_id: i64,
    user_id: i64,
) -> ResultEngine<monthly_records::Model> {
    monthly_records::Entity::find_by_id(record_id)
        .filter(monthly_records::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("monthly record not exists".to_string()))
}

async fn find_month<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    year: i32,
    month: u32,
) -> ResultEngine<Option<monthly_records::Model>> {
    Ok(monthly_records::Entity::find()
        .filter(monthly_records::Column::UserId.eq(user_id))
        .filter(monthly_records::Column::Year.eq(year))
        .filter(monthly_records::Column::Month.eq(month as i32))
        .one(db)
        .await?)
}

/// Drops the snapshots of `record_id` and stores a fresh allocation of
/// `income` over the active `categories`.
async fn replace_snapshots(
    db_tx: &DatabaseTransaction,
    record_id: i64,
    income: MoneyCents,
    categories: &[Category],
) -> ResultEngine<Vec<CategorySnapshot>> {
    category_snapshots::Entity::delete_many()
        .filter(category_snapshots::Column::RecordId.eq(record_id))
        .exec(db_tx)
        .await?;

    let mut snapshots = Vec::new();
    for (position, allocation) in allocation::allocate(income, categories)
        .into_iter()
        .enumerate()
    {
        let model = category_snapshots::ActiveModel {
            id: ActiveValue::NotSet,
            record_id: ActiveValue::Set(record_id),
            position: ActiveValue::Set(position as i32),
            category_name: ActiveValue::Set(allocation.category_name),
            percentage: ActiveValue::Set(allocation.percentage),
            color: ActiveValue::Set(allocation.color),
            icon: ActiveValue::Set(allocation.icon),
            amount_minor: ActiveValue::Set(allocation.amount.cents()),
        }
        .insert(db_tx)
        .await?;
        snapshots.push(CategorySnapshot::from(model));
    }
    Ok(snapshots)
}

async fn hydrate_record<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    model: monthly_records::Model,
) -> ResultEngine<MonthlyRecord> {
    let mut records = hydrate_records(db, user_id, vec![model]).await?;
    records
        .pop()
        .ok_or_else(|| EngineError::KeyNotFound("monthly record not exists".to_string()))
}

/// Attaches snapshots (in position order) and the staleness flag.
pub(super) async fn hydrate_records<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    models: Vec<monthly_records::Model>,
) -> ResultEngine<Vec<MonthlyRecord>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let latest_change =
        allocation::latest_category_change(&load_categories(db, user_id).await?);

    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let mut by_record: HashMap<i64, Vec<CategorySnapshot>> = HashMap::new();
    for snapshot in category_snapshots::Entity::find()
        .filter(category_snapshots::Column::RecordId.is_in(ids))
        .order_by_asc(category_snapshots::Column::RecordId)
        .order_by_asc(category_snapshots::Column::Position)
        .order_by_asc(category_snapshots::Column::Id)
        .all(db)
        .await?
    {
        let record_id = snapshot.record_id;
        by_record
            .entry(record_id)
            .or_default()
            .push(CategorySnapshot::from(snapshot));
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let synced_at = model.updated_at.unwrap_or(model.created_at);
            let stale = allocation::is_stale(synced_at, latest_change);
            let snapshots = by_record.remove(&model.id).unwrap_or_default();
            MonthlyRecord::from_parts(model, snapshots, stale)
        })
        .collect())
}
