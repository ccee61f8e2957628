use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Category, CategoryInput, EngineError, ResultEngine, allocation, categories,
    categories::CategoryFields,
};

use super::{Engine, with_tx};

/// Categories with the allocation summary shown next to them.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryOverview {
    pub categories: Vec<Category>,
    /// Sum of the active percentages.
    pub total_percentage: f64,
    /// `true` when the active percentages add up to 100.
    pub balanced: bool,
}

impl Engine {
    /// All categories of the user (active or not) in display order.
    pub async fn categories(&self, user_id: i64) -> ResultEngine<Vec<Category>> {
        load_categories(&self.database, user_id).await
    }

    pub async fn category_overview(&self, user_id: i64) -> ResultEngine<CategoryOverview> {
        let categories = self.categories(user_id).await?;
        Ok(CategoryOverview {
            total_percentage: allocation::total_percentage(&categories),
            balanced: allocation::is_balanced(&categories),
            categories,
        })
    }

    pub async fn category(&self, category_id: i64, user_id: i64) -> ResultEngine<Category> {
        let model = require_category(&self.database, category_id, user_id).await?;
        Ok(model.into())
    }

    /// Creates a category. Existing monthly records are not touched; they
    /// become stale until regenerated.
    pub async fn new_category(&self, user_id: i64, input: &CategoryInput) -> ResultEngine<Category> {
        let fields = input.validate()?;
        let now = Utc::now();
        let active = categories::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..fields_to_active(fields)
        };
        let model = active.insert(&self.database).await?;
        Ok(model.into())
    }

    /// Replaces the editable fields of a category and bumps `updated_at`.
    pub async fn update_category(
        &self,
        category_id: i64,
        user_id: i64,
        input: &CategoryInput,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            require_category(&db_tx, category_id, user_id).await?;
            let fields = input.validate()?;
            let active = categories::ActiveModel {
                id: ActiveValue::Unchanged(category_id),
                updated_at: ActiveValue::Set(Utc::now()),
                ..fields_to_active(fields)
            };
            let model = active.update(&db_tx).await?;
            Ok(Category::from(model))
        })
    }

    /// Deletes a category. Snapshots already taken keep their copy.
    pub async fn delete_category(&self, category_id: i64, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_category(&db_tx, category_id, user_id).await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Inserts the given categories in order, numbering `display_order` from 0.
    pub(super) async fn seed_categories<C: ConnectionTrait>(
        db: &C,
        user_id: i64,
        defaults: &[(&str, f64)],
    ) -> ResultEngine<()> {
        let now = Utc::now();
        for (position, (name, percentage)) in defaults.iter().enumerate() {
            let fields = CategoryInput {
                name: (*name).to_string(),
                percentage: *percentage,
                display_order: Some(position as i32),
                ..Default::default()
            }
            .validate()?;
            categories::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..fields_to_active(fields)
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }
}

fn fields_to_active(fields: CategoryFields) -> categories::ActiveModel {
    categories::ActiveModel {
        name: ActiveValue::Set(fields.name),
        percentage: ActiveValue::Set(fields.percentage),
        color: ActiveValue::Set(fields.color),
        icon: ActiveValue::Set(fields.icon),
        display_order: ActiveValue::Set(fields.display_order),
        active: ActiveValue::Set(fields.active),
        ..Default::default()
    }
}

/// All categories of `user_id`, ordered by (`display_order`, `id`).
pub(super) async fn load_categories<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> ResultEngine<Vec<Category>> {
    let models = categories::Entity::find()
        .filter(categories::Column::UserId.eq(user_id))
        .order_by_asc(categories::Column::DisplayOrder)
        .order_by_asc(categories::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Category::from).collect())
}

async fn require_category<C: ConnectionTrait>(
    db: &C,
    category_id: i64,
    user_id: i64,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .filter(categories::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
}
