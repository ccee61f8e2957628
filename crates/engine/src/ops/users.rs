use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, MIN_PASSWORD_LEN, ResultEngine, User, users,
    users::{hash_password, verify_password},
    util::normalize_required_name,
};

use super::{Engine, with_tx};

const MAX_USERNAME_CHARS: usize = 50;

/// Categories every new user starts with. They add up to 100.
const DEFAULT_CATEGORIES: &[(&str, f64)] = &[
    ("Housing", 30.0),
    ("Food", 20.0),
    ("Transport", 10.0),
    ("Leisure", 10.0),
    ("Savings", 20.0),
    ("Other", 10.0),
];

impl Engine {
    /// Creates a user and seeds the default categories.
    pub async fn new_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_required_name(username, "username", MAX_USERNAME_CHARS)?;
        validate_password(password)?;
        let password_hash = hash_password(password, self.password_cost)?;
        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Username.eq(username.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username.clone()),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| EngineError::from_insert(err, username.clone()))?;

            Self::seed_categories(&db_tx, model.id, DEFAULT_CATEGORIES).await?;
            tracing::info!(user_id = model.id, username = %model.username, "user created");
            Ok(User::from(model))
        })
    }

    /// Resolves a username/password pair to a user.
    ///
    /// Unknown usernames and wrong passwords give the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?;
        match model {
            Some(model) if verify_password(password, &model.password_hash) => Ok(model.into()),
            _ => Err(EngineError::InvalidCredentials(
                "wrong username or password".to_string(),
            )),
        }
    }

    pub async fn user(&self, user_id: i64) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(model.into())
    }

    /// Changes the password after checking the current one.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> ResultEngine<()> {
        validate_password(new_password)?;
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            if !verify_password(current_password, &model.password_hash) {
                return Err(EngineError::InvalidCredentials(
                    "current password is wrong".to_string(),
                ));
            }
            store_password(&db_tx, user_id, new_password, self.password_cost).await
        })
    }

    /// Sets a new password without checking the old one (admin use).
    pub async fn reset_password(&self, username: &str, new_password: &str) -> ResultEngine<()> {
        validate_password(new_password)?;
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            store_password(&db_tx, model.id, new_password, self.password_cost).await
        })
    }
}

fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

async fn store_password<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    password: &str,
    cost: u32,
) -> ResultEngine<()> {
    users::ActiveModel {
        id: ActiveValue::Unchanged(user_id),
        password_hash: ActiveValue::Set(hash_password(password, cost)?),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}
