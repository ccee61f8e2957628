//! Users table and password hashing.
//!
//! Passwords are stored as bcrypt hashes (`$2b$<cost>$...`), the salt is
//! embedded in the hash.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::ResultEngine;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// bcrypt work factor used unless the engine is built with another one.
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// An account owner. Every other row is scoped by `User::id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
    #[sea_orm(has_many = "super::monthly_records::Entity")]
    MonthlyRecords,
    #[sea_orm(has_many = "super::savings_goals::Entity")]
    SavingsGoals,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::monthly_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyRecords.def()
    }
}

impl Related<super::savings_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsGoals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn hash_password(password: &str, cost: u32) -> ResultEngine<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// `false` for a wrong password and for a stored hash bcrypt cannot read.
pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(valid) => valid,
        Err(err) => {
            tracing::warn!("unreadable password hash: {err}");
            false
        }
    }
}
