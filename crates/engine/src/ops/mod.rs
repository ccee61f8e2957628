use chrono::{Datelike, Utc};
use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, users::DEFAULT_PASSWORD_COST};

/// Work factors bcrypt accepts.
const PASSWORD_COSTS: std::ops::RangeInclusive<u32> = 4..=31;

mod categories;
mod dashboard;
mod goals;
mod records;
mod users;

pub use categories::CategoryOverview;
pub use dashboard::Dashboard;
pub use records::History;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    password_cost: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    password_cost: Option<u32>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// bcrypt work factor for new password hashes, [`DEFAULT_PASSWORD_COST`]
    /// when not set.
    pub fn password_cost(mut self, cost: u32) -> EngineBuilder {
        self.password_cost = Some(cost);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let password_cost = self.password_cost.unwrap_or(DEFAULT_PASSWORD_COST);
        if !PASSWORD_COSTS.contains(&password_cost) {
            return Err(EngineError::validation(
                "password_cost",
                format!(
                    "must be between {} and {}",
                    PASSWORD_COSTS.start(),
                    PASSWORD_COSTS.end()
                ),
            ));
        }
        Ok(Engine {
            database: self.database,
            password_cost,
        })
    }
}
