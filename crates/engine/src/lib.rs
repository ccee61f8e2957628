//! Core of pocketplan: income allocation across budget categories and
//! savings-goal ledgers, persisted with sea-orm.
//!
//! [`Engine`] is the only entry point that touches the database. Every
//! operation takes the caller's user id and never reads or writes rows owned
//! by somebody else.

pub use allocation::{Allocation, IncomeStats};
pub use categories::{Category, CategoryInput};
pub use category_snapshots::CategorySnapshot;
pub use contributions::{Contribution, NewContribution};
pub use error::EngineError;
pub use money::MoneyCents;
pub use monthly_records::{MonthlyRecord, MonthlyRecordUpdate, NewMonthlyRecord};
pub use ops::{CategoryOverview, Dashboard, Engine, EngineBuilder, History};
pub use savings_goals::{BalancePoint, GoalInput, SavingsGoal};
pub use users::{DEFAULT_PASSWORD_COST, MIN_PASSWORD_LEN, User};

pub mod allocation;
pub mod categories;
pub mod category_snapshots;
pub mod contributions;
mod error;
mod money;
pub mod monthly_records;
mod ops;
pub mod savings_goals;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
