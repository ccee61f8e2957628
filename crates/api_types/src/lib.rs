use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Body returned by operations that have nothing else to say.
#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

pub mod category {
    use super::*;

    /// Request body for creating or replacing a category.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// Share of the income, in `[0.1, 100]`.
        pub percentage: f64,
        /// `#RRGGBB`.
        pub color: Option<String>,
        pub icon: Option<String>,
        pub display_order: Option<i32>,
        pub active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub name: String,
        pub percentage: f64,
        pub color: String,
        pub icon: String,
        pub display_order: i32,
        pub active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
        /// Sum of the active percentages.
        pub total_percentage: f64,
        /// `true` when the active percentages add up to 100.
        pub balanced: bool,
    }
}

pub mod record {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordNew {
        pub year: i32,
        pub month: u32,
        pub income_minor: i64,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordUpdate {
        pub income_minor: i64,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SnapshotView {
        pub id: i64,
        pub category_name: String,
        pub percentage: f64,
        pub color: String,
        pub icon: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordView {
        pub id: i64,
        pub year: i32,
        pub month: u32,
        pub income_minor: i64,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: Option<DateTime<Utc>>,
        /// Sum of the snapshot amounts.
        pub allocated_minor: i64,
        /// Categories changed after the snapshots were taken.
        pub stale: bool,
        pub snapshots: Vec<SnapshotView>,
    }
}

pub mod goal {
    use super::*;

    /// Request body for creating or replacing a goal.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_minor: i64,
        pub description: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
        pub target_date: Option<NaiveDate>,
        pub active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionNew {
        /// Negative for withdrawals; zero is rejected.
        pub amount_minor: i64,
        /// Defaults to today.
        pub date: Option<NaiveDate>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub id: i64,
        pub amount_minor: i64,
        pub date: NaiveDate,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancePointView {
        pub contribution_id: i64,
        pub date: NaiveDate,
        pub amount_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: i64,
        pub name: String,
        pub target_minor: i64,
        pub description: Option<String>,
        pub color: String,
        pub icon: String,
        pub target_date: Option<NaiveDate>,
        pub active: bool,
        pub created_at: DateTime<Utc>,
        pub balance_minor: i64,
        pub remaining_minor: i64,
        /// `balance / target`, at most 1.
        pub progress: f64,
        pub complete: bool,
        /// Newest date first.
        pub contributions: Vec<ContributionView>,
    }

    /// Goal detail with the running balance.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalDetail {
        #[serde(flatten)]
        pub goal: GoalView,
        pub balance_history: Vec<BalancePointView>,
    }
}

pub mod overview {
    use super::*;
    use crate::{goal::GoalView, record::RecordView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthQuery {
        pub year: Option<i32>,
        pub month: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub year: i32,
        pub month: u32,
        pub record: Option<RecordView>,
        pub goals_in_progress: Vec<GoalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeStatsView {
        pub months: usize,
        pub total_minor: i64,
        pub average_minor: i64,
        pub best_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub records: Vec<RecordView>,
        pub stats: IncomeStatsView,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub username: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordChange {
        pub current_password: String,
        pub new_password: String,
    }
}
