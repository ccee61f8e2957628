use crate::{MonthlyRecord, ResultEngine, SavingsGoal};

use super::Engine;

/// What the home screen shows for one month.
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub year: i32,
    pub month: u32,
    /// `None` when the month has no registered income yet.
    pub record: Option<MonthlyRecord>,
    pub goals_in_progress: Vec<SavingsGoal>,
}

impl Engine {
    pub async fn dashboard(&self, user_id: i64, year: i32, month: u32) -> ResultEngine<Dashboard> {
        let record = self.monthly_record_for(user_id, year, month).await?;
        let goals_in_progress = self.goals_in_progress(user_id).await?;
        Ok(Dashboard {
            year,
            month,
            record,
            goals_in_progress,
        })
    }
}
