//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication
//! - `categories`: budget buckets with a percentage of the income
//! - `monthly_records`: one gross income per user and month
//! - `category_snapshots`: per-record copies of the categories with the allocated amount
//! - `savings_goals`: piggy banks with a target amount
//! - `contributions`: signed deposits and withdrawals on a goal
//!
//! Amounts are integer cents (`*_minor`).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    Percentage,
    Color,
    Icon,
    DisplayOrder,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MonthlyRecords {
    Table,
    Id,
    UserId,
    Year,
    Month,
    IncomeMinor,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CategorySnapshots {
    Table,
    Id,
    RecordId,
    Position,
    CategoryName,
    Percentage,
    Color,
    Icon,
    AmountMinor,
}

#[derive(Iden)]
enum SavingsGoals {
    Table,
    Id,
    UserId,
    Name,
    TargetMinor,
    Description,
    Color,
    Icon,
    TargetDate,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Contributions {
    Table,
    Id,
    GoalId,
    AmountMinor,
    Date,
    Notes,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::UserId).integer().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Percentage).double().not_null())
                    .col(
                        ColumnDef::new(Categories::Color)
                            .string()
                            .not_null()
                            .default("#6366f1"),
                    )
                    .col(
                        ColumnDef::new(Categories::Icon)
                            .string()
                            .not_null()
                            .default("💰"),
                    )
                    .col(
                        ColumnDef::new(Categories::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Categories::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-user_id")
                            .from(Categories::Table, Categories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id-display_order")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .col(Categories::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Monthly records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MonthlyRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthlyRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonthlyRecords::UserId).integer().not_null())
                    .col(ColumnDef::new(MonthlyRecords::Year).integer().not_null())
                    .col(ColumnDef::new(MonthlyRecords::Month).integer().not_null())
                    .col(
                        ColumnDef::new(MonthlyRecords::IncomeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MonthlyRecords::Notes).string())
                    .col(
                        ColumnDef::new(MonthlyRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MonthlyRecords::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-monthly_records-user_id")
                            .from(MonthlyRecords::Table, MonthlyRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-monthly_records-user_id-year-month-unique")
                    .table(MonthlyRecords::Table)
                    .col(MonthlyRecords::UserId)
                    .col(MonthlyRecords::Year)
                    .col(MonthlyRecords::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Category snapshots
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CategorySnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategorySnapshots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CategorySnapshots::RecordId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategorySnapshots::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategorySnapshots::CategoryName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategorySnapshots::Percentage)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CategorySnapshots::Color).string().not_null())
                    .col(ColumnDef::new(CategorySnapshots::Icon).string().not_null())
                    .col(
                        ColumnDef::new(CategorySnapshots::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_snapshots-record_id")
                            .from(CategorySnapshots::Table, CategorySnapshots::RecordId)
                            .to(MonthlyRecords::Table, MonthlyRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-category_snapshots-record_id")
                    .table(CategorySnapshots::Table)
                    .col(CategorySnapshots::RecordId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Savings goals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SavingsGoals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsGoals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingsGoals::UserId).integer().not_null())
                    .col(ColumnDef::new(SavingsGoals::Name).string().not_null())
                    .col(
                        ColumnDef::new(SavingsGoals::TargetMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavingsGoals::Description).string())
                    .col(
                        ColumnDef::new(SavingsGoals::Color)
                            .string()
                            .not_null()
                            .default("#4ECDC4"),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::Icon)
                            .string()
                            .not_null()
                            .default("🐷"),
                    )
                    .col(ColumnDef::new(SavingsGoals::TargetDate).date())
                    .col(
                        ColumnDef::new(SavingsGoals::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_goals-user_id")
                            .from(SavingsGoals::Table, SavingsGoals::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Contributions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Contributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contributions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contributions::GoalId).integer().not_null())
                    .col(
                        ColumnDef::new(Contributions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contributions::Date).date().not_null())
                    .col(ColumnDef::new(Contributions::Notes).string())
                    .col(
                        ColumnDef::new(Contributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contributions-goal_id")
                            .from(Contributions::Table, Contributions::GoalId)
                            .to(SavingsGoals::Table, SavingsGoals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-contributions-goal_id-date")
                    .table(Contributions::Table)
                    .col(Contributions::GoalId)
                    .col(Contributions::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(Contributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategorySnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonthlyRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
