//! Point-in-time copies of a category attached to a monthly record.

use sea_orm::entity::prelude::*;

use crate::MoneyCents;

/// A category as it was when a record was created or regenerated, with the
/// amount it received.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySnapshot {
    pub id: i64,
    pub category_name: String,
    pub percentage: f64,
    pub color: String,
    pub icon: String,
    pub amount: MoneyCents,
}

impl From<Model> for CategorySnapshot {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category_name: model.category_name,
            percentage: model.percentage,
            color: model.color,
            icon: model.icon,
            amount: MoneyCents::new(model.amount_minor),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "category_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub record_id: i64,
    /// Position in the breakdown (category display order at capture time).
    pub position: i32,
    pub category_name: String,
    #[sea_orm(column_type = "Double")]
    pub percentage: f64,
    pub color: String,
    pub icon: String,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::monthly_records::Entity",
        from = "Column::RecordId",
        to = "super::monthly_records::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Record,
}

impl Related<super::monthly_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Record.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
