//! Persistence seam for deals
//!
//! The importer only talks to a [`DealStore`]. The PostgreSQL implementation
//! relies on the `uq_deals_deal_unique_id` index and reports violations of it
//! as [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{deals, prelude::Deals};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::UniqueViolation(detail),
            _ => StoreError::Database(err),
        }
    }
}

/// A normalized deal ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeal {
    pub deal_unique_id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub deal_timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait DealStore: Send + Sync {
    /// Exact match on an already trimmed identifier
    async fn exists_by_deal_unique_id(&self, deal_unique_id: &str) -> Result<bool, StoreError>;

    /// Insert one deal as its own atomic unit, assigning the internal id
    async fn insert(&self, deal: NewDeal) -> Result<deals::Model, StoreError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct SeaOrmDealStore {
    db: DatabaseConnection,
}

impl SeaOrmDealStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DealStore for SeaOrmDealStore {
    async fn exists_by_deal_unique_id(&self, deal_unique_id: &str) -> Result<bool, StoreError> {
        let count = Deals::find()
            .filter(deals::Column::DealUniqueId.eq(deal_unique_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn insert(&self, deal: NewDeal) -> Result<deals::Model, StoreError> {
        // Committed before returning; dropping the transaction on error rolls it back
        let txn = self.db.begin().await?;

        let model = deals::ActiveModel {
            id: Set(Uuid::new_v4()),
            deal_unique_id: Set(deal.deal_unique_id),
            from_currency: Set(deal.from_currency),
            to_currency: Set(deal.to_currency),
            deal_timestamp: Set(deal.deal_timestamp),
            amount: Set(deal.amount),
            created_at: Set(deal.created_at),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(model)
    }
}
