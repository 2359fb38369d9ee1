//! In-process deal store
//!
//! Holds rows in memory and enforces the same uniqueness rule as the
//! `uq_deals_deal_unique_id` index. Lets the importer and the router be
//! exercised without PostgreSQL.

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::entities::deals;
use crate::services::deal_store::{DealStore, NewDeal, StoreError};

#[derive(Default)]
pub struct MemoryDealStore {
    rows: Mutex<Vec<deals::Model>>,
}

impl MemoryDealStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in insertion order
    pub fn all(&self) -> Vec<deals::Model> {
        self.rows.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

#[async_trait]
impl DealStore for MemoryDealStore {
    async fn exists_by_deal_unique_id(&self, deal_unique_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .rows
            .lock()
            .iter()
            .any(|row| row.deal_unique_id == deal_unique_id))
    }

    async fn insert(&self, deal: NewDeal) -> Result<deals::Model, StoreError> {
        let mut rows = self.rows.lock();

        if rows.iter().any(|row| row.deal_unique_id == deal.deal_unique_id) {
            return Err(StoreError::UniqueViolation(format!(
                "uq_deals_deal_unique_id ({})",
                deal.deal_unique_id
            )));
        }

        let model = deals::Model {
            id: Uuid::new_v4(),
            deal_unique_id: deal.deal_unique_id,
            from_currency: deal.from_currency,
            to_currency: deal.to_currency,
            deal_timestamp: deal.deal_timestamp,
            amount: deal.amount,
            created_at: deal.created_at,
        };
        rows.push(model.clone());

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn new_deal(id: &str) -> NewDeal {
        NewDeal {
            deal_unique_id: id.to_string(),
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            deal_timestamp: Utc::now(),
            amount: dec!(10),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_exists() {
        let store = MemoryDealStore::new();
        assert!(!store.exists_by_deal_unique_id("A").await.unwrap());

        let saved = store.insert(new_deal("A")).await.unwrap();
        assert_eq!(saved.deal_unique_id, "A");
        assert!(store.exists_by_deal_unique_id("A").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_second_insert_with_same_id_violates_uniqueness() {
        let store = MemoryDealStore::new();
        store.insert(new_deal("A")).await.unwrap();

        let err = store.insert(new_deal("A")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert_eq!(store.len(), 1);
    }
}
