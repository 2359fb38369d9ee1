use std::sync::Arc;

use crate::services::deal_store::{DealStore, StoreError};

/// Answers whether a deal identifier is already stored
///
/// Blank identifiers never match and never reach the store.
#[derive(Clone)]
pub struct DuplicateChecker {
    store: Arc<dyn DealStore>,
}

impl DuplicateChecker {
    pub fn new(store: Arc<dyn DealStore>) -> Self {
        Self { store }
    }

    pub async fn exists(&self, deal_unique_id: Option<&str>) -> Result<bool, StoreError> {
        let Some(trimmed) = deal_unique_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(false);
        };

        self.store.exists_by_deal_unique_id(trimmed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::deals;
    use crate::services::deal_store::NewDeal;
    use crate::services::memory_deal_store::MemoryDealStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    /// Fails any call that reaches it
    struct UnreachableStore;

    #[async_trait]
    impl DealStore for UnreachableStore {
        async fn exists_by_deal_unique_id(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Database(sea_orm::DbErr::Custom(
                "store should not be consulted".to_string(),
            )))
        }

        async fn insert(&self, _: NewDeal) -> Result<deals::Model, StoreError> {
            Err(StoreError::Database(sea_orm::DbErr::Custom(
                "store should not be consulted".to_string(),
            )))
        }
    }

    #[tokio::test]
    async fn test_blank_identifiers_short_circuit() {
        let checker = DuplicateChecker::new(Arc::new(UnreachableStore));

        assert!(!checker.exists(None).await.unwrap());
        assert!(!checker.exists(Some("")).await.unwrap());
        assert!(!checker.exists(Some("   \t")).await.unwrap());
    }

    #[tokio::test]
    async fn test_identifier_is_trimmed_before_lookup() {
        let store = Arc::new(MemoryDealStore::new());
        store
            .insert(NewDeal {
                deal_unique_id: "DEAL-7".to_string(),
                from_currency: "USD".to_string(),
                to_currency: "JPY".to_string(),
                deal_timestamp: Utc::now(),
                amount: dec!(5),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let checker = DuplicateChecker::new(store);
        assert!(checker.exists(Some("  DEAL-7  ")).await.unwrap());
        assert!(!checker.exists(Some("deal-7")).await.unwrap());
    }

    #[tokio::test]
    async fn test_repeated_checks_agree() {
        let checker = DuplicateChecker::new(Arc::new(MemoryDealStore::new()));

        let first = checker.exists(Some("X")).await.unwrap();
        let second = checker.exists(Some("X")).await.unwrap();
        assert_eq!(first, second);
    }
}
