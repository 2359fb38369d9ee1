//! Deal import pipeline
//!
//! Every submitted deal goes through validate -> duplicate pre-check ->
//! normalize -> persist. The batch path runs that pipeline per row and keeps
//! going after a failed row; each saved row is committed on its own, so later
//! rows see earlier ones when checking for duplicates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::entities::deals;
use crate::models::deal::SubmittedDeal;
use crate::services::deal_store::{DealStore, NewDeal, StoreError};
use crate::services::deal_validator::{DealValidator, ValidDeal, ValidationFailure};
use crate::services::duplicate_checker::DuplicateChecker;

#[derive(Debug, thiserror::Error)]
pub enum DealError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Deal with unique ID '{0}' already exists")]
    Duplicate(String),

    #[error("Storage failure: {0}")]
    Storage(#[source] StoreError),
}

/// One row of a batch as it arrived
#[derive(Debug)]
pub enum BatchRow {
    /// `None` for a `null` row
    Submitted(Option<SubmittedDeal>),
    /// JSON that does not have the shape of a deal (wrong field types, not an object)
    Unreadable(ValidationFailure),
}

impl From<Option<SubmittedDeal>> for BatchRow {
    fn from(deal: Option<SubmittedDeal>) -> Self {
        BatchRow::Submitted(deal)
    }
}

impl From<Value> for BatchRow {
    fn from(value: Value) -> Self {
        if value.is_null() {
            return BatchRow::Submitted(None);
        }

        match serde_json::from_value::<SubmittedDeal>(value) {
            Ok(deal) => BatchRow::Submitted(Some(deal)),
            Err(e) => BatchRow::Unreadable(ValidationFailure::new(format!(
                "Validation failed: malformed deal - {}",
                e
            ))),
        }
    }
}

/// What happened to one row of a batch
#[derive(Debug)]
pub enum ItemOutcome {
    Saved(deals::Model),
    SkippedDuplicate(String),
    SkippedInvalid(String),
    SkippedError(String),
}

impl ItemOutcome {
    /// Classify the result of submitting the deal at 1-based `row`
    pub fn classify(row: usize, result: Result<deals::Model, DealError>) -> Self {
        match result {
            Ok(saved) => ItemOutcome::Saved(saved),
            Err(err @ DealError::Duplicate(_)) => {
                ItemOutcome::SkippedDuplicate(format!("Row {}: {}", row, err))
            }
            Err(DealError::Validation(failure)) => {
                ItemOutcome::SkippedInvalid(format!("Row {}: {}", row, failure))
            }
            Err(DealError::Storage(cause)) => {
                ItemOutcome::SkippedError(format!("Row {}: Unexpected error - {}", row, cause))
            }
        }
    }
}

/// Aggregate result of a batch import
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Saved records in processing order
    pub saved: Vec<deals::Model>,
    /// One message per skipped row, in processing order
    pub errors: Vec<String>,
    pub processed: usize,
}

impl BatchReport {
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.errors.len()
    }

    pub fn all_failed(&self) -> bool {
        self.saved.is_empty() && !self.errors.is_empty()
    }
}

pub struct DealImporter {
    store: Arc<dyn DealStore>,
    validator: DealValidator,
    duplicates: DuplicateChecker,
}

impl DealImporter {
    pub fn new(store: Arc<dyn DealStore>, validator: DealValidator) -> Self {
        let duplicates = DuplicateChecker::new(store.clone());
        Self {
            store,
            validator,
            duplicates,
        }
    }

    pub fn duplicates(&self) -> &DuplicateChecker {
        &self.duplicates
    }

    /// Validate, check and persist a single deal
    pub async fn submit(&self, deal: Option<SubmittedDeal>) -> Result<deals::Model, DealError> {
        let Some(deal) = deal else {
            return Err(ValidationFailure::new("payload missing").into());
        };

        debug!(deal_unique_id = ?deal.deal_unique_id, "Saving deal");

        let valid = self.validator.validate(&deal)?;

        let exists = self
            .duplicates
            .exists(Some(valid.deal_unique_id.as_str()))
            .await
            .map_err(DealError::Storage)?;
        if exists {
            warn!(deal_unique_id = %valid.deal_unique_id, "Deal already exists");
            return Err(DealError::Duplicate(valid.deal_unique_id));
        }

        let new_deal = normalize(valid, Utc::now());
        let deal_unique_id = new_deal.deal_unique_id.clone();

        match self.store.insert(new_deal).await {
            Ok(saved) => {
                info!(deal_unique_id = %saved.deal_unique_id, id = %saved.id, "Saved deal");
                Ok(saved)
            }
            Err(StoreError::UniqueViolation(detail)) => {
                // A concurrent writer stored the same identifier after our pre-check
                warn!(
                    deal_unique_id = %deal_unique_id,
                    detail = %detail,
                    "Deal already exists (unique constraint)"
                );
                Err(DealError::Duplicate(deal_unique_id))
            }
            Err(err) => Err(DealError::Storage(err)),
        }
    }

    /// [`DealImporter::submit`] for a row that may not have parsed as a deal
    pub async fn submit_row(&self, row: BatchRow) -> Result<deals::Model, DealError> {
        match row {
            BatchRow::Submitted(deal) => self.submit(deal).await,
            BatchRow::Unreadable(failure) => Err(failure.into()),
        }
    }

    /// Import a batch, failing as a whole only when no row was saved
    pub async fn import_batch<R: Into<BatchRow>>(
        &self,
        deals: Vec<R>,
    ) -> Result<BatchReport, DealError> {
        let report = self.process_batch(deals).await;

        if report.all_failed() {
            return Err(ValidationFailure::new(format!(
                "All deals failed validation: {}",
                report.errors.join("; ")
            ))
            .into());
        }

        Ok(report)
    }

    /// Run every row through [`DealImporter::submit_row`] and collect the outcomes
    pub async fn process_batch<R: Into<BatchRow>>(&self, deals: Vec<R>) -> BatchReport {
        let total = deals.len();
        info!(total = total, "Starting import of deals");

        let mut report = BatchReport::default();

        for (index, deal) in deals.into_iter().enumerate() {
            let row = index + 1;
            report.processed += 1;

            match ItemOutcome::classify(row, self.submit_row(deal.into()).await) {
                ItemOutcome::Saved(saved) => {
                    debug!(
                        row = row,
                        total = total,
                        deal_unique_id = %saved.deal_unique_id,
                        "Imported deal"
                    );
                    report.saved.push(saved);
                }
                ItemOutcome::SkippedDuplicate(message) => {
                    warn!(row = row, "Skipped duplicate deal: {}", message);
                    report.errors.push(message);
                }
                ItemOutcome::SkippedInvalid(message) => {
                    warn!(row = row, "Skipped invalid deal: {}", message);
                    report.errors.push(message);
                }
                ItemOutcome::SkippedError(message) => {
                    error!(row = row, "Error processing deal: {}", message);
                    report.errors.push(message);
                }
            }
        }

        info!(
            processed = report.processed,
            saved = report.saved_count(),
            skipped = report.skipped_count(),
            "Import completed"
        );

        report
    }
}

/// Upper-case currency codes and stamp the creation time
fn normalize(valid: ValidDeal, created_at: DateTime<Utc>) -> NewDeal {
    NewDeal {
        deal_unique_id: valid.deal_unique_id,
        from_currency: valid.from_currency.to_ascii_uppercase(),
        to_currency: valid.to_currency.to_ascii_uppercase(),
        deal_timestamp: valid.deal_timestamp,
        amount: valid.amount,
        created_at,
    }
}
