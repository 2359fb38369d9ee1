use serde::{Deserialize, Serialize};

use crate::entities::deals;

/// Request body item for POST /api/deals/save and /api/deals/import
///
/// Every field is optional so that missing or unparseable values are reported
/// by the validator. Rows are decoded one at a time, so a field of the wrong
/// JSON type only rejects its own row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedDeal {
    pub deal_unique_id: Option<String>,
    pub from_currency_iso: Option<String>,
    pub to_currency_iso: Option<String>,
    /// RFC 3339 or naive ISO-8601 local date-time (read as UTC)
    pub deal_timestamp: Option<String>,
    /// JSON number or numeric string
    pub deal_amount: Option<serde_json::Value>,
}

/// Response for POST /api/deals/import/report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReportResponse {
    pub saved: Vec<deals::Model>,
    pub errors: Vec<String>,
    pub processed: usize,
    pub saved_count: usize,
    pub skipped_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_fields() {
        let json = r#"{
            "dealUniqueId": "D-1",
            "fromCurrencyIso": "usd",
            "toCurrencyIso": "EUR",
            "dealTimestamp": "2024-03-01T10:15:30",
            "dealAmount": 1250.5
        }"#;

        let deal: SubmittedDeal = serde_json::from_str(json).unwrap();
        assert_eq!(deal.deal_unique_id.as_deref(), Some("D-1"));
        assert_eq!(deal.from_currency_iso.as_deref(), Some("usd"));
        assert_eq!(deal.to_currency_iso.as_deref(), Some("EUR"));
        assert_eq!(deal.deal_timestamp.as_deref(), Some("2024-03-01T10:15:30"));
        assert!(deal.deal_amount.unwrap().is_number());
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let deal: SubmittedDeal = serde_json::from_str(r#"{"dealUniqueId": "X"}"#).unwrap();
        assert!(deal.from_currency_iso.is_none());
        assert!(deal.deal_timestamp.is_none());
        assert!(deal.deal_amount.is_none());
    }

    #[test]
    fn test_malformed_amount_still_deserializes() {
        // Rejected later by the validator, not by serde
        let deal: SubmittedDeal =
            serde_json::from_str(r#"{"dealAmount": "not-a-number"}"#).unwrap();
        assert_eq!(deal.deal_amount, Some(serde_json::json!("not-a-number")));
    }

    #[test]
    fn test_null_items_in_batch() {
        let batch: Vec<Option<SubmittedDeal>> =
            serde_json::from_str(r#"[null, {"dealUniqueId": "A"}]"#).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch[0].is_none());
        assert!(batch[1].is_some());
    }
}
