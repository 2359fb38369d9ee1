//! Field-level validation of submitted deals
//!
//! The validator reports every violated rule at once rather than stopping at
//! the first one, so a rejected deal comes back with its full diagnosis.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::models::deal::SubmittedDeal;

/// Width of the `deal_unique_id` column
pub const MAX_DEAL_UNIQUE_ID_LEN: usize = 100;

/// Fractional digits kept by the `amount` column, numeric(20, 6)
pub const AMOUNT_SCALE: u32 = 6;

/// Integer digits left over by numeric(20, 6)
const AMOUNT_MAX_INTEGER_DIGITS: u32 = 14;

/// One violated rule on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: String,
}

/// A rejected deal, with the violations that caused the rejection (if any)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
    violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    /// Failure that is not tied to individual fields
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            violations: Vec::new(),
        }
    }

    /// Failure listing every violation as `field - reason` pairs
    pub fn from_violations(violations: Vec<FieldViolation>) -> Self {
        let details = violations
            .iter()
            .map(|v| format!("{} - {}", v.field, v.reason))
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            message: format!("Validation failed: {}", details),
            violations,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }
}

/// A submitted deal that passed every rule, not yet normalized for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDeal {
    /// Trimmed
    pub deal_unique_id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub deal_timestamp: DateTime<Utc>,
    /// Already rounded to [`AMOUNT_SCALE`]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct DealValidator {
    max_deal_unique_id_len: usize,
}

impl Default for DealValidator {
    fn default() -> Self {
        Self {
            max_deal_unique_id_len: MAX_DEAL_UNIQUE_ID_LEN,
        }
    }
}

impl DealValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every field of `deal`, collecting all violations
    pub fn validate(&self, deal: &SubmittedDeal) -> Result<ValidDeal, ValidationFailure> {
        let mut violations = Vec::new();

        let deal_unique_id =
            self.check_deal_unique_id(deal.deal_unique_id.as_deref(), &mut violations);
        let from_currency = check_currency(
            "fromCurrencyIso",
            deal.from_currency_iso.as_deref(),
            &mut violations,
        );
        let to_currency = check_currency(
            "toCurrencyIso",
            deal.to_currency_iso.as_deref(),
            &mut violations,
        );
        let deal_timestamp = check_timestamp(deal.deal_timestamp.as_deref(), &mut violations);
        let amount = check_amount(deal.deal_amount.as_ref(), &mut violations);

        match (deal_unique_id, from_currency, to_currency, deal_timestamp, amount) {
            (
                Some(deal_unique_id),
                Some(from_currency),
                Some(to_currency),
                Some(deal_timestamp),
                Some(amount),
            ) if violations.is_empty() => {
                Ok(ValidDeal {
                    deal_unique_id,
                    from_currency,
                    to_currency,
                    deal_timestamp,
                    amount,
                })
            }
            _ => Err(ValidationFailure::from_violations(violations)),
        }
    }

    fn check_deal_unique_id(
        &self,
        raw: Option<&str>,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<String> {
        const FIELD: &str = "dealUniqueId";

        let Some(raw) = raw else {
            violations.push(violation(FIELD, "must not be null"));
            return None;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            violations.push(violation(FIELD, "must not be blank"));
            return None;
        }
        if trimmed.chars().count() > self.max_deal_unique_id_len {
            violations.push(violation(
                FIELD,
                format!("size must be at most {}", self.max_deal_unique_id_len),
            ));
            return None;
        }

        Some(trimmed.to_string())
    }
}

fn violation(field: &'static str, reason: impl Into<String>) -> FieldViolation {
    FieldViolation {
        field,
        reason: reason.into(),
    }
}

fn check_currency(
    field: &'static str,
    raw: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let Some(raw) = raw else {
        violations.push(violation(field, "must not be null"));
        return None;
    };

    if raw.chars().count() != 3 || !raw.chars().all(|c| c.is_ascii_alphabetic()) {
        violations.push(violation(field, "must be a 3-letter ISO 4217 code"));
        return None;
    }

    Some(raw.to_string())
}

fn check_timestamp(
    raw: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<DateTime<Utc>> {
    const FIELD: &str = "dealTimestamp";

    let Some(raw) = raw else {
        violations.push(violation(FIELD, "must not be null"));
        return None;
    };

    match parse_timestamp(raw) {
        Some(ts) => Some(ts),
        None => {
            violations.push(violation(FIELD, "must be an ISO-8601 date-time"));
            None
        }
    }
}

/// RFC 3339 values keep their offset; naive local date-times (seconds
/// optional) are read as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn check_amount(raw: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<Decimal> {
    const FIELD: &str = "dealAmount";

    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        violations.push(violation(FIELD, "must not be null"));
        return None;
    };

    let Some(amount) = parse_amount(raw) else {
        violations.push(violation(FIELD, "must be a valid decimal number"));
        return None;
    };

    // Round first: rounding can carry into a new integer digit
    let amount =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);

    let integer_limit = Decimal::from(10_i64.pow(AMOUNT_MAX_INTEGER_DIGITS));
    if amount.trunc().abs() >= integer_limit {
        violations.push(violation(
            FIELD,
            format!(
                "must have at most {} integer digits",
                AMOUNT_MAX_INTEGER_DIGITS
            ),
        ));
        return None;
    }

    Some(amount)
}

/// JSON numbers keep their literal text (serde_json `arbitrary_precision`)
fn parse_amount(raw: &Value) -> Option<Decimal> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
