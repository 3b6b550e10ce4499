use crate::config::{AmountConfig, PaginationConfig};
use crate::errors::{ApiError, ApiResult};
use ledger_core::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /transaction`
#[derive(Debug, Deserialize, Validate)]
pub struct NewTransactionRequest {
    #[validate(length(min = 1, message = "amount is required"))]
    pub amount: String,
}

/// Wire view of a transaction. The internal sequential id is never exposed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: *tx.external_id().as_uuid(),
            amount: render_decimal(tx.amount()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedTransactionsResponse {
    pub transactions: Vec<TransactionResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Raw query string of `GET /transaction`; parsed by [`parse_pagination`]
/// so malformed values get the same error body as every other rejection.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// Normalised decimal text: `100.50` renders as `100.5`, `-0` as `0`
pub fn render_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Parse a transaction amount in plain or scientific notation and enforce
/// the configured scale and magnitude limits.
pub fn parse_amount(raw: &str, limits: &AmountConfig) -> ApiResult<Decimal> {
    let raw = raw.trim();
    let amount = Decimal::from_str_exact(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ApiError::validation("invalid transaction amount"))?
        .normalize();

    if amount.scale() > limits.max_fraction_digits {
        return Err(ApiError::Validation(format!(
            "invalid transaction amount: at most {} fractional digits allowed",
            limits.max_fraction_digits
        )));
    }

    if amount.abs() > limits.max_abs {
        return Err(ApiError::Validation(format!(
            "invalid transaction amount: magnitude must not exceed {}",
            render_decimal(limits.max_abs)
        )));
    }

    Ok(amount)
}

/// `offset` is required and non-negative; `limit` defaults and must lie in `[1, max_limit]`
pub fn parse_pagination(query: &HistoryQuery, limits: &PaginationConfig) -> ApiResult<Pagination> {
    let offset = match query.offset.as_deref() {
        None | Some("") => return Err(ApiError::validation("missing offset query parameter")),
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiError::validation("invalid offset parameter"))?,
    };

    let limit = match query.limit.as_deref() {
        None | Some("") => limits.default_limit,
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|limit| (1..=limits.max_limit).contains(limit))
            .ok_or_else(|| {
                ApiError::Validation(format!(
                    "invalid limit query parameter: must be between 1 and {}",
                    limits.max_limit
                ))
            })?,
    };

    Ok(Pagination { offset, limit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rust_decimal_macros::dec;

    fn amount_limits() -> AmountConfig {
        Config::default().amount
    }

    fn page_limits() -> PaginationConfig {
        Config::default().pagination
    }

    fn query(offset: Option<&str>, limit: Option<&str>) -> HistoryQuery {
        HistoryQuery {
            offset: offset.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    fn message(err: ApiError) -> String {
        err.to_string()
    }

    #[test]
    fn test_parse_amount_plain() {
        let limits = amount_limits();
        assert_eq!(parse_amount("100.50", &limits).unwrap(), dec!(100.5));
        assert_eq!(parse_amount("-50.25", &limits).unwrap(), dec!(-50.25));
        assert_eq!(parse_amount("0", &limits).unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount(" 7 ", &limits).unwrap(), dec!(7));
    }

    #[test]
    fn test_parse_amount_scientific() {
        let limits = amount_limits();
        assert_eq!(parse_amount("1e3", &limits).unwrap(), dec!(1000));
        assert_eq!(parse_amount("2.5E-2", &limits).unwrap(), dec!(0.025));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        let limits = amount_limits();
        for raw in ["abc", "", "1.2.3", "12abc", "--1"] {
            let err = parse_amount(raw, &limits).unwrap_err();
            assert_eq!(message(err), "invalid transaction amount", "input {raw:?}");
        }
    }

    #[test]
    fn test_parse_amount_scale_limit_uses_normalised_value() {
        let limits = amount_limits();
        // Trailing zeros do not count against the limit
        assert_eq!(parse_amount("1.1000000000", &limits).unwrap(), dec!(1.1));
        assert_eq!(parse_amount("0.00000001", &limits).unwrap(), dec!(0.00000001));
        assert!(parse_amount("0.000000001", &limits).is_err());
    }

    #[test]
    fn test_parse_amount_magnitude_limit() {
        let limits = amount_limits();
        assert!(parse_amount("1000000000000", &limits).is_ok());
        assert!(parse_amount("-1000000000000", &limits).is_ok());

        let err = parse_amount("1000000000000.01", &limits).unwrap_err();
        assert!(message(err).contains("must not exceed 1000000000000"));
        assert!(parse_amount("1e13", &limits).is_err());
    }

    #[test]
    fn test_parse_pagination_defaults_limit() {
        let page = parse_pagination(&query(Some("5"), None), &page_limits()).unwrap();
        assert_eq!(page, Pagination { offset: 5, limit: 10 });
    }

    #[test]
    fn test_parse_pagination_requires_offset() {
        let err = parse_pagination(&query(None, Some("5")), &page_limits()).unwrap_err();
        assert_eq!(message(err), "missing offset query parameter");

        let err = parse_pagination(&query(Some(""), None), &page_limits()).unwrap_err();
        assert_eq!(message(err), "missing offset query parameter");
    }

    #[test]
    fn test_parse_pagination_rejects_bad_offset() {
        for raw in ["-1", "abc", "1.5"] {
            let err = parse_pagination(&query(Some(raw), None), &page_limits()).unwrap_err();
            assert_eq!(message(err), "invalid offset parameter");
        }
    }

    #[test]
    fn test_parse_pagination_limit_bounds() {
        let limits = page_limits();
        assert_eq!(
            parse_pagination(&query(Some("0"), Some("1")), &limits).unwrap().limit,
            1
        );
        assert_eq!(
            parse_pagination(&query(Some("0"), Some("100")), &limits).unwrap().limit,
            100
        );

        for raw in ["0", "101", "-3", "ten"] {
            let err = parse_pagination(&query(Some("0"), Some(raw)), &limits).unwrap_err();
            assert_eq!(
                message(err),
                "invalid limit query parameter: must be between 1 and 100"
            );
        }
    }

    #[test]
    fn test_render_decimal_normalises() {
        assert_eq!(render_decimal(dec!(100.50)), "100.5");
        assert_eq!(render_decimal(dec!(0.60)), "0.6");
        assert_eq!(render_decimal(dec!(-0.0)), "0");
        assert_eq!(render_decimal(dec!(1000)), "1000");
    }

    #[test]
    fn test_new_transaction_request_validation() {
        assert!(NewTransactionRequest { amount: String::new() }.validate().is_err());
        assert!(NewTransactionRequest { amount: "1".into() }.validate().is_ok());
    }
}
