use crate::errors::{ApiError, ApiResult};
use crate::models::{
    parse_amount, parse_pagination, BalanceResponse, HealthResponse, HistoryQuery,
    NewTransactionRequest, PaginatedTransactionsResponse, TransactionResponse,
};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{debug, info};
use validator::Validate;

// POST /transaction
pub async fn create_transaction(
    State(state): State<AppState>,
    body: Result<Json<NewTransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let Json(request) = body?;
    request.validate()?;

    let amount = parse_amount(&request.amount, &state.config.amount)?;
    let transaction = state.ledger.add_transaction(amount).await?;

    info!(
        external_id = %transaction.external_id(),
        amount = %amount,
        "Transaction recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::from(&transaction)),
    ))
}

// GET /transaction?offset=&limit=
pub async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedTransactionsResponse>> {
    let Query(query) = query?;
    let pagination = parse_pagination(&query, &state.config.pagination)?;

    let history = state
        .ledger
        .get_transaction_history(pagination.offset, pagination.limit)
        .await?;

    debug!(
        offset = pagination.offset,
        limit = pagination.limit,
        returned = history.len(),
        "Transaction history served"
    );

    Ok(Json(PaginatedTransactionsResponse {
        transactions: history.iter().map(TransactionResponse::from).collect(),
        pagination,
    }))
}

// GET /account
pub async fn get_balance(State(state): State<AppState>) -> ApiResult<Json<BalanceResponse>> {
    let balance = state.ledger.get_balance().await?;
    debug!(balance = %balance, "Balance served");

    Ok(Json(BalanceResponse {
        balance: balance.to_string(),
    }))
}

// GET /health - liveness only, never touches the ledger
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.config.ledger.service_name.clone(),
        version: state.config.ledger.service_version.clone(),
    })
}

// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> ApiResult<String> {
    state
        .metrics
        .export()
        .map_err(|e| ApiError::Internal(format!("Failed to export metrics: {}", e)))
}
