//! Request/response plumbing for every exposed operation.
//!
//! Worker and requester identities arrive in bodies and query strings:
//! authentication happens upstream and this surface trusts the ids it is
//! handed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{CompletionData, Redemption, Report, Task, TaskStatus};
use serde::Deserialize;
use services::aggregate::{Badge, LevelInfo, Ranking, Timeframe, UserStats};
use services::matching::{NewAdhocTask, NewReport};
use services::redemption::PerkView;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn submit_report(
    State(state): State<AppState>,
    Json(input): Json<NewReport>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let report = state.matching.submit_report(input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Deserialize)]
pub struct ReportsQuery {
    reporter: Uuid,
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportsQuery>,
) -> ApiResult<Json<Vec<Report>>> {
    Ok(Json(state.matching.reports_for_user(query.reporter).await?))
}

#[derive(Deserialize)]
pub struct DeleteReportQuery {
    requester: Uuid,
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteReportQuery>,
) -> ApiResult<StatusCode> {
    state.lifecycle.delete_if_pending(id, query.requester).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct AvailableQuery {
    zone: Option<String>,
}

pub async fn list_available(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.matching.list_available(query.zone).await?))
}

#[derive(Deserialize)]
pub struct WorkerTasksQuery {
    assignee: Uuid,
    status: Option<TaskStatus>,
}

pub async fn list_worker_tasks(
    State(state): State<AppState>,
    Query(query): Query<WorkerTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(
        state
            .matching
            .tasks_for_worker(query.assignee, query.status)
            .await?,
    ))
}

pub async fn create_adhoc_task(
    State(state): State<AppState>,
    Json(input): Json<NewAdhocTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.matching.create_adhoc_task(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Deserialize)]
pub struct WorkerBody {
    worker_id: Uuid,
}

pub async fn claim_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<WorkerBody>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.lifecycle.claim(id, body.worker_id).await?))
}

pub async fn start_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<WorkerBody>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.lifecycle.start(id, body.worker_id).await?))
}

#[derive(Deserialize)]
pub struct CompleteBody {
    worker_id: Uuid,
    weight_kg: f64,
    notes: Option<String>,
    cleanup_image_url: Option<String>,
}

pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompleteBody>,
) -> ApiResult<Json<Task>> {
    let completion = CompletionData {
        weight_kg: body.weight_kg,
        notes: body.notes,
        cleanup_image_url: body.cleanup_image_url,
    };
    Ok(Json(
        state.lifecycle.complete(id, body.worker_id, completion).await?,
    ))
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    role: domains::Role,
    #[serde(default = "default_timeframe")]
    timeframe: Timeframe,
}

fn default_timeframe() -> Timeframe {
    Timeframe::Month
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<Ranking>>> {
    Ok(Json(
        state
            .aggregator
            .leaderboard(query.role, query.timeframe)
            .await?,
    ))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserStats>> {
    Ok(Json(state.aggregator.user_stats(id).await?))
}

pub async fn user_badges(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Badge>>> {
    Ok(Json(state.aggregator.user_badges(id).await?))
}

pub async fn user_level(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LevelInfo>> {
    Ok(Json(state.aggregator.user_level(id).await?))
}

pub async fn user_perks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PerkView>>> {
    Ok(Json(state.redemption.available_perks(id).await?))
}

pub async fn user_redemptions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Redemption>>> {
    Ok(Json(state.redemption.history(id).await?))
}

#[derive(Deserialize)]
pub struct RedeemBody {
    perk_id: String,
}

pub async fn redeem_perk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RedeemBody>,
) -> ApiResult<(StatusCode, Json<Redemption>)> {
    let redemption = state.redemption.redeem(id, &body.perk_id).await?;
    Ok((StatusCode::CREATED, Json(redemption)))
}
