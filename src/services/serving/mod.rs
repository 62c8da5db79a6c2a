use crate::models::{RecommendationQuery, RecommendationResult};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let artifacts = state.recommendation_service.artifacts();
    Json(json!({
        "status": "healthy",
        "service": "recserve",
        "version": env!("CARGO_PKG_VERSION"),
        "n_users": artifacts.users.n_users(),
        "n_items": artifacts.items.len(),
    }))
}

/// `GET /recommend`. An unknown user still answers 200 with an `error`
/// payload; only internal faults map to 500.
///
/// Scoring walks the whole catalog, so it runs on the blocking pool instead
/// of a runtime worker.
pub async fn recommend(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResult>, StatusCode> {
    let service = state.recommendation_service.clone();
    let request = service.request_from_query(query);
    let start_time = Instant::now();

    let (request, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = service.recommend(&request);
        (request, outcome)
    })
    .await
    .map_err(|e| {
        error!("Recommendation task failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match outcome {
        Ok(result) => {
            info!(
                user_id = %request.user_id,
                num_recs = request.num_recs,
                exclude_watched = request.exclude_watched,
                returned = result.recommendations().map_or(0, <[String]>::len),
                latency_us = start_time.elapsed().as_micros() as u64,
                "Served recommendations"
            );
            Ok(Json(result))
        }
        Err(e) => {
            error!(user_id = %request.user_id, "Failed to get recommendations: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend", get(recommend))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
