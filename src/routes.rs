//! Route construction: one generic CRUD router per derived model, plus the
//! common health/readiness/version routes.

use crate::handlers::crud::{create, delete_all, delete_one, list, read, update, RouterState};
use crate::model::ApiModel;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

/// CRUD router for one table, mounted under its path segment:
/// `GET/POST/DELETE /t` and `GET/PUT/DELETE /t/{id}`.
pub fn crud_router(state: AppState, model: ApiModel) -> Router {
    let collection = format!("/{}", model.path_segment);
    let item = format!("/{}/:id", model.path_segment);
    let rs = RouterState {
        app: state,
        model: Arc::new(model),
    };
    Router::new()
        .route(&collection, get(list).post(create).delete(delete_all))
        .route(&item, get(read).put(update).delete(delete_one))
        .with_state(rs)
}

/// Mount a CRUD router for every derived model. An empty model list yields a
/// router with no CRUD routes.
pub fn register_all(state: AppState, models: Vec<ApiModel>) -> Router {
    let mut router = Router::new();
    for model in models {
        tracing::info!(table = %model.table_name, "mounting crud router");
        router = router.merge(crud_router(state.clone(), model));
    }
    router
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadyBody>, (axum::http::StatusCode, Json<ReadyBody>)> {
    if sqlx::query("SELECT 1").fetch_optional(&state.pool).await.is_err() {
        return Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: "unavailable",
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: "ok",
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes: GET /health, GET /ready (with DB check), GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
