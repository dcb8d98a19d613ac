use crate::api::Envelope;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PingStatus {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/api/test/unauthed-ping",
    tag = "testing",
    responses(
        (status = 200, description = "Liveness check", body = Envelope<PingStatus>)
    )
)]
pub async fn unauthed_ping() -> Json<Envelope<PingStatus>> {
    Json(Envelope::ok(
        "pong",
        PingStatus {
            status: "ok".to_string(),
        },
    ))
}
