//! Events API endpoint — receives workspace events and feeds the pipeline.
//!
//! Slack POSTs JSON envelopes to `/slack/events` and expects a 200 within
//! three seconds. The handler verifies the request signature, answers
//! `url_verification` challenges inline, and spawns one task per message
//! event so the ack never waits on analysis or delivery.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::pipeline::Moderator;
use crate::slack::signature;
use crate::slack::types::{CallbackEvent, EventEnvelope};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub moderator: Arc<Moderator>,
    pub signing_secret: SecretString,
}

/// Build the Axum router with the events endpoint and health route.
pub fn event_routes(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(receive_event))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tactbot"
    }))
}

// ── Events ──────────────────────────────────────────────────────────

/// `POST /slack/events` — signature check, then ack fast.
async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, StatusCode> {
    verify_request(&state, &headers, &body)?;

    let envelope: EventEnvelope = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Undecodable event payload");
        StatusCode::BAD_REQUEST
    })?;

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            info!("Answering url_verification challenge");
            Ok(Json(serde_json::json!({ "challenge": challenge })))
        }
        EventEnvelope::EventCallback { event, event_id } => {
            if let CallbackEvent::Message(payload) = event {
                match payload.into_event() {
                    Some(message) => {
                        let moderator = Arc::clone(&state.moderator);
                        tokio::spawn(async move {
                            let outcome = moderator.handle(message).await;
                            debug!(outcome = outcome.label(), "Event processed");
                        });
                    }
                    None => {
                        debug!(
                            event_id = event_id.as_deref().unwrap_or("-"),
                            "Message event without author or channel, ignoring"
                        );
                    }
                }
            }
            Ok(Json(serde_json::json!({ "ok": true })))
        }
    }
}

/// Check timestamp freshness and the v0 signature before trusting a body.
fn verify_request(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), StatusCode> {
    let timestamp = header_str(headers, "x-slack-request-timestamp").ok_or_else(|| {
        warn!("Missing X-Slack-Request-Timestamp header");
        StatusCode::UNAUTHORIZED
    })?;
    let provided = header_str(headers, "x-slack-signature").ok_or_else(|| {
        warn!("Missing X-Slack-Signature header");
        StatusCode::UNAUTHORIZED
    })?;

    if !signature::timestamp_fresh(timestamp, Utc::now().timestamp()) {
        warn!(timestamp = %timestamp, "Stale or malformed request timestamp");
        return Err(StatusCode::UNAUTHORIZED);
    }

    if !signature::verify_signature(state.signing_secret.expose_secret(), timestamp, body, provided)
    {
        warn!("Request signature mismatch");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
