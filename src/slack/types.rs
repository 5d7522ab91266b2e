//! Slack wire types — inbound event envelopes and Web API replies.

use serde::Deserialize;

use crate::pipeline::types::MessageEvent;

// ── Events API (inbound) ────────────────────────────────────────────

/// Top-level payload of `POST /slack/events`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// One-time endpoint ownership check during app setup.
    UrlVerification { challenge: String },
    /// A subscribed workspace event.
    EventCallback {
        event: CallbackEvent,
        #[serde(default)]
        event_id: Option<String>,
    },
}

/// Inner event of an `event_callback` envelope.
///
/// Only `message` events feed the pipeline; every other subscribed type
/// is acked and dropped at intake.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    Message(MessagePayload),
    #[serde(other)]
    Other,
}

/// Raw `message` event fields, platform shape.
///
/// Slack omits `user`/`channel` on some system subtypes (edits, joins),
/// so everything here is optional until converted.
#[derive(Debug, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagePayload {
    /// Convert into a pipeline event. `None` when the payload lacks an
    /// author or channel; with no one to notify there is nothing to do.
    pub fn into_event(self) -> Option<MessageEvent> {
        Some(MessageEvent {
            user: self.user?,
            channel: self.channel?,
            text: self.text.unwrap_or_default(),
            subtype: self.subtype,
        })
    }
}

// ── Web API (outbound) ──────────────────────────────────────────────

/// Minimal Web API response envelope; every method reports `ok`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `auth.test` response fields reported at startup.
#[derive(Debug, Deserialize)]
pub struct AuthTestResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}
