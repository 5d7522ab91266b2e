//! Shared types for the moderation pipeline.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DispatchError;

/// Subtype marking bot-authored messages.
pub const BOT_MESSAGE_SUBTYPE: &str = "bot_message";

// ── Inbound message event ───────────────────────────────────────────

/// A message posted in a monitored channel, as handed to the pipeline.
///
/// The event source converts platform payloads into this struct. It lives
/// for one processing run and is never stored.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Author id (e.g. "U024BE7LH").
    pub user: String,
    /// Channel id the message was posted in (e.g. "C1234567890").
    pub channel: String,
    /// Raw message text.
    pub text: String,
    /// Platform subtype; bot-authored messages carry "bot_message".
    pub subtype: Option<String>,
}

impl MessageEvent {
    /// True when the message came from an automated author (a bot,
    /// including this one) rather than a person.
    pub fn is_automated(&self) -> bool {
        self.subtype.as_deref() == Some(BOT_MESSAGE_SUBTYPE)
    }
}

// ── Advisory ────────────────────────────────────────────────────────

/// One display block of an advisory, in the platform's Block Kit shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: BlockText },
}

/// Text payload of a section block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockText {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl Block {
    /// Section with plain (unformatted) text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Section {
            text: BlockText::PlainText { text: text.into() },
        }
    }

    /// Section with mrkdwn-formatted text.
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Section {
            text: BlockText::Mrkdwn { text: text.into() },
        }
    }
}

/// The private nudge sent back to a message's author.
///
/// Serializes directly as the `chat.postEphemeral` request body.
#[derive(Debug, Clone, Serialize)]
pub struct Advisory {
    /// Channel the advisory appears in.
    pub channel: String,
    /// The only user who sees it.
    pub user: String,
    /// Display blocks, in order.
    pub blocks: Vec<Block>,
}

// ── Advisory sink trait ─────────────────────────────────────────────

/// Delivery seam for advisories — pure I/O, no pipeline logic.
///
/// The production implementation posts an ephemeral platform message;
/// tests substitute a recorder.
#[async_trait]
pub trait AdvisorySink: Send + Sync {
    /// Deliver one advisory, visible only to its target user.
    async fn post_ephemeral(&self, advisory: &Advisory) -> Result<(), DispatchError>;
}

// ── Processing outcome ──────────────────────────────────────────────

/// Terminal disposition of one event's run through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was sent.
    Skipped(SkipReason),
    /// The advisory reached the author.
    Notified { findings: usize },
    /// An advisory was built but delivery failed. Logged, never retried.
    DispatchFailed { findings: usize },
}

/// Why an event produced no advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Automated (bot) message, filtered before analysis.
    Automated,
    /// The analysis backend failed; fail closed.
    AnalysisFailed,
    /// Analysis found nothing to flag.
    NothingFlagged,
}

impl Outcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped(SkipReason::Automated) => "skipped_automated",
            Self::Skipped(SkipReason::AnalysisFailed) => "skipped_analysis_failed",
            Self::Skipped(SkipReason::NothingFlagged) => "skipped_clean",
            Self::Notified { .. } => "notified",
            Self::DispatchFailed { .. } => "dispatch_failed",
        }
    }
}
