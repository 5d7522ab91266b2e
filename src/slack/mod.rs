//! Slack boundary — event intake and Web API client.

pub mod client;
pub mod events;
pub mod signature;
pub mod types;

pub use client::{BotIdentity, SlackClient};
pub use events::{AppState, event_routes};
