//! The moderation pipeline.
//!
//! Every inbound message event flows one way through:
//! 1. `Moderator::should_process()` — drop automated messages
//! 2. `TextAnalyzer::analyze()` — flag phrases (lexicon or remote)
//! 3. `dedupe_findings()` — collapse repeated advice
//! 4. `AdvisorySink::post_ephemeral()` — one private advisory, at most
//!
//! Events are independent: no state is shared or retained between runs,
//! and a failure in one run never affects another.

pub mod dedupe;
pub mod moderator;
pub mod types;

pub use dedupe::dedupe_findings;
pub use moderator::Moderator;
pub use types::{Advisory, AdvisorySink, Block, BlockText, MessageEvent, Outcome, SkipReason};
