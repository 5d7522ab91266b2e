//! Moderator — one inbound event in, at most one advisory out.
//!
//! **Core invariant: the author's message text never appears in logs.**
//! Findings are logged by rule id and source only; the text itself goes
//! nowhere but back to its author, quoted inside the advisory.
//!
//! Flow:
//! 1. Filter — automated (bot) messages are dropped before analysis
//! 2. Analyze — the configured backend flags phrases
//! 3. Dedupe — repeated advice collapses, first occurrence first
//! 4. Notify — one log line per unique finding, one ephemeral advisory
//!
//! A failed analysis or failed delivery ends the run with an error log.
//! Nothing is retried; the author never sees a partial advisory.

use std::sync::Arc;

use tracing::{error, info};

use crate::analysis::{Finding, TextAnalyzer};
use crate::pipeline::dedupe::dedupe_findings;
use crate::pipeline::types::{
    Advisory, AdvisorySink, Block, MessageEvent, Outcome, SkipReason,
};

/// Fixed first block of every advisory.
const ADVISORY_INTRO: &str = "I noticed some possibly insensitive or inconsiderate writing in \
                              your message. Consider editing it.";

/// Drives events through filter → analyze → dedupe → notify.
///
/// Holds no per-event state; a single instance is shared behind an `Arc`
/// by every spawned event task.
pub struct Moderator {
    analyzer: Arc<dyn TextAnalyzer>,
    sink: Arc<dyn AdvisorySink>,
}

impl Moderator {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>, sink: Arc<dyn AdvisorySink>) -> Self {
        Self { analyzer, sink }
    }

    /// The sole event filter: everything except automated messages goes
    /// through to analysis.
    pub fn should_process(event: &MessageEvent) -> bool {
        !event.is_automated()
    }

    /// Run one event through the full pipeline.
    pub async fn handle(&self, event: MessageEvent) -> Outcome {
        if !Self::should_process(&event) {
            return Outcome::Skipped(SkipReason::Automated);
        }

        let findings = match self.analyzer.analyze(&event.text).await {
            Ok(findings) => findings,
            Err(e) => {
                error!(
                    backend = self.analyzer.name(),
                    channel = %event.channel,
                    error = %e,
                    "Text analysis failed; no advisory sent"
                );
                return Outcome::Skipped(SkipReason::AnalysisFailed);
            }
        };

        let unique = dedupe_findings(findings);
        if unique.is_empty() {
            return Outcome::Skipped(SkipReason::NothingFlagged);
        }

        for finding in &unique {
            info!(
                rule = %finding.rule_id,
                source = finding.source.as_deref().unwrap_or("-"),
                user = %event.user,
                channel = %event.channel,
                "Found a violation"
            );
        }

        let advisory = build_advisory(&event, &unique);
        let count = unique.len();

        match self.sink.post_ephemeral(&advisory).await {
            Ok(()) => Outcome::Notified { findings: count },
            Err(e) => {
                error!(
                    user = %event.user,
                    channel = %event.channel,
                    error = %e,
                    "Failed to deliver advisory"
                );
                Outcome::DispatchFailed { findings: count }
            }
        }
    }
}

/// Build the advisory for a set of unique findings: the fixed intro block,
/// then each finding's message quoted with a trailing period.
fn build_advisory(event: &MessageEvent, findings: &[Finding]) -> Advisory {
    let mut blocks = Vec::with_capacity(findings.len() + 1);
    blocks.push(Block::plain(ADVISORY_INTRO));
    for finding in findings {
        blocks.push(Block::mrkdwn(format!("> {}.", finding.message)));
    }

    Advisory {
        channel: event.channel.clone(),
        user: event.user.clone(),
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::LexiconAnalyzer;
    use crate::config::ModerationConfig;
    use crate::error::{AnalysisError, DispatchError};

    // ── Test doubles ────────────────────────────────────────────────

    /// Analyzer returning canned findings, counting invocations.
    struct StubAnalyzer {
        findings: Vec<Finding>,
        calls: AtomicUsize,
    }

    impl StubAnalyzer {
        fn flagging(findings: Vec<Finding>) -> Self {
            Self {
                findings,
                calls: AtomicUsize::new(0),
            }
        }

        fn clean() -> Self {
            Self::flagging(Vec::new())
        }
    }

    #[async_trait]
    impl TextAnalyzer for StubAnalyzer {
        fn name(&self) -> &str {
            "stub"
        }

        async fn analyze(&self, _text: &str) -> Result<Vec<Finding>, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.findings.clone())
        }
    }

    /// Analyzer that always fails.
    struct FailingAnalyzer;

    #[async_trait]
    impl TextAnalyzer for FailingAnalyzer {
        fn name(&self) -> &str {
            "failing"
        }

        async fn analyze(&self, _text: &str) -> Result<Vec<Finding>, AnalysisError> {
            Err(AnalysisError::Backend {
                backend: "failing".into(),
                reason: "service unavailable".into(),
            })
        }
    }

    /// Sink recording every advisory it is asked to deliver.
    struct RecordingSink {
        sent: std::sync::Mutex<Vec<Advisory>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                sent: std::sync::Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: std::sync::Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn sent(&self) -> Vec<Advisory> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AdvisorySink for RecordingSink {
        async fn post_ephemeral(&self, advisory: &Advisory) -> Result<(), DispatchError> {
            self.sent.lock().unwrap().push(advisory.clone());
            if self.fail {
                return Err(DispatchError::Api {
                    method: "chat.postEphemeral".into(),
                    error: "channel_not_found".into(),
                });
            }
            Ok(())
        }
    }

    fn make_event(text: &str, subtype: Option<&str>) -> MessageEvent {
        MessageEvent {
            user: "U024BE7LH".into(),
            channel: "C1234567890".into(),
            text: text.into(),
            subtype: subtype.map(String::from),
        }
    }

    fn finding(rule_id: &str, message: &str) -> Finding {
        Finding {
            rule_id: rule_id.into(),
            message: message.into(),
            source: Some("equality".into()),
        }
    }

    // ── Filtering ───────────────────────────────────────────────────

    #[test]
    fn processes_human_messages_only() {
        assert!(Moderator::should_process(&make_event("hi", None)));
        assert!(Moderator::should_process(&make_event("hi", Some("thread_broadcast"))));
        assert!(!Moderator::should_process(&make_event("hi", Some("bot_message"))));
    }

    #[tokio::test]
    async fn bot_messages_are_never_analyzed() {
        let analyzer = Arc::new(StubAnalyzer::flagging(vec![finding("r1", "advice")]));
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(analyzer.clone(), sink.clone());

        let outcome = moderator
            .handle(make_event("he said so", Some("bot_message")))
            .await;

        assert_eq!(outcome, Outcome::Skipped(SkipReason::Automated));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert!(sink.sent().is_empty());
    }

    // ── Analysis outcomes ───────────────────────────────────────────

    #[tokio::test]
    async fn clean_message_sends_nothing() {
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(Arc::new(StubAnalyzer::clean()), sink.clone());

        let outcome = moderator.handle(make_event("all good here", None)).await;

        assert_eq!(outcome, Outcome::Skipped(SkipReason::NothingFlagged));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn analysis_failure_fails_closed() {
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(Arc::new(FailingAnalyzer), sink.clone());

        let outcome = moderator.handle(make_event("anything", None)).await;

        assert_eq!(outcome, Outcome::Skipped(SkipReason::AnalysisFailed));
        assert!(sink.sent().is_empty());
    }

    // ── Advisory construction ───────────────────────────────────────

    #[tokio::test]
    async fn one_advisory_per_flagged_message() {
        let analyzer = Arc::new(StubAnalyzer::flagging(vec![
            finding("r1", "use a considerate term"),
            finding("r2", "rephrase the second part"),
        ]));
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(analyzer, sink.clone());

        let outcome = moderator.handle(make_event("flag me", None)).await;

        assert_eq!(outcome, Outcome::Notified { findings: 2 });
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel, "C1234567890");
        assert_eq!(sent[0].user, "U024BE7LH");
    }

    #[tokio::test]
    async fn advisory_has_intro_then_quoted_findings() {
        let analyzer = Arc::new(StubAnalyzer::flagging(vec![finding(
            "r1",
            "`he` may be insensitive, use `they` instead",
        )]));
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(analyzer, sink.clone());

        moderator.handle(make_event("flag me", None)).await;

        let sent = sink.sent();
        assert_eq!(sent[0].blocks.len(), 2);
        assert_eq!(sent[0].blocks[0], Block::plain(ADVISORY_INTRO));
        assert_eq!(
            sent[0].blocks[1],
            Block::mrkdwn("> `he` may be insensitive, use `they` instead.")
        );
    }

    #[tokio::test]
    async fn duplicate_advice_collapses_into_one_block() {
        let analyzer = Arc::new(StubAnalyzer::flagging(vec![
            finding("r1", "same advice"),
            finding("r2", "other advice"),
            finding("r3", "same advice"),
        ]));
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(analyzer, sink.clone());

        let outcome = moderator.handle(make_event("flag me", None)).await;

        assert_eq!(outcome, Outcome::Notified { findings: 2 });
        // intro + 2 unique findings
        assert_eq!(sink.sent()[0].blocks.len(), 3);
    }

    // ── Delivery failure ────────────────────────────────────────────

    #[tokio::test]
    async fn dispatch_failure_is_terminal() {
        let analyzer = Arc::new(StubAnalyzer::flagging(vec![finding("r1", "advice")]));
        let sink = Arc::new(RecordingSink::failing());
        let moderator = Moderator::new(analyzer, sink.clone());

        let outcome = moderator.handle(make_event("flag me", None)).await;

        assert_eq!(outcome, Outcome::DispatchFailed { findings: 1 });
        // exactly one attempt, no retry
        assert_eq!(sink.sent().len(), 1);
    }

    // ── End to end with the real lexicon ────────────────────────────

    #[tokio::test]
    async fn lexicon_backed_run_flags_and_notifies() {
        let analyzer = Arc::new(LexiconAnalyzer::new(ModerationConfig::default()));
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(analyzer, sink.clone());

        let outcome = moderator
            .handle(make_event("maybe he can fix the blacklist", None))
            .await;

        assert_eq!(outcome, Outcome::Notified { findings: 2 });
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].blocks.len(), 3);
        assert_eq!(sent[0].blocks[0], Block::plain(ADVISORY_INTRO));
    }

    #[tokio::test]
    async fn single_finding_yields_intro_plus_one_quote() {
        let analyzer = Arc::new(LexiconAnalyzer::new(ModerationConfig::default()));
        let sink = Arc::new(RecordingSink::new());
        let moderator = Moderator::new(analyzer, sink.clone());

        let event = MessageEvent {
            user: "U1".into(),
            channel: "C1".into(),
            text: "he is a great guy".into(),
            subtype: None,
        };
        let outcome = moderator.handle(event).await;

        assert_eq!(outcome, Outcome::Notified { findings: 1 });
        let sent = sink.sent();
        assert_eq!(sent[0].user, "U1");
        assert_eq!(sent[0].channel, "C1");
        assert_eq!(sent[0].blocks.len(), 2);
        assert_eq!(
            sent[0].blocks[1],
            Block::mrkdwn("> `he` may be insensitive, use `they`, `it` instead.")
        );
    }
}
