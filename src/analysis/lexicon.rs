//! Built-in lexicon checker for insensitive or exclusionary phrasing.
//!
//! Two sub-checks run over every message:
//! - equality rules — gendered, ableist, or otherwise loaded terms, each
//!   with considerate alternatives
//! - profanity — a rated word list gated by the configured sureness
//!   threshold
//!
//! Operators exempt individual rules through the allow-list; terms like
//! "invalid" have benign technical readings that make unconditional
//! flagging counterproductive.

use async_trait::async_trait;
use regex::Regex;

use crate::analysis::{Finding, TextAnalyzer};
use crate::config::ModerationConfig;
use crate::error::AnalysisError;

/// Source tag for equality findings.
const SOURCE_EQUALITY: &str = "equality";
/// Source tag for profanity findings.
const SOURCE_PROFANITY: &str = "profanity";

/// A single equality rule with a compiled term pattern.
#[derive(Debug, Clone)]
struct EqualityRule {
    /// Stable rule id, doubling as the allow-list key.
    id: &'static str,
    /// Compiled case-insensitive pattern over the inconsiderate terms.
    pattern: Regex,
    /// Considerate alternatives, quoted in the finding message.
    alternatives: &'static [&'static str],
    /// Paired-pronoun forms, only flagged when `no_binary` is set.
    binary_pair: bool,
}

/// A rated profanity entry.
#[derive(Debug, Clone)]
struct ProfanityRule {
    /// The term itself, doubling as rule id and allow-list key.
    term: &'static str,
    /// 0 = profane in some contexts, 1 = likely profane, 2 = profane.
    sureness: i8,
    /// Compiled case-insensitive word-boundary pattern.
    pattern: Regex,
}

/// Rule-based analyzer over the built-in term tables. No I/O; `analyze`
/// never fails.
pub struct LexiconAnalyzer {
    equality: Vec<EqualityRule>,
    profanity: Vec<ProfanityRule>,
    config: ModerationConfig,
}

impl LexiconAnalyzer {
    pub fn new(config: ModerationConfig) -> Self {
        Self {
            equality: equality_rules(),
            profanity: profanity_rules(),
            config,
        }
    }

    /// Scan one message's text against both sub-checks. Findings come back
    /// in the order their phrases appear in the text.
    pub fn check(&self, text: &str) -> Vec<Finding> {
        let mut hits: Vec<(usize, Finding)> = Vec::new();

        // Spans covered by paired-pronoun forms. A single pronoun inside
        // "he or she" is reported by the pair rule or not at all, never on
        // its own.
        let pair_spans: Vec<std::ops::Range<usize>> = self
            .equality
            .iter()
            .filter(|rule| rule.binary_pair)
            .flat_map(|rule| rule.pattern.find_iter(text).map(|m| m.range()))
            .collect();

        for rule in &self.equality {
            if self.config.allowed_rules.contains(rule.id) {
                continue;
            }
            if rule.binary_pair && !self.config.no_binary {
                continue;
            }
            for m in rule.pattern.find_iter(text) {
                if !rule.binary_pair && pair_spans.iter().any(|span| span.contains(&m.start())) {
                    continue;
                }
                hits.push((
                    m.start(),
                    Finding {
                        rule_id: rule.id.to_string(),
                        message: equality_message(m.as_str(), rule.alternatives),
                        source: Some(SOURCE_EQUALITY.to_string()),
                    },
                ));
            }
        }

        if self.config.profanity_enabled() {
            for rule in &self.profanity {
                if rule.sureness < self.config.profanity_sureness {
                    continue;
                }
                if self.config.allowed_rules.contains(rule.term) {
                    continue;
                }
                for m in rule.pattern.find_iter(text) {
                    hits.push((
                        m.start(),
                        Finding {
                            rule_id: rule.term.to_string(),
                            message: profanity_message(m.as_str(), rule.sureness),
                            source: Some(SOURCE_PROFANITY.to_string()),
                        },
                    ));
                }
            }
        }

        hits.sort_by_key(|(start, _)| *start);
        hits.into_iter().map(|(_, finding)| finding).collect()
    }
}

#[async_trait]
impl TextAnalyzer for LexiconAnalyzer {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn analyze(&self, text: &str) -> Result<Vec<Finding>, AnalysisError> {
        Ok(self.check(text))
    }
}

fn equality_message(term: &str, alternatives: &[&str]) -> String {
    if alternatives.is_empty() {
        format!("`{term}` may be insensitive, try not to use it")
    } else {
        format!(
            "`{term}` may be insensitive, use `{}` instead",
            alternatives.join("`, `")
        )
    }
}

fn profanity_message(term: &str, sureness: i8) -> String {
    match sureness {
        2 => format!("Don't use `{term}`, it's profane"),
        1 => format!("Reconsider using `{term}`, it may be profane"),
        _ => format!("Be careful with `{term}`, it's profane in some cases"),
    }
}

/// The built-in equality table.
fn equality_rules() -> Vec<EqualityRule> {
    vec![
        // Gendered pronouns
        EqualityRule {
            id: "he-she",
            pattern: Regex::new(r"(?i)\b(he|she)\b").unwrap(),
            alternatives: &["they", "it"],
            binary_pair: false,
        },
        EqualityRule {
            id: "her-him",
            pattern: Regex::new(r"(?i)\b(him|his|her|hers)\b").unwrap(),
            alternatives: &["their", "theirs", "them"],
            binary_pair: false,
        },
        EqualityRule {
            id: "herself-himself",
            pattern: Regex::new(r"(?i)\b(himself|herself)\b").unwrap(),
            alternatives: &["themselves"],
            binary_pair: false,
        },
        // Paired binary forms, flagged only under `no_binary`
        EqualityRule {
            id: "he-she",
            pattern: Regex::new(r"(?i)\b(he or she|she or he|he/she|she/he|s/he)\b").unwrap(),
            alternatives: &["they"],
            binary_pair: true,
        },
        EqualityRule {
            id: "her-him",
            pattern: Regex::new(
                r"(?i)\b(him or her|her or him|him/her|her/him|his or hers|his or her|his/hers?)\b",
            )
            .unwrap(),
            alternatives: &["their", "theirs", "them"],
            binary_pair: true,
        },
        // Gendered collective and role terms
        EqualityRule {
            id: "guys",
            pattern: Regex::new(r"(?i)\bguys\b").unwrap(),
            alternatives: &["folks", "people", "you all"],
            binary_pair: false,
        },
        EqualityRule {
            id: "chairman-chairwoman",
            pattern: Regex::new(r"(?i)\b(chairman|chairwoman)\b").unwrap(),
            alternatives: &["chair", "chairperson"],
            binary_pair: false,
        },
        EqualityRule {
            id: "manpower",
            pattern: Regex::new(r"(?i)\bmanpower\b").unwrap(),
            alternatives: &["staff", "workforce"],
            binary_pair: false,
        },
        EqualityRule {
            id: "man-hours",
            pattern: Regex::new(r"(?i)\bman[- ]?hours?\b").unwrap(),
            alternatives: &["person-hours", "work-hours"],
            binary_pair: false,
        },
        EqualityRule {
            id: "host-hostess",
            pattern: Regex::new(r"(?i)\bhostess\b").unwrap(),
            alternatives: &["host"],
            binary_pair: false,
        },
        // Identity terms with benign technical readings; candidates for
        // the allow-list in most deployments
        EqualityRule {
            id: "invalid",
            pattern: Regex::new(r"(?i)\binvalid\b").unwrap(),
            alternatives: &["disabled person", "person with a disability"],
            binary_pair: false,
        },
        EqualityRule {
            id: "bi",
            pattern: Regex::new(r"(?i)\bbi\b").unwrap(),
            alternatives: &["bisexual"],
            binary_pair: false,
        },
        // Loaded technical vocabulary
        EqualityRule {
            id: "blacklist-whitelist",
            pattern: Regex::new(r"(?i)\b(black|white)list(s|ed|ing)?\b").unwrap(),
            alternatives: &["blocklist", "allowlist"],
            binary_pair: false,
        },
        EqualityRule {
            id: "master-slave",
            pattern: Regex::new(r"(?i)\b(master[-/]slave|slaves?)\b").unwrap(),
            alternatives: &["primary/replica", "leader/follower"],
            binary_pair: false,
        },
        EqualityRule {
            id: "sanity-check",
            pattern: Regex::new(r"(?i)\bsanity[- ]?(check|test)s?\b").unwrap(),
            alternatives: &["confidence check", "coherence check"],
            binary_pair: false,
        },
        EqualityRule {
            id: "grandfathered",
            pattern: Regex::new(r"(?i)\b(grandfathered|grandfather(ing)? clause)\b").unwrap(),
            alternatives: &["legacy", "exempted"],
            binary_pair: false,
        },
        // Ableist slang
        EqualityRule {
            id: "crazy",
            pattern: Regex::new(r"(?i)\b(crazy|insane)\b").unwrap(),
            alternatives: &["wild", "unexpected"],
            binary_pair: false,
        },
        EqualityRule {
            id: "dumb",
            pattern: Regex::new(r"(?i)\bdumb\b").unwrap(),
            alternatives: &["foolish", "ludicrous"],
            binary_pair: false,
        },
        EqualityRule {
            id: "lame",
            pattern: Regex::new(r"(?i)\blame\b").unwrap(),
            alternatives: &["boring", "disappointing"],
            binary_pair: false,
        },
    ]
}

/// The built-in profanity table.
fn profanity_rules() -> Vec<ProfanityRule> {
    let entries: &[(&str, i8)] = &[
        ("fuck", 2),
        ("fucking", 2),
        ("shit", 2),
        ("bullshit", 2),
        ("asshole", 2),
        ("motherfucker", 2),
        ("ass", 1),
        ("bastard", 1),
        ("crap", 1),
        ("piss", 1),
        ("hell", 0),
        ("damn", 0),
        ("bloody", 0),
        ("butt", 0),
    ];

    entries
        .iter()
        .map(|&(term, sureness)| ProfanityRule {
            term,
            sureness,
            pattern: Regex::new(&format!(r"(?i)\b{term}\b")).unwrap(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_analyzer() -> LexiconAnalyzer {
        LexiconAnalyzer::new(ModerationConfig::default())
    }

    #[test]
    fn flags_gendered_pronoun() {
        let findings = default_analyzer().check("Maybe he can review this");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "he-she");
        assert_eq!(
            findings[0].message,
            "`he` may be insensitive, use `they`, `it` instead"
        );
        assert_eq!(findings[0].source.as_deref(), Some("equality"));
    }

    #[test]
    fn quotes_term_as_typed() {
        let findings = default_analyzer().check("He approved it already");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("`He`"));
    }

    #[test]
    fn respects_word_boundaries() {
        // "theme", "shed" and "this" embed pronouns mid-word
        let findings = default_analyzer().check("The theme of this shed");
        assert!(findings.is_empty());
    }

    #[test]
    fn allow_list_suppresses_rule() {
        let mut config = ModerationConfig::default();
        config.allowed_rules.insert("he-she".to_string());

        let findings = LexiconAnalyzer::new(config).check("she will take a look");
        assert!(findings.is_empty());
    }

    #[test]
    fn allow_list_leaves_other_rules_active() {
        let mut config = ModerationConfig::default();
        config.allowed_rules.insert("he-she".to_string());

        let findings = LexiconAnalyzer::new(config).check("she updated the blacklist");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "blacklist-whitelist");
    }

    #[test]
    fn findings_follow_text_order() {
        let findings = default_analyzer().check("She told him the chairman approved");
        let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["he-she", "her-him", "chairman-chairwoman"]);
    }

    #[test]
    fn binary_pairs_are_neutral_by_default() {
        // With no_binary off, "him or her" is acceptable and must not be
        // flagged piecewise either
        let findings = default_analyzer().check("Ask him or her about it");
        assert!(findings.is_empty());
    }

    #[test]
    fn binary_pairs_flagged_when_configured() {
        let config = ModerationConfig {
            no_binary: true,
            ..ModerationConfig::default()
        };

        let findings = LexiconAnalyzer::new(config).check("Ask him or her about it");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "her-him");
        assert!(findings[0].message.starts_with("`him or her`"));
    }

    #[test]
    fn profanity_flagged_at_default_sureness() {
        let findings = default_analyzer().check("That is a damn shame");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "damn");
        assert_eq!(
            findings[0].message,
            "Be careful with `damn`, it's profane in some cases"
        );
        assert_eq!(findings[0].source.as_deref(), Some("profanity"));
    }

    #[test]
    fn profanity_threshold_filters_lower_ratings() {
        let config = ModerationConfig {
            profanity_sureness: 2,
            ..ModerationConfig::default()
        };
        let analyzer = LexiconAnalyzer::new(config);

        assert!(analyzer.check("what a damn mess").is_empty());

        let findings = analyzer.check("this is bullshit");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Don't use `bullshit`, it's profane");
    }

    #[test]
    fn out_of_range_sureness_disables_profanity() {
        for sureness in [-1, 3] {
            let config = ModerationConfig {
                profanity_sureness: sureness,
                ..ModerationConfig::default()
            };
            let findings = LexiconAnalyzer::new(config).check("this is bullshit");
            assert!(findings.is_empty(), "sureness {sureness} should disable the sub-check");
        }
    }

    #[test]
    fn multiple_rules_in_one_message() {
        let findings = default_analyzer().check("This crazy blacklist is lame");
        let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["crazy", "blacklist-whitelist", "lame"]);
    }

    #[test]
    fn clean_text_has_no_findings() {
        let findings = default_analyzer().check("Thanks for the thoughtful review");
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn analyze_matches_check() {
        let analyzer = default_analyzer();
        let text = "she updated the blacklist";
        let via_trait = analyzer.analyze(text).await.unwrap();
        assert_eq!(via_trait, analyzer.check(text));
        assert_eq!(analyzer.name(), "lexicon");
    }
}
