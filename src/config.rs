//! Configuration types.

use std::collections::HashSet;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default port for the events listener.
const DEFAULT_PORT: u16 = 3000;

/// Rule ids exempted out of the box. These terms have common benign
/// readings ("invalid input", "bi-directional") that make unconditional
/// flagging more noise than help.
const DEFAULT_ALLOW_RULES: &[&str] = &[
    "bi",
    "he-she",
    "her-him",
    "herself-himself",
    "host-hostess",
    "invalid",
];

/// Default profanity sureness. Sits outside the meaningful 0..=2 range,
/// which switches the profanity sub-check off entirely.
const DEFAULT_PROFANITY_SURENESS: i8 = 3;

/// Which text-analysis backend to wire into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerBackend {
    /// Built-in synchronous lexicon checker.
    Lexicon,
    /// Remote multi-preset analysis service.
    PresetApi,
}

impl std::str::FromStr for AnalyzerBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexicon" => Ok(Self::Lexicon),
            "preset-api" => Ok(Self::PresetApi),
            other => Err(ConfigError::InvalidValue {
                key: "TACTBOT_ANALYZER".to_string(),
                message: format!("unknown backend '{other}' (expected 'lexicon' or 'preset-api')"),
            }),
        }
    }
}

/// Analyzer tuning shared by both backends.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Rule ids whose findings are suppressed.
    pub allowed_rules: HashSet<String>,
    /// Minimum sureness rating (0..=2) a profanity entry needs to be
    /// flagged. Values outside that range disable the sub-check.
    pub profanity_sureness: i8,
    /// Also flag paired binary-pronoun forms ("he or she", "him/her").
    pub no_binary: bool,
    /// Named rule presets requested from the remote backend.
    pub presets: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            allowed_rules: HashSet::new(),
            profanity_sureness: 0,
            no_binary: false,
            presets: vec!["ableism".to_string()],
        }
    }
}

impl ModerationConfig {
    /// Whether the profanity sub-check runs at all. Sureness ratings are
    /// meaningful only within 0..=2; configuring a value outside that
    /// range is the documented way to switch the sub-check off.
    pub fn profanity_enabled(&self) -> bool {
        (0..=2).contains(&self.profanity_sureness)
    }
}

/// Full process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bot token for Web API calls (xoxb-...).
    pub bot_token: SecretString,
    /// Signing secret for verifying inbound event requests.
    pub signing_secret: SecretString,
    /// Port for the events listener.
    pub port: u16,
    /// Which analysis backend to run.
    pub backend: AnalyzerBackend,
    /// Base URL of the remote analysis service (preset-api backend only).
    pub analysis_url: Option<String>,
    /// Analyzer tuning.
    pub moderation: ModerationConfig,
}

impl AppConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("SLACK_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("SLACK_BOT_TOKEN".to_string()))?;
        let signing_secret = std::env::var("SLACK_SIGNING_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("SLACK_SIGNING_SECRET".to_string()))?;

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let backend = match std::env::var("TACTBOT_ANALYZER") {
            Ok(s) => s.parse()?,
            Err(_) => AnalyzerBackend::Lexicon,
        };

        let analysis_url = std::env::var("TACTBOT_ANALYSIS_URL").ok();
        if backend == AnalyzerBackend::PresetApi && analysis_url.is_none() {
            return Err(ConfigError::MissingEnvVar("TACTBOT_ANALYSIS_URL".to_string()));
        }

        let allowed_rules = match std::env::var("TACTBOT_ALLOW_RULES") {
            Ok(s) => split_list(&s).into_iter().collect(),
            Err(_) => DEFAULT_ALLOW_RULES.iter().map(|s| s.to_string()).collect(),
        };

        let profanity_sureness: i8 = std::env::var("TACTBOT_PROFANITY_SURENESS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PROFANITY_SURENESS);

        let no_binary = std::env::var("TACTBOT_NO_BINARY")
            .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let presets = match std::env::var("TACTBOT_PRESETS") {
            Ok(s) => split_list(&s),
            Err(_) => vec!["ableism".to_string()],
        };

        Ok(Self {
            bot_token: bot_token.into(),
            signing_secret: signing_secret.into(),
            port,
            backend,
            analysis_url,
            moderation: ModerationConfig {
                allowed_rules,
                profanity_sureness,
                no_binary,
                presets,
            },
        })
    }
}

/// Split a comma-separated environment value into trimmed entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
