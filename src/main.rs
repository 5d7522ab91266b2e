use std::sync::Arc;

use tactbot::analysis::{LexiconAnalyzer, PresetApiAnalyzer, TextAnalyzer};
use tactbot::config::{AnalyzerBackend, AppConfig};
use tactbot::pipeline::Moderator;
use tactbot::slack::events::{AppState, event_routes};
use tactbot::slack::SlackClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read configuration from environment
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export SLACK_BOT_TOKEN=xoxb-...");
        eprintln!("  export SLACK_SIGNING_SECRET=...");
        std::process::exit(1);
    });

    eprintln!("🤖 tactbot v{}", env!("CARGO_PKG_VERSION"));

    let slack = Arc::new(SlackClient::new(config.bot_token.clone()));

    // Fail fast on bad credentials; nothing works without the Web API
    let identity = slack.auth_test().await.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    eprintln!("   Workspace: {} (as {})", identity.team, identity.user);

    let analyzer: Arc<dyn TextAnalyzer> = match config.backend {
        AnalyzerBackend::Lexicon => {
            let moderation = &config.moderation;
            eprintln!(
                "   Analyzer: lexicon ({} allowed rules, profanity {})",
                moderation.allowed_rules.len(),
                if moderation.profanity_enabled() {
                    format!("sureness >= {}", moderation.profanity_sureness)
                } else {
                    "off".to_string()
                }
            );
            Arc::new(LexiconAnalyzer::new(config.moderation.clone()))
        }
        AnalyzerBackend::PresetApi => {
            let url = config.analysis_url.clone().unwrap_or_else(|| {
                eprintln!("Error: TACTBOT_ANALYSIS_URL not set");
                eprintln!("  export TACTBOT_ANALYSIS_URL=https://analysis.internal");
                std::process::exit(1);
            });
            eprintln!(
                "   Analyzer: preset-api at {} (presets: {})",
                url,
                config.moderation.presets.join(", ")
            );
            Arc::new(PresetApiAnalyzer::new(url, config.moderation.presets.clone()))
        }
    };

    let moderator = Arc::new(Moderator::new(analyzer, slack));

    let state = AppState {
        moderator,
        signing_secret: config.signing_secret.clone(),
    };
    let app = event_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    eprintln!("   Events: http://0.0.0.0:{}/slack/events", config.port);
    eprintln!("\n⚡️ App is online!\n");

    axum::serve(listener, app).await?;

    Ok(())
}
