//! Remote multi-preset analysis backend.
//!
//! Talks to an HTTP analysis service that groups its rules into named
//! presets ("ableism", "condescending", ...). The wire contract:
//!
//! `POST {base}/v1/check` with `{"text": ..., "presets": [...]}` returns
//! `{"findings": [{"rule": ..., "message": ..., "preset": ...}]}`.
//!
//! Any transport failure, non-success status, or undecodable body surfaces
//! as an [`AnalysisError`]; the pipeline treats that as "no result", never
//! as "no findings".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::{Finding, TextAnalyzer};
use crate::error::AnalysisError;

/// Client for the remote analysis service.
pub struct PresetApiAnalyzer {
    base_url: String,
    presets: Vec<String>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    text: &'a str,
    presets: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    findings: Vec<ApiFinding>,
}

#[derive(Debug, Deserialize)]
struct ApiFinding {
    rule: String,
    message: String,
    #[serde(default)]
    preset: Option<String>,
}

impl PresetApiAnalyzer {
    pub fn new(base_url: String, presets: Vec<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            presets,
            client: reqwest::Client::new(),
        }
    }

    fn check_url(&self) -> String {
        format!("{}/v1/check", self.base_url)
    }
}

#[async_trait]
impl TextAnalyzer for PresetApiAnalyzer {
    fn name(&self) -> &str {
        "preset-api"
    }

    async fn analyze(&self, text: &str) -> Result<Vec<Finding>, AnalysisError> {
        let request = CheckRequest {
            text,
            presets: &self.presets,
        };

        let response = self
            .client
            .post(self.check_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Backend {
                backend: "preset-api".to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let decoded: CheckResponse =
            response.json().await.map_err(|e| AnalysisError::InvalidResponse {
                backend: "preset-api".to_string(),
                reason: e.to_string(),
            })?;

        Ok(decoded
            .findings
            .into_iter()
            .map(|f| Finding {
                rule_id: f.rule,
                message: f.message,
                source: f.preset,
            })
            .collect())
    }
}
