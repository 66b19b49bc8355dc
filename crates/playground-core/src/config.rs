//! Playground configuration.
//!
//! Every field has a default, so `PlaygroundConfig::default()` is a working
//! setup and a JSON document only needs to name what it overrides:
//!
//! ```json
//! { "history_capacity": 8, "log_filter": "playground=debug" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, Result};

/// Sandbox tokens that would let the isolated document escape its context.
const FORBIDDEN_SANDBOX_TOKENS: [&str; 4] = [
    "allow-same-origin",
    "allow-top-navigation",
    "allow-top-navigation-by-user-activation",
    "allow-top-navigation-to-custom-protocols",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Maximum number of retained error records.
    pub history_capacity: usize,
    /// Tokens for the isolated frame's `sandbox` attribute.
    pub sandbox: Vec<String>,
    /// Query parameter names used by share links.
    pub share: ShareParams,
    /// `tracing` filter directive installed by the web shell.
    pub log_filter: String,
    /// Template applied at startup when no share link seeds the sources.
    pub initial_template: Option<String>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            history_capacity: 5,
            sandbox: vec!["allow-scripts".to_owned()],
            share: ShareParams::default(),
            log_filter: "info".to_owned(),
            initial_template: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareParams {
    pub markup: String,
    pub style: String,
    pub script: String,
}

impl Default for ShareParams {
    fn default() -> Self {
        Self {
            markup: "html".to_owned(),
            style: "css".to_owned(),
            script: "js".to_owned(),
        }
    }
}

impl ShareParams {
    #[must_use]
    pub fn names(&self) -> [&str; 3] {
        [&self.markup, &self.style, &self.script]
    }
}

impl PlaygroundConfig {
    /// Load from a JSON string. Does not validate.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(PlaygroundError::Config)
    }

    /// Load from JSON and reject invalid values.
    pub fn from_json_str_validated(s: &str) -> Result<Self> {
        let config = Self::from_json_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(PlaygroundError::Validation(errors))
        }
    }

    /// Space-separated `sandbox` attribute value.
    #[must_use]
    pub fn sandbox_attribute(&self) -> String {
        self.sandbox.join(" ")
    }

    /// Returns a list of validation errors. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.history_capacity == 0 {
            errors.push("history_capacity must be > 0".into());
        }

        for token in &self.sandbox {
            let token = token.trim().to_ascii_lowercase();
            if FORBIDDEN_SANDBOX_TOKENS.contains(&token.as_str()) {
                errors.push(format!("sandbox token {token:?} is not permitted"));
            }
        }
        if !self
            .sandbox
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case("allow-scripts"))
        {
            errors.push("sandbox must include \"allow-scripts\"".into());
        }

        let names = self.share.names();
        if names.iter().any(|n| n.trim().is_empty()) {
            errors.push("share parameter names must be non-empty".into());
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            errors.push(format!("share parameter names must be distinct, got {names:?}"));
        }

        if let Some(name) = &self.initial_template
            && crate::template::find(name).is_none()
        {
            errors.push(format!("initial_template {name:?} is not in the catalog"));
        }

        errors
    }
}
