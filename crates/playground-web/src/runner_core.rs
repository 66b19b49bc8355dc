#![forbid(unsafe_code)]

//! Platform-independent runner core wrapping a playground [`Session`].
//!
//! This module contains the logic shared between the wasm-bindgen exports
//! and the native test harness. No JS/WASM types here: the host passes
//! strings in and gets strings (mostly JSON) back.

use chrono::{FixedOffset, Offset, Utc};
use playground_core::{
    ActiveTab, Clock, ContextId, IsolatedHost, LayoutMode, PlaygroundConfig, RecordId,
    RelayOutcome, Result, Session, SystemClock, share, template,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Largest offset chrono accepts, in minutes.
const MAX_UTC_OFFSET_MINUTES: f64 = 24.0 * 60.0 - 1.0;

/// Host-facing summary of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub context: u64,
    pub started_at: u64,
    pub document_len: usize,
}

/// Convert `Date.prototype.getTimezoneOffset()` (minutes *behind* UTC) into
/// a chrono offset. Out-of-range or non-finite input falls back to UTC.
#[must_use]
pub fn offset_from_js_minutes(minutes: f64) -> FixedOffset {
    let utc = Utc.fix();
    if !minutes.is_finite() || minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return utc;
    }
    FixedOffset::east_opt(-(minutes.round() as i32) * 60).unwrap_or(utc)
}

/// Largest integer a JS number represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert a record id received as a JS number. Fractional, negative,
/// non-finite or unsafe-integer values are rejected.
#[must_use]
pub fn record_id_from_js(id: f64) -> Option<u64> {
    if !id.is_finite() || id < 0.0 || id.fract() != 0.0 || id > MAX_SAFE_INTEGER {
        return None;
    }
    Some(id as u64)
}

pub struct RunnerCore<C: Clock = SystemClock> {
    session: Session<C>,
    utc_offset: FixedOffset,
}

impl RunnerCore<SystemClock> {
    /// Create a runner, seeding sources from `page_url` when it carries a
    /// complete share link.
    pub fn new(config: PlaygroundConfig, page_url: Option<&str>) -> Self {
        Self::with_clock(config, page_url, SystemClock)
    }
}

impl<C: Clock> RunnerCore<C> {
    pub fn with_clock(config: PlaygroundConfig, page_url: Option<&str>, clock: C) -> Self {
        let shared = page_url.and_then(|url| {
            share::decode_share_link(url, &config.share)
                .map_err(|err| {
                    warn!(
                        target: "playground_web::runner",
                        error = %err,
                        "ignoring unparsable page url"
                    );
                })
                .ok()
                .flatten()
        });
        let session = match shared {
            Some(sources) => {
                debug!(target: "playground_web::runner", "seeded sources from page url");
                Session::with_sources(config, sources, clock)
            }
            None => Session::new(config, clock),
        };
        Self {
            session,
            utc_offset: Utc.fix(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn set_utc_offset(&mut self, offset: FixedOffset) {
        self.utc_offset = offset;
    }

    /// Compose and load the current sources.
    pub fn run<H: IsolatedHost + ?Sized>(&mut self, host: &mut H) -> Result<RunSummary> {
        let report = self.session.run(host)?;
        Ok(RunSummary {
            context: report.context.get(),
            started_at: report.started_at.as_millis(),
            document_len: report.document_len,
        })
    }

    /// Feed a JSON-encoded message observed on the frame of `context`.
    pub fn relay_message(&mut self, context: ContextId, json: &str) -> RelayOutcome {
        let outcome = self.session.relay_json(context, json);
        debug!(
            target: "playground_web::runner",
            %context,
            ?outcome,
            "relayed frame message"
        );
        outcome
    }

    /// Switch the editing surface by language id (`html`, `css`,
    /// `javascript`). Returns `false` for unknown ids.
    pub fn set_active_tab(&mut self, language_id: &str) -> bool {
        match ActiveTab::from_language_id(language_id) {
            Some(tab) => {
                self.session.set_active_tab(tab);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn active_language(&self) -> &'static str {
        self.session.active_tab().language_id()
    }

    #[must_use]
    pub fn active_label(&self) -> &'static str {
        self.session.active_tab().label()
    }

    #[must_use]
    pub fn active_content(&self) -> &str {
        self.session.active_content()
    }

    pub fn edit_active(&mut self, text: String) {
        self.session.edit_active(text);
    }

    #[must_use]
    pub fn template_names(&self) -> Vec<&'static str> {
        template::names().collect()
    }

    pub fn apply_template(&mut self, name: &str) -> Result<()> {
        self.session.apply_template(name)
    }

    /// Flip the layout; returns the new mode as a camelCase string.
    pub fn toggle_layout(&mut self) -> &'static str {
        layout_name(self.session.toggle_layout())
    }

    #[must_use]
    pub fn layout(&self) -> &'static str {
        layout_name(self.session.layout())
    }

    pub fn clear_error(&mut self) {
        self.session.clear_error();
    }

    pub fn select_error(&mut self, id: u64) -> bool {
        self.session.select_error(RecordId::from_raw(id))
    }

    #[must_use]
    pub fn error_panel_json(&self) -> String {
        self.session.error_panel(self.utc_offset).to_json()
    }

    #[must_use]
    pub fn status_bar_json(&self) -> String {
        serde_json::to_string(&self.session.status_bar(self.utc_offset))
            .unwrap_or_else(|_| "{}".to_owned())
    }

    pub fn share_link(&self, base_url: &str) -> Result<String> {
        self.session.share_link(base_url)
    }

    #[must_use]
    pub fn sandbox_attribute(&self) -> String {
        self.session.config().sandbox_attribute()
    }
}

fn layout_name(mode: LayoutMode) -> &'static str {
    match mode {
        LayoutMode::SideBySide => "sideBySide",
        LayoutMode::StackedPreview => "stackedPreview",
    }
}
