//! View models for the error surface and the status bar.
//!
//! These are plain serializable snapshots; the shell renders them however it
//! likes.

use chrono::FixedOffset;
use serde::Serialize;

use crate::history::{ErrorHistory, RecordId};
use crate::record::{Clock, ErrorRecord, FailurePath, KindClass, Timestamp};
use crate::session::{LayoutMode, Session};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelEntry {
    pub id: RecordId,
    pub kind: String,
    pub kind_class: KindClass,
    pub accent: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub occurred_at: Timestamp,
    pub occurred_label: String,
    pub path: FailurePath,
}

impl PanelEntry {
    fn new(id: RecordId, record: &ErrorRecord, offset: FixedOffset) -> Self {
        let kind_class = record.kind_class();
        Self {
            id,
            kind: record.kind.clone(),
            kind_class,
            accent: kind_class.accent(),
            message: record.message.clone(),
            stack: record.stack.clone(),
            line: record.line,
            occurred_at: record.occurred_at,
            occurred_label: record.occurred_at.clock_label(offset),
            path: record.path,
        }
    }
}

/// Snapshot of the expandable error panel beside the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPanel {
    pub visible: bool,
    pub current: Option<PanelEntry>,
    /// History minus its newest entry, each re-selectable.
    pub older: Vec<PanelEntry>,
}

impl ErrorPanel {
    #[must_use]
    pub fn from_history(history: &ErrorHistory, offset: FixedOffset) -> Self {
        let current = history
            .current_id()
            .and_then(|id| history.get(id).map(|r| PanelEntry::new(id, r, offset)));
        let older = history
            .older()
            .map(|(id, r)| PanelEntry::new(id, r, offset))
            .collect();
        Self {
            visible: current.is_some(),
            current,
            older,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBar {
    /// `"Last run: HH:MM:SS"`, absent before the first run.
    pub last_run: Option<String>,
    pub layout: LayoutMode,
    pub layout_toggle_label: &'static str,
}

impl<C: Clock> Session<C> {
    #[must_use]
    pub fn error_panel(&self, offset: FixedOffset) -> ErrorPanel {
        ErrorPanel::from_history(&self.history, offset)
    }

    #[must_use]
    pub fn status_bar(&self, offset: FixedOffset) -> StatusBar {
        StatusBar {
            last_run: self
                .last_run
                .map(|ts| format!("Last run: {}", ts.clock_label(offset))),
            layout: self.layout,
            layout_toggle_label: self.layout.toggle_label(),
        }
    }
}
