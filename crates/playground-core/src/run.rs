//! Run controller and relay entry points.
//!
//! A run clears the displayed error, composes the current sources, hands the
//! document to an [`IsolatedHost`] under a fresh [`ContextId`], and stamps the
//! run time. Notifications are accepted only for the context that is loaded
//! right now; anything from a superseded context is dropped as
//! [`RelayOutcome::Stale`].

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compose::{ComposedDocument, compose};
use crate::error::{HostError, Result};
use crate::history::RecordId;
use crate::record::{Clock, FailurePath, Timestamp};
use crate::relay::{ErrorRelay, Inbound, parse_notification};
use crate::session::Session;

/// Identity of one isolated context instance. A new one per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(u64);

impl ContextId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// The sandboxed rendering context that executes composed documents.
///
/// `load` must replace whatever was displayed before with a brand-new
/// context, and subscribe exactly once to that context's two failure paths,
/// tagging everything it later relays with `context`. Subscriptions for the
/// previous context are torn down with it.
pub trait IsolatedHost {
    fn load(
        &mut self,
        context: ContextId,
        document: &ComposedDocument,
    ) -> core::result::Result<(), HostError>;
}

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub context: ContextId,
    pub started_at: Timestamp,
    pub document_len: usize,
}

/// What the relay did with one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Recorded(RecordId),
    /// From a context that is no longer loaded.
    Stale,
    /// Not relay traffic.
    Unrelated,
}

impl<C: Clock> Session<C> {
    /// Compose the current sources and load them into `host`.
    ///
    /// The displayed error is cleared before the load so that anything
    /// observed afterwards belongs to this run. On a host failure the
    /// previous context is still considered gone.
    pub fn run<H: IsolatedHost + ?Sized>(&mut self, host: &mut H) -> Result<RunReport> {
        self.history.clear_current();

        let document = compose(&self.sources);
        let context = ContextId(self.next_context);
        self.next_context = self.next_context.saturating_add(1);
        self.loaded = None;

        if let Err(err) = host.load(context, &document) {
            warn!(
                target: "playground::run",
                %context,
                error = %err,
                "isolated host failed to load document"
            );
            return Err(err.into());
        }

        let started_at = self.clock.now();
        self.loaded = Some(context);
        self.last_run = Some(started_at);
        info!(
            target: "playground::run",
            %context,
            document_len = document.len(),
            "loaded composed document"
        );
        Ok(RunReport {
            context,
            started_at,
            document_len: document.len(),
        })
    }

    /// Feed one classified notification observed on `context`.
    ///
    /// Both paths are recorded independently; a failure reported by both
    /// produces two entries.
    pub fn relay(&mut self, context: ContextId, inbound: Inbound) -> RelayOutcome {
        let (report, path) = match inbound {
            Inbound::Unrelated => return RelayOutcome::Unrelated,
            Inbound::Trap(report) => (report, FailurePath::Trap),
            Inbound::Uncaught(report) => (report, FailurePath::Uncaught),
        };
        if self.loaded != Some(context) {
            debug!(
                target: "playground::relay",
                %context,
                loaded = ?self.loaded,
                %path,
                "dropping notification from superseded context"
            );
            return RelayOutcome::Stale;
        }

        let record = ErrorRelay::normalize(report, path, self.clock.now());
        debug!(
            target: "playground::relay",
            %context,
            %path,
            kind = %record.kind,
            line = ?record.line,
            "recorded failure"
        );
        RelayOutcome::Recorded(self.history.record(record))
    }

    /// Parse and feed a JSON-encoded notification.
    pub fn relay_json(&mut self, context: ContextId, json: &str) -> RelayOutcome {
        self.relay(context, parse_notification(json))
    }
}
