//! Normalized failure records and the clock that stamps them.

use core::cell::Cell;
use core::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

/// Kind used when the underlying failure carries no name.
pub const DEFAULT_KIND: &str = "Error";

/// Wall-clock instant in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const UNIX_EPOCH: Self = Self(0);

    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let ms = i64::try_from(self.0).ok()?;
        DateTime::<Utc>::from_timestamp_millis(ms)
    }

    /// `HH:MM:SS` in the given offset; empty if out of chrono's range.
    #[must_use]
    pub fn clock_label(self, offset: FixedOffset) -> String {
        self.to_datetime()
            .map(|dt| dt.with_timezone(&offset).format("%H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// Source of observation time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Real wall clock. Backed by `web-time` so it also works on `wasm32`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Timestamp(ms)
    }
}

/// Deterministic clock controlled by the caller.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start.0),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now.0);
    }

    pub fn advance_ms(&self, dt: u64) {
        self.now.set(self.now.get().saturating_add(dt));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Which relay path observed a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePath {
    /// Synchronous exception caught by the guarded block.
    Trap,
    /// The isolated context's own uncaught-error notification.
    Uncaught,
}

impl FailurePath {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trap => "trap",
            Self::Uncaught => "uncaught",
        }
    }
}

impl fmt::Display for FailurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured failure. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub kind: String,
    pub occurred_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub path: FailurePath,
}

impl ErrorRecord {
    #[must_use]
    pub fn kind_class(&self) -> KindClass {
        KindClass::of(&self.kind)
    }
}

/// Display-only grouping of the open `kind` taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KindClass {
    Syntax,
    Type,
    Reference,
    Other,
}

impl KindClass {
    #[must_use]
    pub fn of(kind: &str) -> Self {
        match kind {
            "SyntaxError" => Self::Syntax,
            "TypeError" => Self::Type,
            "ReferenceError" => Self::Reference,
            _ => Self::Other,
        }
    }

    /// Badge colour used by the error surface.
    #[must_use]
    pub const fn accent(self) -> &'static str {
        match self {
            Self::Syntax => "#ffa500",
            Self::Reference => "#ff00ff",
            Self::Type | Self::Other => "#ff0000",
        }
    }
}
