#![forbid(unsafe_code)]

//! Platform-independent core of the live HTML/CSS/JS playground.
//!
//! The playground edits three source fragments, composes them into one
//! executable document on an explicit run, loads that document into an
//! isolated execution context, and relays failures raised inside that
//! context back into a bounded error history.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment owns the isolated context and
//!   pushes notifications in; nothing here touches JS or the DOM.
//! - **Explicit state**: every operation works on a [`Session`] passed in by
//!   the caller. There are no globals.
//! - **Never crash the host**: malformed notifications degrade to partially
//!   filled [`ErrorRecord`]s instead of errors.
//!
//! ```ignore
//! let mut session = Session::new(PlaygroundConfig::default(), SystemClock);
//! session.edit_active("<button id=\"go\">Go</button>".into());
//! let report = session.run(&mut host)?;
//! // later, from the host's message listener:
//! session.relay_json(report.context, payload_json);
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod history;
pub mod record;
pub mod relay;
pub mod run;
pub mod session;
pub mod share;
pub mod source;
pub mod template;
pub mod view;

pub use compose::{ComposedDocument, compose};
pub use config::{PlaygroundConfig, ShareParams};
pub use error::{HostError, PlaygroundError, Result};
pub use history::{ErrorHistory, RecordId};
pub use record::{Clock, ErrorRecord, FailurePath, KindClass, ManualClock, SystemClock, Timestamp};
pub use relay::{ErrorRelay, FailureReport, Inbound, parse_notification};
pub use run::{ContextId, IsolatedHost, RelayOutcome, RunReport};
pub use session::{LayoutMode, Session};
pub use source::{ActiveTab, BufferAccessor, SourceSet};
pub use template::Template;
pub use view::{ErrorPanel, PanelEntry, StatusBar};
