//! Document composition.
//!
//! [`compose`] splices the three fragments verbatim into one self-contained
//! document and wraps the script in a guarded block. Two relay hooks are
//! injected:
//!
//! - a prelude in `<head>` forwarding the context's own `error` events
//!   (uncaught failures, parse failures of later script blocks) as path
//!   `"uncaught"`;
//! - a `catch` around the user script forwarding synchronous exceptions as
//!   path `"trap"`.
//!
//! Both post `{ type: "error", source, error: { message, stack, type,
//! lineNumber } }` to the parent window. Nothing is parsed or validated here;
//! malformed input only fails once the document executes.

use core::fmt;

/// Message tag marking relay traffic on the shared message bus.
pub const RELAY_MESSAGE_TAG: &str = "error";

const RELAY_PRELUDE: &str = r#"window.addEventListener('error', function (event) {
        var error = event.error;
        window.parent.postMessage({
          type: 'error',
          source: 'uncaught',
          error: {
            message: event.message,
            stack: error && error.stack,
            type: error && error.name,
            lineNumber: (error && error.lineNumber) || event.lineno
          }
        }, '*');
      });"#;

const TRAP_OPEN: &str = "try {\n";

const TRAP_CLOSE: &str = r#"
      } catch (error) {
        window.parent.postMessage({
          type: 'error',
          source: 'trap',
          error: {
            message: error && error.message,
            stack: error && error.stack,
            type: error && error.name,
            lineNumber: error && error.lineNumber
          }
        }, '*');
      }"#;

/// A complete executable document built from one [`SourceSet`] snapshot.
///
/// [`SourceSet`]: crate::SourceSet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComposedDocument(String);

impl ComposedDocument {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ComposedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComposedDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the executable document for `sources`. Pure and infallible.
#[must_use]
pub fn compose(sources: &crate::SourceSet) -> ComposedDocument {
    let mut doc = String::with_capacity(
        sources.markup.len()
            + sources.style.len()
            + sources.script.len()
            + RELAY_PRELUDE.len()
            + TRAP_CLOSE.len()
            + 256,
    );

    doc.push_str("<!DOCTYPE html>\n<html>\n  <head>\n    <style>");
    doc.push_str(&sources.style);
    doc.push_str("</style>\n    <script>\n      ");
    doc.push_str(RELAY_PRELUDE);
    doc.push_str("\n    </script>\n  </head>\n  <body>\n");
    doc.push_str(&sources.markup);
    doc.push_str("\n    <script>\n      ");
    doc.push_str(TRAP_OPEN);
    doc.push_str(&sources.script);
    doc.push_str(TRAP_CLOSE);
    doc.push_str("\n    </script>\n  </body>\n</html>\n");

    ComposedDocument(doc)
}
