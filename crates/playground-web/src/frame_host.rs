#![forbid(unsafe_code)]

//! Browser [`IsolatedHost`] backed by a sandboxed `<iframe>`.
//!
//! Every load tears down the previous frame together with its message
//! listener and inserts a brand-new frame, so a late notification from an
//! old document can never reach the new subscription. Messages are matched
//! to a frame by comparing `MessageEvent.source` with the frame's
//! `contentWindow`; the sandbox has no `allow-same-origin`, so origin checks
//! are useless (it is always `"null"`).

use std::rc::Rc;

use js_sys::{JSON, Object, Reflect};
use playground_core::{ComposedDocument, ContextId, HostError, IsolatedHost};
use serde_json::{Map, Number, Value, json};
use tracing::{debug, trace};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlIFrameElement, MessageEvent, Window};

/// Receives the JSON text of every message posted by the loaded frame.
pub(crate) type MessageSink = Rc<dyn Fn(ContextId, String)>;

fn js_error(context: &str, err: &JsValue) -> HostError {
    HostError::new(format!("{context}: {err:?}"))
}

/// JSON text for a frame message, or `None` when there is nothing to relay.
///
/// Never throws back into the host. `undefined`, `null` and values JSON
/// cannot express (functions, symbols) yield `None`; payloads structured
/// clone accepts but `JSON.stringify` rejects (BigInt, cycles) are rebuilt
/// field by field so a tagged failure still reaches the history.
fn frame_message_json(data: &JsValue, context: ContextId) -> Option<String> {
    if data.is_undefined() || data.is_null() {
        return None;
    }
    match JSON::stringify(data) {
        Ok(text) => text.as_string(),
        Err(err) => {
            debug!(
                target: "playground_web::host",
                %context,
                error = ?err,
                "frame message is not JSON-safe; relaying fields individually"
            );
            degraded_payload(data)
        }
    }
}

fn present_field(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

/// Strings and finite numbers pass through; anything else is rendered with
/// wasm-bindgen's debug formatting, which cannot throw.
fn degraded_field(value: &JsValue) -> Value {
    if let Some(text) = value.as_string() {
        return Value::String(text);
    }
    if let Some(number) = value.as_f64().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(format!("{value:?}"))
}

fn degraded_payload(data: &JsValue) -> Option<String> {
    if !data.is_object() {
        return None;
    }
    let tag = present_field(data, "type")?.as_string()?;
    let source = present_field(data, "source").and_then(|value| value.as_string());

    let mut error = Map::new();
    if let Some(inner) = present_field(data, "error").filter(JsValue::is_object) {
        for key in ["message", "stack", "type", "lineNumber"] {
            if let Some(value) = present_field(&inner, key) {
                error.insert(key.to_owned(), degraded_field(&value));
            }
        }
    }
    let payload = json!({ "type": tag, "source": source, "error": error });
    Some(payload.to_string())
}

/// A `message` listener on the host window, removed on drop.
struct MessageSubscription {
    window: Window,
    callback: Closure<dyn FnMut(MessageEvent)>,
}

impl MessageSubscription {
    fn attach(
        window: Window,
        frame_window: Window,
        context: ContextId,
        sink: MessageSink,
    ) -> Result<Self, HostError> {
        let callback = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let from_frame = event
                .source()
                .is_some_and(|source| Object::is(&source, &frame_window));
            if !from_frame {
                return;
            }
            let Some(json) = frame_message_json(&event.data(), context) else {
                trace!(target: "playground_web::host", %context, "ignoring empty frame message");
                return;
            };
            trace!(target: "playground_web::host", %context, len = json.len(), "frame message");
            sink(context, json);
        });
        window
            .add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())
            .map_err(|err| js_error("addEventListener(message)", &err))?;
        Ok(Self { window, callback })
    }
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("message", self.callback.as_ref().unchecked_ref());
    }
}

struct LoadedFrame {
    context: ContextId,
    frame: HtmlIFrameElement,
    // Dropped together with the frame.
    _subscription: MessageSubscription,
}

impl Drop for LoadedFrame {
    fn drop(&mut self) {
        self.frame.remove();
        debug!(target: "playground_web::host", context = %self.context, "removed frame");
    }
}

pub(crate) struct IframeHost {
    window: Window,
    container: Element,
    sandbox: String,
    sink: MessageSink,
    loaded: Option<LoadedFrame>,
}

impl IframeHost {
    pub(crate) fn new(
        window: Window,
        container: Element,
        sandbox: String,
        sink: MessageSink,
    ) -> Self {
        Self {
            window,
            container,
            sandbox,
            sink,
            loaded: None,
        }
    }

    /// Remove the current frame, if any, along with its listener.
    pub(crate) fn unload(&mut self) {
        self.loaded = None;
    }

    fn create_frame(&self) -> Result<HtmlIFrameElement, HostError> {
        let document = self
            .window
            .document()
            .ok_or_else(|| HostError::new("window has no document"))?;
        let frame = document
            .create_element("iframe")
            .map_err(|err| js_error("createElement(iframe)", &err))?
            .dyn_into::<HtmlIFrameElement>()
            .map_err(|_| HostError::new("created element is not an iframe"))?;
        frame
            .set_attribute("sandbox", &self.sandbox)
            .map_err(|err| js_error("setAttribute(sandbox)", &err))?;
        frame
            .set_attribute("title", "Preview")
            .map_err(|err| js_error("setAttribute(title)", &err))?;
        Ok(frame)
    }
}

impl IsolatedHost for IframeHost {
    fn load(&mut self, context: ContextId, document: &ComposedDocument) -> Result<(), HostError> {
        self.unload();

        let frame = self.create_frame()?;
        self.container
            .append_child(&frame)
            .map_err(|err| js_error("appendChild(iframe)", &err))?;
        let Some(frame_window) = frame.content_window() else {
            frame.remove();
            return Err(HostError::new("frame has no content window"));
        };

        // Subscribe before the document starts executing.
        let subscription = match MessageSubscription::attach(
            self.window.clone(),
            frame_window,
            context,
            Rc::clone(&self.sink),
        ) {
            Ok(subscription) => subscription,
            Err(err) => {
                frame.remove();
                return Err(err);
            }
        };
        frame.set_srcdoc(document.as_str());
        debug!(
            target: "playground_web::host",
            %context,
            sandbox = %self.sandbox,
            "loaded frame"
        );

        self.loaded = Some(LoadedFrame {
            context,
            frame,
            _subscription: subscription,
        });
        Ok(())
    }
}
