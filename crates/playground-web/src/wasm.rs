#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the playground.
//!
//! Wraps [`super::runner_core::RunnerCore`] and an [`IframeHost`] with
//! JS-friendly types. Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, JSON, Object, Reflect};
use playground_core::{ContextId, PlaygroundConfig, PlaygroundError, RelayOutcome};
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use super::frame_host::{IframeHost, MessageSink};
use super::logging::init_logging;
use super::runner_core::{RunnerCore, offset_from_js_minutes, record_id_from_js};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

fn to_js_error(err: &PlaygroundError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse core-produced JSON into a JS object; falls back to the raw string.
fn json_to_js(json: &str) -> JsValue {
    JSON::parse(json).unwrap_or_else(|_| JsValue::from_str(json))
}

fn notify(on_change: &RefCell<Option<Function>>, panel_json: &str) {
    // Clone out so the callback may re-register itself.
    let Some(callback) = on_change.borrow().clone() else {
        return;
    };
    if let Err(err) = callback.call1(&JsValue::NULL, &json_to_js(panel_json)) {
        warn!(target: "playground_web::host", error = ?err, "onChange callback threw");
    }
}

/// Fire `onChange` on the microtask queue, after the calling export has
/// returned and released its borrow of the `Playground`.
fn notify_after_return(on_change: &Rc<RefCell<Option<Function>>>, panel_json: String) {
    let on_change = Rc::clone(on_change);
    wasm_bindgen_futures::spawn_local(async move {
        notify(&on_change, &panel_json);
    });
}

fn relay_into(
    core: &Weak<RefCell<RunnerCore>>,
    on_change: &RefCell<Option<Function>>,
    context: ContextId,
    json: &str,
) {
    let Some(core) = core.upgrade() else {
        return;
    };
    let panel = {
        let Ok(mut core) = core.try_borrow_mut() else {
            warn!(
                target: "playground_web::host",
                %context,
                "runner busy; dropping frame message"
            );
            return;
        };
        match core.relay_message(context, json) {
            RelayOutcome::Recorded(_) => core.error_panel_json(),
            RelayOutcome::Stale | RelayOutcome::Unrelated => return,
        }
    };
    notify(on_change, &panel);
}

/// Live HTML/CSS/JS playground mounted into a host-provided container.
#[wasm_bindgen]
pub struct Playground {
    core: Rc<RefCell<RunnerCore>>,
    host: IframeHost,
    on_change: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl Playground {
    /// Mount into `container`. `config_json` is an optional
    /// `PlaygroundConfig` document; the page URL seeds sources when it is a
    /// complete share link.
    #[wasm_bindgen(constructor)]
    pub fn new(container: Element, config_json: Option<String>) -> Result<Playground, JsValue> {
        install_panic_hook();

        let config = match config_json.as_deref() {
            Some(json) => {
                PlaygroundConfig::from_json_str_validated(json).map_err(|e| to_js_error(&e))?
            }
            None => PlaygroundConfig::default(),
        };
        init_logging(&config.log_filter);

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let page_url = window.location().href().ok();
        let mut core = RunnerCore::new(config, page_url.as_deref());
        core.set_utc_offset(offset_from_js_minutes(
            js_sys::Date::new_0().get_timezone_offset(),
        ));
        let sandbox = core.sandbox_attribute();

        let core = Rc::new(RefCell::new(core));
        let on_change = Rc::new(RefCell::new(None::<Function>));
        let sink: MessageSink = {
            let core = Rc::downgrade(&core);
            let on_change = Rc::clone(&on_change);
            Rc::new(move |context: ContextId, json: String| {
                relay_into(&core, &on_change, context, &json);
            })
        };
        let host = IframeHost::new(window, container, sandbox, sink);
        info!(target: "playground_web::host", "playground mounted");

        Ok(Self {
            core,
            host,
            on_change,
        })
    }

    /// Compose the sources and load them into a fresh frame. Returns
    /// `{ context, startedAt, documentLen }`.
    pub fn run(&mut self) -> Result<JsValue, JsValue> {
        let (summary, panel) = {
            let mut core = self.core.borrow_mut();
            let summary = core.run(&mut self.host).map_err(|e| to_js_error(&e))?;
            (summary, core.error_panel_json())
        };
        notify_after_return(&self.on_change, panel);

        let obj = Object::new();
        set_js(&obj, "context", JsValue::from_f64(summary.context as f64));
        set_js(&obj, "startedAt", JsValue::from_f64(summary.started_at as f64));
        set_js(
            &obj,
            "documentLen",
            JsValue::from_f64(summary.document_len as f64),
        );
        Ok(obj.into())
    }

    /// Select the editing tab by language id (`html`, `css`, `javascript`).
    #[wasm_bindgen(js_name = setActiveTab)]
    pub fn set_active_tab(&mut self, language_id: &str) -> bool {
        self.core.borrow_mut().set_active_tab(language_id)
    }

    #[wasm_bindgen(js_name = activeTab)]
    pub fn active_tab(&self) -> String {
        self.core.borrow().active_language().to_owned()
    }

    #[wasm_bindgen(js_name = activeLabel)]
    pub fn active_label(&self) -> String {
        self.core.borrow().active_label().to_owned()
    }

    #[wasm_bindgen(js_name = activeContent)]
    pub fn active_content(&self) -> String {
        self.core.borrow().active_content().to_owned()
    }

    /// Content-changed callback from the editor. Does not run.
    #[wasm_bindgen(js_name = editActive)]
    pub fn edit_active(&mut self, text: String) {
        self.core.borrow_mut().edit_active(text);
    }

    #[wasm_bindgen(js_name = templateNames)]
    pub fn template_names(&self) -> Array {
        self.core
            .borrow()
            .template_names()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    }

    #[wasm_bindgen(js_name = applyTemplate)]
    pub fn apply_template(&mut self, name: &str) -> Result<(), JsValue> {
        self.core
            .borrow_mut()
            .apply_template(name)
            .map_err(|e| to_js_error(&e))
    }

    #[wasm_bindgen(js_name = toggleLayout)]
    pub fn toggle_layout(&mut self) -> String {
        self.core.borrow_mut().toggle_layout().to_owned()
    }

    #[wasm_bindgen(js_name = layoutMode)]
    pub fn layout_mode(&self) -> String {
        self.core.borrow().layout().to_owned()
    }

    #[wasm_bindgen(js_name = clearError)]
    pub fn clear_error(&mut self) {
        let panel = {
            let mut core = self.core.borrow_mut();
            core.clear_error();
            core.error_panel_json()
        };
        notify_after_return(&self.on_change, panel);
    }

    #[wasm_bindgen(js_name = selectError)]
    pub fn select_error(&mut self, id: f64) -> bool {
        let Some(id) = record_id_from_js(id) else {
            return false;
        };
        let panel = {
            let mut core = self.core.borrow_mut();
            if !core.select_error(id) {
                return false;
            }
            core.error_panel_json()
        };
        notify_after_return(&self.on_change, panel);
        true
    }

    #[wasm_bindgen(js_name = errorPanel)]
    pub fn error_panel(&self) -> JsValue {
        json_to_js(&self.core.borrow().error_panel_json())
    }

    #[wasm_bindgen(js_name = statusBar)]
    pub fn status_bar(&self) -> JsValue {
        json_to_js(&self.core.borrow().status_bar_json())
    }

    /// Share link for the current sources, based on `base_url` or the page
    /// URL when omitted.
    #[wasm_bindgen(js_name = shareLink)]
    pub fn share_link(&self, base_url: Option<String>) -> Result<String, JsValue> {
        let base = match base_url {
            Some(base) => base,
            None => web_sys::window()
                .ok_or_else(|| JsValue::from_str("no global window"))?
                .location()
                .href()?,
        };
        self.core
            .borrow()
            .share_link(&base)
            .map_err(|e| to_js_error(&e))
    }

    /// Register `callback(panel)` fired whenever the error panel changes.
    /// Relayed failures invoke it synchronously from the frame's `message`
    /// event; changes made by `run`, `clearError` and `selectError` invoke
    /// it in a microtask once that call has returned, so the callback may
    /// call back into this object. Pass `undefined` to unregister.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Option<Function>) {
        *self.on_change.borrow_mut() = callback;
    }

    /// Remove the preview frame and its listener.
    pub fn destroy(&mut self) {
        self.host.unload();
        self.on_change.borrow_mut().take();
        info!(target: "playground_web::host", "playground destroyed");
    }
}
