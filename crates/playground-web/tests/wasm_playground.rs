#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise};
use playground_web::Playground;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn mount_point() -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let container = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn field(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn run_mounts_one_sandboxed_frame() {
    let container = mount_point();
    let mut playground = Playground::new(container.clone(), None).unwrap();
    assert_eq!(container.child_element_count(), 0);

    let summary = playground.run().unwrap();
    assert_eq!(field(&summary, "context").as_f64(), Some(1.0));

    let frame = container.first_element_child().unwrap();
    assert_eq!(frame.tag_name(), "IFRAME");
    assert_eq!(frame.get_attribute("sandbox").as_deref(), Some("allow-scripts"));
    let srcdoc = frame.get_attribute("srcdoc").unwrap();
    assert!(srcdoc.contains("<button class=\"btn\">Click me!</button>"));
}

#[wasm_bindgen_test]
fn rerun_replaces_the_frame() {
    let container = mount_point();
    let mut playground = Playground::new(container.clone(), None).unwrap();
    playground.run().unwrap();
    let first = container.first_element_child().unwrap();

    playground.apply_template("Counter App").unwrap();
    let summary = playground.run().unwrap();
    assert_eq!(field(&summary, "context").as_f64(), Some(2.0));
    assert_eq!(container.child_element_count(), 1);

    let second = container.first_element_child().unwrap();
    assert!(!first.is_same_node(Some(&second)));
    assert!(second.get_attribute("srcdoc").unwrap().contains("Counter"));
}

#[wasm_bindgen_test]
fn destroy_removes_the_frame() {
    let container = mount_point();
    let mut playground = Playground::new(container.clone(), None).unwrap();
    playground.run().unwrap();
    playground.destroy();
    assert_eq!(container.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    let config = r#"{"sandbox":["allow-scripts","allow-same-origin"]}"#;
    let err = Playground::new(mount_point(), Some(config.to_owned())).err().unwrap();
    assert!(err.as_string().unwrap().contains("allow-same-origin"));
}

#[wasm_bindgen_test]
fn panels_start_empty() {
    let playground = Playground::new(mount_point(), None).unwrap();
    assert_eq!(field(&playground.error_panel(), "visible").as_bool(), Some(false));
    assert!(field(&playground.status_bar(), "lastRun").is_null());
    assert_eq!(
        field(&playground.status_bar(), "layoutToggleLabel").as_string().as_deref(),
        Some("Full Preview")
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Relay round trips through a live frame
// ═══════════════════════════════════════════════════════════════════════

async fn sleep_ms(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

/// Poll until the frame has relayed a failure; returns `current`.
async fn relayed_error(playground: &Playground) -> JsValue {
    for _ in 0..150 {
        let panel = playground.error_panel();
        if field(&panel, "visible").as_bool() == Some(true) {
            return field(&panel, "current");
        }
        sleep_ms(20).await;
    }
    panic!("frame never relayed a failure");
}

fn older_len(playground: &Playground) -> u32 {
    field(&playground.error_panel(), "older")
        .dyn_into::<js_sys::Array>()
        .unwrap()
        .length()
}

fn text(value: &JsValue, key: &str) -> Option<String> {
    field(value, key).as_string()
}

fn with_script(script: &str) -> Playground {
    let mut playground = Playground::new(mount_point(), None).unwrap();
    assert!(playground.set_active_tab("javascript"));
    playground.edit_active(script.to_owned());
    playground
}

#[wasm_bindgen_test]
async fn synchronous_throw_is_relayed_by_the_trap() {
    let mut playground = with_script("throw new RangeError('out of range');");
    playground.run().unwrap();

    let current = relayed_error(&playground).await;
    assert_eq!(text(&current, "path").as_deref(), Some("trap"));
    assert_eq!(text(&current, "kind").as_deref(), Some("RangeError"));
    assert_eq!(text(&current, "message").as_deref(), Some("out of range"));
    playground.destroy();
}

#[wasm_bindgen_test]
async fn click_handler_failure_arrives_on_the_uncaught_path() {
    let mut playground = Playground::new(mount_point(), None).unwrap();
    playground.edit_active("<button id=\"go\">Go</button>".to_owned());
    playground.set_active_tab("javascript");
    // The frame is cross-origin to the host, so the click is dispatched from
    // inside, after the guarded block has finished.
    playground.edit_active(
        "var go = document.getElementById('go');\n\
         go.addEventListener('click', function () { null.x; });\n\
         setTimeout(function () { go.click(); }, 0);"
            .to_owned(),
    );
    playground.run().unwrap();

    let current = relayed_error(&playground).await;
    assert_eq!(text(&current, "kind").as_deref(), Some("TypeError"));
    assert_eq!(text(&current, "path").as_deref(), Some("uncaught"));
    sleep_ms(100).await;
    assert_eq!(older_len(&playground), 0);
    playground.destroy();
}

#[wasm_bindgen_test]
async fn syntax_error_reaches_only_the_uncaught_path() {
    let mut playground = with_script("function (");
    playground.run().unwrap();

    let current = relayed_error(&playground).await;
    assert_eq!(text(&current, "path").as_deref(), Some("uncaught"));
    assert_eq!(text(&current, "kind").as_deref(), Some("SyntaxError"));
    sleep_ms(100).await;
    assert_eq!(older_len(&playground), 0);
    playground.destroy();
}

#[wasm_bindgen_test]
async fn empty_frame_messages_are_ignored() {
    let mut playground = with_script(
        "window.parent.postMessage(undefined, '*');\n\
         window.parent.postMessage(null, '*');\n\
         window.parent.postMessage(function () {}.toString(), '*');\n\
         setTimeout(function () { throw new Error('after'); }, 50);",
    );
    playground.run().unwrap();

    let current = relayed_error(&playground).await;
    assert_eq!(text(&current, "path").as_deref(), Some("uncaught"));
    assert_eq!(text(&current, "kind").as_deref(), Some("Error"));
    assert_eq!(older_len(&playground), 0);
    playground.destroy();
}

#[wasm_bindgen_test]
async fn json_incompatible_failure_still_lands_in_history() {
    let mut playground = with_script("throw { name: 'RangeError', message: 10n };");
    playground.run().unwrap();

    let current = relayed_error(&playground).await;
    assert_eq!(text(&current, "path").as_deref(), Some("trap"));
    assert_eq!(text(&current, "kind").as_deref(), Some("RangeError"));
    assert!(!text(&current, "message").unwrap_or_default().is_empty());
    playground.destroy();
}

#[wasm_bindgen_test]
async fn on_change_runs_after_clear_error_returns() {
    let mut playground = with_script("throw new Error('boom');");
    playground.run().unwrap();
    relayed_error(&playground).await;

    let panels = Rc::new(RefCell::new(Vec::<JsValue>::new()));
    let seen = Rc::clone(&panels);
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |panel: JsValue| {
        seen.borrow_mut().push(panel);
    });
    playground.on_change(Some(callback.as_ref().unchecked_ref::<Function>().clone()));

    playground.clear_error();
    assert!(panels.borrow().is_empty());

    sleep_ms(0).await;
    let panels = panels.borrow();
    assert_eq!(panels.len(), 1);
    assert_eq!(field(&panels[0], "visible").as_bool(), Some(false));
    drop(callback);
}
