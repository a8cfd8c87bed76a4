//! Built-in demo page and page loading.

use std::path::Path;

use serde_json::Value;
use weft_bridge::page::{initial_html, PageScript};
use weft_common::WeftError;

/// Renderer the demo page draws into.
pub const DEMO_RENDERER_ID: u64 = 1;

/// Element hosting the root component.
pub const ROOT_ELEMENT: &str = "app";

const GREETING: &str = "Hello from Weft. Click anywhere to send an event.";

/// Draws each render batch into the root element and reports clicks back as
/// `DispatchEvent` calls. `__HANDSHAKE__` becomes the quoted event name.
const DEMO_SCRIPT: &str = r#"
        var root = document.querySelector("app");
        var clicks = 0;
        weft.on("JS.RenderBatch", function(rendererId, batch) {
            root.textContent = atob(batch);
        });
        document.addEventListener("click", function() {
            clicks += 1;
            var descriptor = { browserRendererId: 1, eventHandlerId: clicks, eventFieldInfo: null };
            var eventArgs = JSON.stringify({ type: "click", detail: clicks });
            weft.send("BeginInvokeDotNetFromJS",
                [null, null, "DispatchEvent", 0, JSON.stringify([descriptor, eventArgs])]);
        });
        weft.ready(__HANDSHAKE__);"#;

/// The built-in page, announcing itself with `handshake_event`.
pub fn demo_page(handshake_event: &str) -> String {
    let event = Value::String(handshake_event.to_string()).to_string();
    let script = DEMO_SCRIPT.replace("__HANDSHAKE__", &event);
    initial_html(ROOT_ELEMENT, &[PageScript::Inline(script)])
}

/// Placeholder shown by a host until a client sends its page.
pub fn waiting_page() -> String {
    initial_html(ROOT_ELEMENT, &[])
}

/// Read `path`, or fall back to the demo page.
pub fn load_page(path: Option<&Path>, handshake_event: &str) -> Result<String, WeftError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            WeftError::Other(format!("failed to read page {}: {e}", path.display()))
        }),
        None => Ok(demo_page(handshake_event)),
    }
}

/// The batch the demo renderer sends after every handshake.
pub fn greeting_batch() -> &'static [u8] {
    GREETING.as_bytes()
}
