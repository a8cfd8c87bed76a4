//! Page-side half of the direct channel.
//!
//! Messages flow in both directions:
//! - **page -> native**: `weft.send(name, args)` posts a frame through
//!   `window.ipc.postMessage`, which the webview's IPC handler receives.
//! - **native -> page**: the window host evaluates the script built by
//!   [`js_receive_frame`], which runs the page handlers registered with
//!   `weft.on` / `weft.once`.

use serde_json::Value;

/// Installed into every page before its own scripts run.
pub const IPC_INIT_SCRIPT: &str = r#"
(function() {
    if (window.weft) {
        return;
    }
    var registrations = {};

    function on(eventName, callback) {
        (registrations[eventName] = registrations[eventName] || []).push(callback);
    }

    function off(eventName, callback) {
        var group = registrations[eventName];
        if (!group) {
            return;
        }
        var index = group.indexOf(callback);
        if (index >= 0) {
            group.splice(index, 1);
        }
    }

    function once(eventName, callback) {
        var wrapped = function() {
            off(eventName, wrapped);
            callback.apply(null, arguments);
        };
        on(eventName, wrapped);
    }

    function send(eventName, args) {
        window.ipc.postMessage(JSON.stringify({ EventName: eventName, Args: args || [] }));
    }

    window.weft = {
        on: on,
        off: off,
        once: once,
        send: send,
        // Tell the native side that page listeners are installed.
        ready: function(eventName) {
            send(eventName || "RemoteInitialized", []);
        },
        _receive: function(frame) {
            var group = registrations[frame.EventName];
            if (!group) {
                return;
            }
            var args = frame.Args || [];
            group.slice().forEach(function(callback) {
                callback.apply(null, args);
            });
        }
    };
})();
"#;

/// Script that hands one frame to the page's handlers.
///
/// The frame travels as a JS string literal and is parsed page-side, so
/// arbitrary text cannot escape into the surrounding script.
pub fn js_receive_frame(frame_json: &str) -> String {
    let literal = Value::String(frame_json.to_string()).to_string();
    format!("window.weft._receive(JSON.parse({literal}));")
}

/// A script included by the initial page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageScript {
    Src(String),
    Inline(String),
}

/// Bootstrap document hosting the root component element.
pub fn initial_html(root_element: &str, scripts: &[PageScript]) -> String {
    let mut script_tags = String::new();
    for script in scripts {
        match script {
            PageScript::Src(src) => {
                script_tags.push_str(&format!(
                    "    <script src=\"{}\"></script>\n",
                    escape_attr(src)
                ));
            }
            PageScript::Inline(body) => {
                script_tags.push_str(&format!("    <script>\n{body}\n    </script>\n"));
            }
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width" />
    <base href="/" />
</head>
<body>
    <{root_element}>Loading...</{root_element}>
{script_tags}</body>
</html>
"#
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
