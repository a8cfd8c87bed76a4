//! Per-section validators.

use crate::schema::WeftConfig;

use super::helpers::{validate_non_empty, validate_pipe_name, validate_range};

pub(crate) fn validate_window(errors: &mut Vec<String>, config: &WeftConfig) {
    validate_range(errors, "window.width", config.window.width.into(), 200, 16384);
    validate_range(errors, "window.height", config.window.height.into(), 200, 16384);
}

pub(crate) fn validate_hot_reload(errors: &mut Vec<String>, config: &WeftConfig) {
    let hot_reload = &config.hot_reload;
    validate_pipe_name(errors, "hot_reload.host_pipe", &hot_reload.host_pipe);
    validate_pipe_name(errors, "hot_reload.client_pipe", &hot_reload.client_pipe);
    if hot_reload.host_pipe == hot_reload.client_pipe {
        errors.push(format!(
            "hot_reload.host_pipe and hot_reload.client_pipe are both {:?}",
            hot_reload.host_pipe
        ));
    }
    validate_range(
        errors,
        "hot_reload.connect_retry_ms",
        hot_reload.connect_retry_ms,
        1,
        5000,
    );
}

pub(crate) fn validate_interop(errors: &mut Vec<String>, config: &WeftConfig) {
    validate_non_empty(
        errors,
        "interop.handshake_event",
        &config.interop.handshake_event,
    );
}
