use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use weft_bridge::{Bridge, DirectChannel, HostedWindow};
use weft_common::WeftError;
use weft_config::WeftConfig;

use super::{application, install_demo_renderer};
use crate::page::{load_page, DEMO_RENDERER_ID};
use crate::window_host::{initial_position, run_window, CommandQueue};

/// Single-process mode: the bridge talks to the webview directly.
pub fn run(config: &WeftConfig, page: Option<&Path>) -> Result<(), WeftError> {
    let html = load_page(page, &config.interop.handshake_event)?;

    let queue = Arc::new(CommandQueue::new());
    let window = HostedWindow::new(queue.clone(), initial_position(&config.window));
    let channel = Arc::new(DirectChannel::new(queue.clone()));
    let bridge = Arc::new(Bridge::new(channel, &config.interop, Some(application()))?);

    install_demo_renderer(&bridge)?;
    bridge.attach_window(&window, DEMO_RENDERER_ID);
    window.on_moved(|pos| debug!(x = pos.x, y = pos.y, "window moved"));
    window.on_size_changed(|pos| {
        debug!(
            width = pos.width,
            height = pos.height,
            maximized = pos.is_maximized,
            "window resized"
        )
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("weft-runtime")
        .enable_all()
        .build()?;
    let waiter = Arc::clone(&bridge);
    runtime.spawn(async move {
        match waiter.perform_handshake().await {
            Ok(()) => info!("Page initialized"),
            Err(e) => warn!(error = %e, "handshake did not complete"),
        }
    });

    let result = run_window(&config.window, html, queue);

    bridge.shutdown();
    runtime.shutdown_timeout(Duration::from_secs(2));
    result
}
