use std::sync::{Arc, Weak};
use std::thread;

use tracing::{debug, info, warn};
use weft_bridge::hot_reload::{ControlMessage, PipeChannel, PipeRole};
use weft_bridge::{Channel, HostEvent, HostedWindow, WindowCommand, WindowHost};
use weft_common::WeftError;
use weft_config::WeftConfig;

use crate::page::waiting_page;
use crate::window_host::{initial_position, run_window, CommandQueue};

/// Window-only mode: relays frames between the webview and a client process.
pub fn host(config: &WeftConfig) -> Result<(), WeftError> {
    let pipe = Arc::new(PipeChannel::from_config(&config.hot_reload, PipeRole::Host));
    let queue = Arc::new(CommandQueue::new());
    let window = HostedWindow::new(queue.clone(), initial_position(&config.window));

    // pipe -> webview
    let to_window: Weak<CommandQueue> = Arc::downgrade(&queue);
    pipe.subscribe(Arc::new(move |frame: String| {
        let Some(queue) = to_window.upgrade() else {
            return;
        };
        if let Err(e) = queue.execute(WindowCommand::PostMessage(frame)) {
            debug!(error = %e, "frame for closed window dropped");
        }
    }));

    // webview -> pipe
    let to_client = Arc::clone(&pipe);
    queue.subscribe(Arc::new(move |event: &HostEvent| {
        if let HostEvent::WebMessage(frame) = event {
            relay_to_client(&to_client, frame.clone());
        }
    }));

    pipe.on_control(move |message| {
        let outcome = match message {
            ControlMessage::Reload => {
                info!("Reload requested by client");
                window.reload()
            }
            ControlMessage::NavigateToContent { content } => {
                info!(body_len = content.len(), "Page received from client");
                window.navigate_to_string(content.clone())
            }
            ControlMessage::ForwardedFrame { .. } => Ok(()),
        };
        if let Err(e) = outcome {
            warn!(error = %e, "control message not applied");
        }
    });

    pipe.start_listener()?;
    info!(
        pipe = pipe.pipe_in(),
        dir = %pipe.dir().display(),
        "Waiting for a client"
    );
    run_window(&config.window, waiting_page(), queue)
}

/// Send one page frame to the client on its own thread, so a slow or absent
/// client never blocks the window.
fn relay_to_client(pipe: &Arc<PipeChannel>, frame: String) {
    let pipe = Arc::clone(pipe);
    let spawned = thread::Builder::new()
        .name("pipe-relay".into())
        .spawn(move || {
            if let Err(e) = pipe.send(&frame) {
                warn!(pipe = pipe.pipe_out(), error = %e, "frame not relayed");
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "failed to spawn relay thread");
    }
}
