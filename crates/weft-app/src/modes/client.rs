use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use weft_bridge::hot_reload::{ControlMessage, PipeChannel, PipeRole};
use weft_bridge::Bridge;
use weft_common::WeftError;
use weft_config::WeftConfig;

use super::{application, install_demo_renderer};
use crate::page::load_page;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Reload,
    Quit,
    Nothing,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "reload" | "r" => Command::Reload,
        "quit" | "exit" | "q" => Command::Quit,
        "" => Command::Nothing,
        other => Command::Unknown(other.to_string()),
    }
}

/// Windowless mode: sends the page to a running host and answers its calls.
pub fn client(config: &WeftConfig, page: Option<&Path>) -> Result<(), WeftError> {
    let html = load_page(page, &config.interop.handshake_event)?;

    let pipe = Arc::new(PipeChannel::from_config(&config.hot_reload, PipeRole::Client));
    pipe.start_listener()?;
    let bridge = Arc::new(
        Bridge::new(pipe.clone(), &config.interop, Some(application()))?
            .with_control_channel(Arc::clone(&pipe)),
    );
    install_demo_renderer(&bridge)?;

    info!(pipe = pipe.pipe_out(), "Sending page to host");
    bridge.send_control_message(&ControlMessage::NavigateToContent { content: html })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(bridge.perform_handshake())?;
    info!("Host page initialized; enter `reload` to reload it or `quit` to exit");

    for line in io::stdin().lock().lines() {
        match parse_command(&line?) {
            Command::Reload => {
                if let Err(e) = bridge.send_control_message(&ControlMessage::Reload) {
                    warn!(error = %e, "reload not sent");
                }
            }
            Command::Quit => break,
            Command::Nothing => {}
            Command::Unknown(other) => warn!(command = %other, "unknown command"),
        }
    }

    bridge.shutdown();
    Ok(())
}
