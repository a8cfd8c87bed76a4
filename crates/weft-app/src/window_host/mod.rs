//! winit + wry implementation of the bridge's window capability.
//!
//! The bridge queues [`WindowCommand`]s on a [`CommandQueue`] from any
//! thread. The event loop drains the queue every poll tick and executes the
//! commands against the real window and webview, and it turns window events
//! and webview IPC messages into [`HostEvent`]s.

mod queue;

pub use queue::CommandQueue;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};
use wry::{WebView, WebViewBuilder};

use weft_bridge::page::{js_receive_frame, IPC_INIT_SCRIPT};
use weft_bridge::{HostEvent, WindowCommand};
use weft_common::{WeftError, WindowPosition};
use weft_config::schema::WindowConfig;

/// How often queued commands are executed (approx 120 Hz).
const POLL_INTERVAL: Duration = Duration::from_millis(8);

/// Geometry the window starts with, before the first host event.
pub fn initial_position(config: &WindowConfig) -> WindowPosition {
    WindowPosition::new(
        config.x,
        config.y,
        config.width,
        config.height,
        config.maximized,
    )
}

/// Open the window with `html` and run the event loop until it closes.
pub fn run_window(
    config: &WindowConfig,
    html: String,
    queue: Arc<CommandQueue>,
) -> Result<(), WeftError> {
    let event_loop = EventLoop::new().map_err(|e| WeftError::Window(e.to_string()))?;
    let mut app = WindowApp::new(config.clone(), html, queue);

    info!("Entering event loop");
    event_loop
        .run_app(&mut app)
        .map_err(|e| WeftError::Window(e.to_string()))?;
    app.failure.map_or(Ok(()), Err)
}

// =============================================================================
// APPLICATION HANDLER
// =============================================================================

struct WindowApp {
    config: WindowConfig,
    /// Document currently shown; `Reload` shows it again.
    html: String,
    queue: Arc<CommandQueue>,
    window: Option<Arc<Window>>,
    webview: Option<WebView>,
    failure: Option<WeftError>,
    should_exit: bool,
}

impl WindowApp {
    fn new(config: WindowConfig, html: String, queue: Arc<CommandQueue>) -> Self {
        Self {
            config,
            html,
            queue,
            window: None,
            webview: None,
            failure: None,
            should_exit: false,
        }
    }

    fn initialize_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), WeftError> {
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(self.config.width),
                f64::from(self.config.height),
            ))
            .with_position(PhysicalPosition::new(self.config.x, self.config.y))
            .with_maximized(self.config.maximized);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| WeftError::Window(format!("failed to create window: {e}")))?;
        let window = Arc::new(window);

        let ipc_queue = Arc::clone(&self.queue);
        let webview = WebViewBuilder::new()
            .with_initialization_script(IPC_INIT_SCRIPT)
            .with_devtools(self.config.devtools)
            .with_html(self.html.clone())
            .with_ipc_handler(move |request| {
                let body = request.body().to_string();
                debug!(body_len = body.len(), "IPC message from page");
                ipc_queue.raise(HostEvent::WebMessage(body));
            })
            .build(window.as_ref())
            .map_err(|e| WeftError::Window(format!("failed to create webview: {e}")))?;

        self.window = Some(window);
        self.webview = Some(webview);
        info!(title = %self.config.title, "Window and webview created");
        Ok(())
    }

    fn execute(&mut self, command: WindowCommand, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(webview)) = (&self.window, &self.webview) else {
            return;
        };
        let outcome = match command {
            WindowCommand::PostMessage(frame) => webview.evaluate_script(&js_receive_frame(&frame)),
            WindowCommand::NavigateToString(html) => {
                self.html = html;
                webview.load_html(&self.html)
            }
            WindowCommand::Reload => webview.load_html(&self.html),
            WindowCommand::Minimize => {
                window.set_minimized(true);
                Ok(())
            }
            WindowCommand::Maximize => {
                window.set_maximized(true);
                Ok(())
            }
            WindowCommand::Restore => {
                window.set_minimized(false);
                window.set_maximized(false);
                Ok(())
            }
            WindowCommand::Move { x, y } => {
                window.set_outer_position(PhysicalPosition::new(x, y));
                Ok(())
            }
            WindowCommand::Close => {
                self.close(event_loop);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            warn!(error = %e, "webview command failed");
        }
    }

    /// Tear down the webview and window, then stop the loop. Idempotent.
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            return;
        }
        self.queue.raise(HostEvent::Closing);
        self.webview = None;
        self.window = None;
        self.queue.close();
        self.queue.raise(HostEvent::Closed);
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize_window(event_loop) {
            error!("{e}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                self.close(event_loop);
            }
            WindowEvent::Moved(position) => {
                self.queue.raise(HostEvent::Moved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::Resized(size) => {
                let is_maximized = self.window.as_ref().is_some_and(|w| w.is_maximized());
                self.queue.raise(HostEvent::Resized {
                    width: size.width,
                    height: size.height,
                    is_maximized,
                });
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }
        for command in self.queue.drain() {
            self.execute(command, event_loop);
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));
    }
}
