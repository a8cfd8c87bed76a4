//! Window facade with tracked geometry.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use weft_common::{BridgeError, WindowPosition};

use super::{HostEvent, WindowCommand, WindowHost};
use crate::listeners::Listeners;

struct State {
    position: RwLock<WindowPosition>,
    moved: Listeners<WindowPosition>,
    size_changed: Listeners<WindowPosition>,
    closing: Listeners<()>,
    closed: Listeners<()>,
}

impl State {
    fn position(&self) -> WindowPosition {
        *self.position.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(WindowPosition) -> WindowPosition) -> WindowPosition {
        let mut guard = self.position.write().unwrap_or_else(PoisonError::into_inner);
        *guard = f(*guard);
        *guard
    }

    fn handle(&self, event: &HostEvent) {
        match event {
            HostEvent::Moved { x, y } => {
                let pos = self.update(|p| p.moved_to(*x, *y));
                self.moved.emit(&pos);
            }
            HostEvent::Resized {
                width,
                height,
                is_maximized,
            } => {
                let pos = self.update(|p| p.resized_to(*width, *height, *is_maximized));
                self.size_changed.emit(&pos);
            }
            HostEvent::Closing => self.closing.emit(&()),
            HostEvent::Closed => {
                debug!("window closed");
                self.closed.emit(&());
            }
            HostEvent::WebMessage(_) => {}
        }
    }
}

/// A native window plus the last geometry it reported.
///
/// Commands are forwarded to the [`WindowHost`], which runs them on the
/// window thread. Geometry events keep [`position`](Self::position) current.
#[derive(Clone)]
pub struct HostedWindow {
    host: Arc<dyn WindowHost>,
    state: Arc<State>,
}

impl HostedWindow {
    pub fn new(host: Arc<dyn WindowHost>, initial: WindowPosition) -> Self {
        let state = Arc::new(State {
            position: RwLock::new(initial),
            moved: Listeners::default(),
            size_changed: Listeners::default(),
            closing: Listeners::default(),
            closed: Listeners::default(),
        });
        let weak = Arc::downgrade(&state);
        host.subscribe(Arc::new(move |event: &HostEvent| {
            if let Some(state) = weak.upgrade() {
                state.handle(event);
            }
        }));
        Self { host, state }
    }

    pub fn host(&self) -> &Arc<dyn WindowHost> {
        &self.host
    }

    pub fn position(&self) -> WindowPosition {
        self.state.position()
    }

    pub fn on_moved(&self, f: impl Fn(&WindowPosition) + Send + Sync + 'static) {
        self.state.moved.add(Arc::new(f));
    }

    pub fn on_size_changed(&self, f: impl Fn(&WindowPosition) + Send + Sync + 'static) {
        self.state.size_changed.add(Arc::new(f));
    }

    pub fn on_closing(&self, f: impl Fn() + Send + Sync + 'static) {
        self.state.closing.add(Arc::new(move |_: &()| f()));
    }

    pub fn on_closed(&self, f: impl Fn() + Send + Sync + 'static) {
        self.state.closed.add(Arc::new(move |_: &()| f()));
    }

    pub fn minimize(&self) -> Result<(), BridgeError> {
        self.host.execute(WindowCommand::Minimize)
    }

    pub fn maximize(&self) -> Result<(), BridgeError> {
        self.host.execute(WindowCommand::Maximize)
    }

    pub fn restore_down(&self) -> Result<(), BridgeError> {
        self.host.execute(WindowCommand::Restore)
    }

    pub fn move_to(&self, x: i32, y: i32) -> Result<(), BridgeError> {
        self.host.execute(WindowCommand::Move { x, y })
    }

    /// Move relative to the last reported origin.
    pub fn shift(&self, dx: i32, dy: i32) -> Result<(), BridgeError> {
        let pos = self.position();
        self.move_to(pos.x.saturating_add(dx), pos.y.saturating_add(dy))
    }

    pub fn close(&self) -> Result<(), BridgeError> {
        self.host.execute(WindowCommand::Close)
    }

    pub fn navigate_to_string(&self, html: impl Into<String>) -> Result<(), BridgeError> {
        self.host.execute(WindowCommand::NavigateToString(html.into()))
    }

    pub fn reload(&self) -> Result<(), BridgeError> {
        self.host.execute(WindowCommand::Reload)
    }
}
