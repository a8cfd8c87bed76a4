//! Out-of-band fault notification for work items.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

/// A failure raised while executing a queued action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerFault {
    pub scheduler: String,
    pub message: String,
}

impl SchedulerFault {
    pub(crate) fn new(scheduler: &str, message: impl Into<String>) -> Self {
        Self {
            scheduler: scheduler.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn from_panic(scheduler: &str, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("panicked: {s}")
        } else {
            "panicked".to_string()
        };
        Self::new(scheduler, message)
    }
}

pub type FaultListener = Arc<dyn Fn(&SchedulerFault) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Faults {
    listeners: Mutex<Vec<FaultListener>>,
}

impl Faults {
    pub(crate) fn add(&self, listener: FaultListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub(crate) fn report(&self, fault: SchedulerFault) {
        error!(
            scheduler = %fault.scheduler,
            message = %fault.message,
            "unhandled fault in scheduled action"
        );
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            // A broken listener must not take the worker down with it.
            if panic::catch_unwind(AssertUnwindSafe(|| listener(&fault))).is_err() {
                error!(scheduler = %fault.scheduler, "fault listener panicked");
            }
        }
    }
}
