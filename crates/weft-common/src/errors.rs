use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures raised by the synchronization core and its transports.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("affinity violation: {0} must run on the affinity thread")]
    AffinityViolation(String),

    #[error("scheduler is closed")]
    SchedulerClosed,

    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error("refusing to send an empty payload")]
    EmptyPayload,

    #[error("no such subscription for event '{event}'")]
    NoSuchSubscription { event: String },

    #[error("malformed call arguments: {0}")]
    MalformedArgs(String),

    #[error("unknown control message type '{0}'")]
    UnknownMessageType(String),

    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    #[error("remote call failed: {0}")]
    RemoteCallFailed(String),

    #[error("call {task_id} timed out")]
    CallTimedOut { task_id: u64 },

    #[error("call {task_id} was abandoned before completion")]
    CallAbandoned { task_id: u64 },

    #[error("remote surface has not completed the handshake")]
    RemoteNotReady,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("window error: {0}")]
    Window(String),

    #[error("{0}")]
    Other(String),
}
