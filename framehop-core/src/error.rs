use thiserror::Error;

/// All errors produced by framehop-core.
#[derive(Debug, Error)]
pub enum FramehopError {
    #[error("invalid window config: slice_length={slice_length}, hop_size={hop_size} (both must be > 0)")]
    InvalidConfig { slice_length: usize, hop_size: usize },

    #[error("read() called without a connected upstream source")]
    NoSource,

    #[error("window ready but no downstream sink is connected")]
    NoSink,

    #[error("process() after flush(); call reset() before pushing more data")]
    Flushed,

    #[error("upstream source error: {0}")]
    Source(String),

    #[error("downstream channel closed")]
    SinkClosed,

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[cfg(feature = "wav")]
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FramehopError>;
