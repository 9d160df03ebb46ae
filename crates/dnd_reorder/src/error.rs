#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `on_drag` or `on_drag_canceled` was called without a captured item.
    #[error("no drag in progress")]
    NoActiveDrag,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("failed to parse config")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
