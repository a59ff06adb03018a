use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("malformed snapshot update: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("invalid viewer config: {0}")]
    Config(#[source] serde_json::Error),
    #[error("canvas 2d context unavailable: {0}")]
    Canvas(String),
    #[error("missing DOM object: {0}")]
    Dom(&'static str),
    #[error("could not attach {0} listener")]
    Listener(&'static str),
}
