use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoFeedError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Malformed geometry: {0}")]
    Geometry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
