use thiserror::Error;

use crate::{config, tracking};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to run tracking service: {0}")]
    Tracking(#[from] tracking::TrackingError),
    #[error("failed to parse config: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, AppError>;
