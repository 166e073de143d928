//! Error types shared across the crate

use thiserror::Error;

use crate::dice::DieType;

#[derive(Debug, Error)]
pub enum DiceError {
    /// Roll request the tray refuses to spawn
    #[error("invalid roll request: {reason}")]
    InvalidRequest { reason: String },

    #[error("collision hull for {kind} is degenerate")]
    DegenerateHull { kind: DieType },

    #[error("unknown die type: {0}")]
    UnknownDieType(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl DiceError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiceError>;
