//! Crate-wide error type.

use crate::core::coin_selection::CoinSelectionError;
use crate::network::NetworkError;
use crate::types::encoding::EncodingError;
use crate::virtual_machine::errors::{NotFoundError, ParamError};
use neotx_derive::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Encoding(#[from] EncodingError),
    #[error("{0}")]
    NotFound(#[from] NotFoundError),
    #[error("{0}")]
    Param(#[from] ParamError),
    #[error("{0}")]
    CoinSelection(#[from] CoinSelectionError),
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
