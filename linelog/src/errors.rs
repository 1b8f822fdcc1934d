//! Error types for configuring emitters

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid time format {0:?}")]
    InvalidTimeFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
