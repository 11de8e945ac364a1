use thiserror::Error;

use crate::routing::RaptorError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Feed error: {0}")]
    Feed(String),
    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Search error: {0}")]
    Search(#[from] RaptorError),
    #[error("Engine error: {0}")]
    Engine(String),
}
