use thiserror::Error;

use crate::ingest::ParseError;
use crate::network::ClientError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] ClientError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Corrupt archive: {0}")]
    CorruptArchive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column not found in table: {0}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
