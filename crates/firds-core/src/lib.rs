#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod network;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{PipelineConfig, DEFAULT_INDEX_URL};
pub use error::{Error, Result};
pub use ingest::{
    ArchiveExtractor, ColumnDeriver, IndexEntry, InstrumentField, InstrumentRecord, LinkSelector,
    ParseError, Pipeline, PipelineError, PipelineOutput, RecordExtractor, RecordTable,
};
pub use network::{ClientError, Fetcher, HttpClient, NetworkConfig};
