use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;

use super::archive::ArchiveExtractor;
use super::derive::ColumnDeriver;
use super::index::LinkSelector;
use super::records::RecordExtractor;
use crate::config::PipelineConfig;
use crate::error::Error as CoreError;
use crate::network::{ClientError, ClientResult, Fetcher, HttpClient};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to prepare directory {path}: {source}")]
    Setup {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to fetch index document: {0}")]
    FetchIndex(#[source] ClientError),
    #[error("No valid download link found")]
    NoDownloadLink,
    #[error("No XML file was extracted from {0}")]
    NoMember(String),
    #[error("Failed to convert {file} to a table: {source}")]
    Convert { file: String, source: CoreError },
    #[error("Failed to add derived columns to {path}: {source}")]
    Augment { path: PathBuf, source: CoreError },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub download_link: String,
    pub member: String,
    pub table: PathBuf,
    pub records: usize,
    pub namespaces: BTreeMap<String, String>,
    pub duration_ms: u64,
}

/// Index lookup, archive download, record extraction and column derivation,
/// run in sequence and stopped at the first stage without a result.
pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Box<dyn Fetcher>,
    selector: LinkSelector,
    archive: ArchiveExtractor,
    records: RecordExtractor,
    deriver: ColumnDeriver,
}

impl Pipeline {
    /// Pipeline over HTTP using the configured network settings
    pub fn new(config: PipelineConfig) -> ClientResult<Self> {
        let client = HttpClient::new(config.network.clone())?;
        Ok(Self::with_fetcher(config, Box::new(client)))
    }

    pub fn with_fetcher(config: PipelineConfig, fetcher: Box<dyn Fetcher>) -> Self {
        let selector = LinkSelector::new(config.file_type.clone(), config.link_position);
        let archive = ArchiveExtractor::new(&config.download_dir, config.member_suffix.clone());
        let records = RecordExtractor::new(&config.download_dir, &config.output_dir);
        Self {
            config,
            fetcher,
            selector,
            archive,
            records,
            deriver: ColumnDeriver::default(),
        }
    }

    #[must_use]
    pub fn with_deriver(mut self, deriver: ColumnDeriver) -> Self {
        self.deriver = deriver;
        self
    }

    #[must_use]
    pub fn with_record_element(mut self, element: impl Into<String>) -> Self {
        self.records = self.records.with_record_element(element);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Create the download and output directories
    pub fn prepare(&self) -> PipelineResult<()> {
        for dir in [&self.config.download_dir, &self.config.output_dir] {
            fs::create_dir_all(dir).map_err(|source| PipelineError::Setup {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    #[tracing::instrument(name = "pipeline", skip(self))]
    pub async fn run(&self, url: &str) -> PipelineResult<PipelineOutput> {
        let start = Instant::now();
        self.prepare()?;

        tracing::info!("Fetching index document from: {}", url);
        let index = self
            .fetcher
            .fetch(url)
            .await
            .map_err(PipelineError::FetchIndex)?;

        let download_link = self
            .selector
            .select(&index)
            .ok_or(PipelineError::NoDownloadLink)?;

        let member = self
            .archive
            .fetch_and_extract(self.fetcher.as_ref(), &download_link)
            .await
            .ok_or_else(|| PipelineError::NoMember(download_link.clone()))?;
        tracing::info!("Extracted XML file: {}", member);

        let table = self
            .records
            .extract_to_table(&member)
            .map_err(|source| PipelineError::Convert {
                file: member.clone(),
                source,
            })?;

        if let Err(source) = self.deriver.augment(&table.path) {
            if let Err(e) = fs::remove_file(&table.path) {
                tracing::warn!("Could not remove incomplete table {}: {}", table.path.display(), e);
            }
            return Err(PipelineError::Augment {
                path: table.path,
                source,
            });
        }

        Ok(PipelineOutput {
            download_link,
            member,
            table: table.path,
            records: table.records,
            namespaces: table.namespaces,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}
