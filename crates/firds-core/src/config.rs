use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::network::NetworkConfig;

/// Registry query the tool runs when no URL is given: FIRDS files published
/// between 17 and 19 January 2021.
pub const DEFAULT_INDEX_URL: &str = "https://registers.esma.europa.eu/solr/esma_registers_firds_files/select?q=*&fq=publication_date:%5B2021-01-17T00:00:00Z+TO+2021-01-19T23:59:59Z%5D&wt=xml&indent=true&start=0&rows=100";

/// Settings for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Where archive members are unpacked
    pub download_dir: PathBuf,
    /// Where the CSV report is written
    pub output_dir: PathBuf,
    /// `file_type` value an index entry must carry
    pub file_type: String,
    /// Zero-based position among qualifying links
    pub link_position: usize,
    /// Suffix of the archive member to convert
    pub member_suffix: String,
    pub network: NetworkConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloaded_files"),
            output_dir: PathBuf::from("output"),
            file_type: "DLTINS".to_string(),
            link_position: 1,
            member_suffix: ".xml".to_string(),
            network: NetworkConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("FIRDS_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("FIRDS_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(file_type) = std::env::var("FIRDS_FILE_TYPE") {
            config.file_type = file_type;
        }
        config
    }

    /// Both working directories under `root`
    #[must_use]
    pub fn rooted_at(mut self, root: &std::path::Path) -> Self {
        self.download_dir = root.join(&self.download_dir);
        self.output_dir = root.join(&self.output_dir);
        self
    }
}
