use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::Result;
use crate::network::Fetcher;

/// Result of unpacking one archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArchive {
    /// Names of every file member written, in container order
    pub members: Vec<String>,
    /// First member whose name carries the configured suffix
    pub matched: Option<String>,
}

/// Downloads a ZIP container and unpacks it into a directory
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    destination: PathBuf,
    suffix: String,
}

impl ArchiveExtractor {
    pub fn new(destination: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            suffix: suffix.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Unpack every member of `bytes` and report the first one of interest.
    ///
    /// Members are staged in a temporary directory and only moved into the
    /// destination once the whole container has been read, so a failure
    /// leaves no extracted files behind.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<ExtractedArchive> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        fs::create_dir_all(&self.destination)?;
        let staging = tempfile::Builder::new()
            .prefix(".extract-")
            .tempdir_in(&self.destination)?;

        let mut members = Vec::new();
        let mut written = Vec::new();
        let mut directories = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!("Skipping archive member outside extraction directory: {}", name);
                continue;
            };
            if entry.is_dir() {
                directories.push(relative);
                continue;
            }

            let staged = staging.path().join(&relative);

            if let Some(parent) = staged.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&staged)?;
            io::copy(&mut entry, &mut outfile)?;
            tracing::debug!("Extracted {}", name);
            written.push(relative);
            members.push(name);
        }

        for relative in &directories {
            fs::create_dir_all(self.destination.join(relative))?;
        }
        for relative in &written {
            let output_path = self.destination.join(relative);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(staging.path().join(relative), &output_path)?;
        }

        tracing::info!(
            "Extracted {} member(s) to {}: {:?}",
            members.len(),
            self.destination.display(),
            members
        );

        let matched = members
            .iter()
            .find(|name| name.ends_with(&self.suffix))
            .cloned();

        Ok(ExtractedArchive { members, matched })
    }

    #[tracing::instrument(name = "archive", skip(self, fetcher))]
    pub async fn try_fetch_and_extract(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
    ) -> Result<ExtractedArchive> {
        tracing::info!("Downloading archive from: {}", url);
        let bytes = fetcher.fetch(url).await?;
        self.extract_bytes(&bytes)
    }

    /// Name of the first extracted member of interest. Transport failures and
    /// corrupt containers are logged and reported as no result.
    pub async fn fetch_and_extract(&self, fetcher: &dyn Fetcher, url: &str) -> Option<String> {
        match self.try_fetch_and_extract(fetcher, url).await {
            Ok(extracted) => {
                if extracted.matched.is_none() {
                    tracing::warn!("No member ending in '{}' found in archive", self.suffix);
                }
                extracted.matched
            }
            Err(e) => {
                tracing::error!("Failed to download or extract archive: {}", e);
                None
            }
        }
    }
}
