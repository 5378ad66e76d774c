pub mod run;

use std::path::PathBuf;

use clap::Parser;
use firds_core::DEFAULT_INDEX_URL;

#[derive(Parser, Debug)]
#[command(
    name = "firds",
    about = "Fetch a FIRDS instrument file from the ESMA registry and report it as CSV",
    version
)]
pub struct Cli {
    /// Registry query returning the index of published files
    #[arg(default_value = DEFAULT_INDEX_URL)]
    pub url: String,

    /// Directory archive members are unpacked into [env: FIRDS_DOWNLOAD_DIR]
    #[arg(long = "download-dir")]
    pub download_dir: Option<PathBuf>,

    /// Directory the CSV report is written to [env: FIRDS_OUTPUT_DIR]
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Directory for firds.log
    #[arg(long = "log-dir", default_value = "log")]
    pub log_dir: PathBuf,

    /// Index `file_type` to select [env: FIRDS_FILE_TYPE]
    #[arg(long = "file-type")]
    pub file_type: Option<String>,

    /// Which qualifying link to download, counting from 1
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..))]
    pub position: u16,

    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub timeout: Option<u32>,
}
