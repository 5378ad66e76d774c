mod client;
mod config;
#[cfg(test)]
pub(crate) mod mock;

pub use client::{ClientError, ClientResult, Fetcher, HttpClient};
pub use config::{NetworkConfig, NetworkConfigError};
