use serde::{Deserialize, Serialize};

/// HTTP settings for index and archive downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Connection timeout in seconds
    pub connect_timeout_seconds: u32,
    /// Request timeout in seconds, covering the whole body download
    pub request_timeout_seconds: u32,
    /// Refuse plain http URLs
    pub https_only: bool,
    /// User agent to use (crate name and version by default)
    pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 30,
            request_timeout_seconds: 300,
            https_only: false,
            user_agent: None,
        }
    }
}

impl NetworkConfig {
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("firds/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn allows_scheme(&self, scheme: &str) -> bool {
        match scheme {
            "https" => true,
            "http" => !self.https_only,
            _ => false,
        }
    }

    pub fn validate(&self) -> Result<(), NetworkConfigError> {
        if self.connect_timeout_seconds == 0 {
            return Err(NetworkConfigError::ZeroTimeout("connect"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(NetworkConfigError::ZeroTimeout("request"));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkConfigError {
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),
}
