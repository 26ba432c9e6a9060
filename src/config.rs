//! Runtime configuration

use std::path::PathBuf;

/// Server and storage configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding one sub-directory per database
    pub data_dir: PathBuf,

    /// TCP port the server listens on
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("databases"),
            port: 8888,
        }
    }
}

impl Config {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}
