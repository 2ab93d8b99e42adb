use std::env;
use std::path::PathBuf;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PLACEHOLDER: &str = "No description available.";

/// Storage and front-end configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub port: u16,
    pub front_dir: PathBuf,
    pub files_dir: PathBuf,
    /// Extension of sidecar description files, without the dot
    pub description_ext: String,
    pub placeholder: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            front_dir: PathBuf::from("front"),
            files_dir: PathBuf::from("files"),
            description_ext: "md".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl StorageConfig {
    /// Defaults, with optional `ICODER_*` overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = env::var("ICODER_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!(
                    "Ignoring invalid ICODER_PORT {:?}, using {}",
                    port, DEFAULT_PORT
                ),
            }
        }
        if let Ok(dir) = env::var("ICODER_FRONT_DIR") {
            config.front_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("ICODER_FILES_DIR") {
            config.files_dir = PathBuf::from(dir);
        }

        config
    }

    /// Sidecar file name for an artifact base name
    pub fn sidecar_name(&self, base_name: &str) -> String {
        format!("{}.{}", base_name, self.description_ext)
    }

    pub fn is_sidecar(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(self.description_ext.as_str())
            .is_some_and(|rest| rest.ends_with('.'))
    }
}
