pub mod artifact;
pub mod config;

pub use artifact::Artifact;
pub use config::StorageConfig;
