use serde::Serialize;

/// One entry of the `/api/files` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub description: String,
    pub downloads: u64,
}

impl Artifact {
    pub fn new(name: impl Into<String>, description: impl Into<String>, downloads: u64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            downloads,
        }
    }
}
