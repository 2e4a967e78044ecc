//! Upstream addressing for an artifact of a resolved build.

use crate::resolver::ResolvedBuild;

/// Suffix of the checksum sidecar file.
const CHECKSUM_SUFFIX: &str = ".md5";

/// An artifact of one build, addressable as content or checksum sidecar.
///
/// Any query string carried in the artifact name is kept apart from the file
/// path so the sidecar suffix lands on the file name, not on the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    build: ResolvedBuild,
    path: String,
    query: Option<String>,
}

impl ArtifactDescriptor {
    pub fn new(build: &ResolvedBuild, artifact_name: &str) -> Self {
        let (path, query) = match artifact_name.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (artifact_name.to_string(), None),
        };
        Self {
            build: build.clone(),
            path,
            query,
        }
    }

    /// Artifact file path within the build.
    pub fn name(&self) -> &str {
        &self.path
    }

    /// REST path of the artifact content.
    pub fn content_path(&self) -> String {
        self.address(&self.path)
    }

    /// REST path of the `.md5` checksum sidecar.
    pub fn checksum_path(&self) -> String {
        self.address(&format!("{}{}", self.path, CHECKSUM_SUFFIX))
    }

    fn address(&self, file: &str) -> String {
        let mut path = format!("builds/id:{}/artifacts/content/{}", self.build, file);
        if let Some(query) = &self.query {
            path.push('?');
            path.push_str(query);
        }
        path
    }
}
