//! OCI / Docker manifest wire types.

use serde::Deserialize;

pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";
pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Header carrying the canonical digest of a manifest response.
pub const CONTENT_DIGEST_HEADER: &str = "docker-content-digest";

/// Accept header for the index probe.
pub fn index_accept() -> String {
    [OCI_INDEX, DOCKER_MANIFEST_LIST].join(", ")
}

/// Accept header for the digest lookup, covering both index and single-platform manifests.
pub fn any_manifest_accept() -> String {
    [OCI_INDEX, DOCKER_MANIFEST_LIST, OCI_MANIFEST, DOCKER_MANIFEST].join(", ")
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Platform {
    pub architecture: String,
    pub os: String,
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Descriptor {
    #[serde(rename = "mediaType", default)]
    pub media_type: Option<String>,
    pub digest: String,
    #[serde(default)]
    pub platform: Option<Platform>,
}

/// An image index (manifest list). A single-platform manifest parses with
/// an empty `manifests` list.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ImageIndex {
    #[serde(rename = "mediaType", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub manifests: Vec<Descriptor>,
}
