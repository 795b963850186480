//! # Image Vector
//!
//! Resolves the fixed set of logical add-on images to concrete references.
//! The table is baked in at compile time, so value computation stays
//! deterministic per build.

const IMAGE_REPOSITORY: &str = "ghcr.io/network-addon";
const IMAGE_TAG: &str = "v0.8.2";

/// CNI plugin installer image
pub fn cni_image() -> String {
    image("cni")
}

/// Per-node dataplane daemon image
pub fn node_image() -> String {
    image("node")
}

/// Datastore fan-out agent image
pub fn agent_image() -> String {
    image("agent")
}

/// Cluster controllers image
pub fn controllers_image() -> String {
    image("controllers")
}

fn image(name: &str) -> String {
    format!("{IMAGE_REPOSITORY}/{name}:{IMAGE_TAG}")
}
