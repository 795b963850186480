//! Prints the controller's CRD manifests to stdout.
//!
//! Usage: `cargo run --bin crdgen > deploy/crds.yaml`

use anyhow::Result;
use kube::core::CustomResourceExt;
use network_addon_controller::crd::{ManagedResource, Network};

fn main() -> Result<()> {
    print!("{}", serde_yaml::to_string(&Network::crd())?);
    println!("---");
    print!("{}", serde_yaml::to_string(&ManagedResource::crd())?);
    Ok(())
}
