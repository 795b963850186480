//! Error taxonomy of a reconciliation pass.
//!
//! The pipeline performs no internal retries; every error surfaces to the
//! watch layer, which re-invokes the whole pass. All cluster writes have
//! overwrite semantics, so re-running after any of these errors is safe.

use crate::charts::MissingManifestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PassError {
    /// Malformed or incomplete input configuration; never retried internally
    #[error("invalid network resource: {0}")]
    Validation(#[source] anyhow::Error),

    /// The external chart renderer failed; surfaced as-is
    #[error("chart rendering failed: {0}")]
    Render(#[source] anyhow::Error),

    /// The rendered chart omitted an expected manifest; aborts before any
    /// cluster write
    #[error(transparent)]
    MissingManifest(#[from] MissingManifestError),

    /// A secret upsert failed; remaining upserts and the descriptor are
    /// skipped
    #[error("failed to publish secret {name}: {source}")]
    SecretPublication {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The managed-resource upsert failed after all secrets were published
    #[error("failed to publish managed resource {name}: {source}")]
    DescriptorPublication {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The final status write failed after successful publication
    #[error("failed to update network status: {0}")]
    StatusUpdate(#[source] anyhow::Error),
}

impl PassError {
    /// True when all cluster objects were applied and only the status write
    /// is stale. Lets callers distinguish "resources applied, status stale"
    /// from "resources not applied".
    pub fn resources_applied(&self) -> bool {
        matches!(self, PassError::StatusUpdate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_status_errors_leave_resources_applied() {
        let status = PassError::StatusUpdate(anyhow::anyhow!("boom"));
        assert!(status.resources_applied());

        let publication = PassError::SecretPublication {
            name: "network-addon".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        assert!(!publication.resources_applied());

        let missing = PassError::from(MissingManifestError {
            key: crate::charts::RBAC_KEY,
        });
        assert!(!missing.resources_applied());
    }
}
