//! Content-hash versions for snapshots.

use crate::domain::GameSnapshot;
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Hash the canonical JSON form of `snapshot`.
///
/// Field order follows the struct definition and maps are ordered, so equal
/// snapshots always produce equal versions.
pub fn compute_version(snapshot: &GameSnapshot) -> Result<String, DomainError> {
    let bytes = serde_json::to_vec(snapshot).map_err(|e| {
        DomainError::infra(
            InfraErrorKind::Serialization,
            format!("Failed to serialize snapshot {}: {e}", snapshot.session_id),
        )
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
