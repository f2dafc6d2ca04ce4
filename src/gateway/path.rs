//! Path-traversal-safe file resolution.

use std::fs;
use std::path::{Path, PathBuf};

use crate::gateway::validator::is_valid_filename;
use crate::gateway::GatewayError;

/// Resolve `filename` against `base_dir`, rejecting escapes.
///
/// Two-stage check: the cheap lexical gate first, then canonicalization of
/// both the base and the target followed by a prefix containment test. The
/// second stage catches what the first cannot, e.g. a symlink inside the
/// base directory pointing outside it.
///
/// Any filesystem error during canonicalization (missing file, permission
/// denial) folds into [`GatewayError::PathTraversal`]: callers only need to
/// know the path is rejected, and a missing file must not look different
/// from a traversal attempt.
pub fn resolve_path(filename: &str, base_dir: &Path) -> Result<PathBuf, GatewayError> {
    if !is_valid_filename(filename) {
        return Err(GatewayError::PathTraversal(filename.to_string()));
    }

    let base = fs::canonicalize(base_dir)
        .map_err(|_| GatewayError::PathTraversal(filename.to_string()))?;
    let resolved = fs::canonicalize(base.join(filename))
        .map_err(|_| GatewayError::PathTraversal(filename.to_string()))?;

    if !resolved.starts_with(&base) {
        return Err(GatewayError::PathTraversal(filename.to_string()));
    }

    Ok(resolved)
}
