use crate::{concurrent_merkle_tree_account_size, errors::TreeSizeError};

/// Largest canopy that keeps a tree account within a size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanopyFit {
    pub canopy_depth: u32,
    pub size: usize,
}

/// Finds the deepest canopy in `[0, max_depth - 1]` for which the account
/// size does not exceed `max_account_size`.
///
/// The account size grows monotonically with the canopy depth, so the scan
/// walks down from `max_depth - 1` and stops at the first depth that fits.
/// Candidates whose size does not fit in `usize` are skipped like any other
/// oversized canopy. Returns `None` when even a tree without canopy is too
/// large, or when `max_depth` is 0, and an error only when the tree without
/// canopy overflows.
pub fn max_canopy_depth(
    max_depth: u32,
    max_buffer_size: u32,
    max_account_size: usize,
) -> Result<Option<CanopyFit>, TreeSizeError> {
    for canopy_depth in (0..max_depth).rev() {
        match concurrent_merkle_tree_account_size(max_depth, max_buffer_size, canopy_depth) {
            Ok(size) if size <= max_account_size => {
                return Ok(Some(CanopyFit { canopy_depth, size }));
            }
            Ok(_) => {}
            Err(TreeSizeError::Overflow { .. }) if canopy_depth > 0 => {}
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}
