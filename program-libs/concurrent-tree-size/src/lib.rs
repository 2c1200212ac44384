//! Sizes of SPL account compression concurrent Merkle tree accounts.
//!
//! An account with header version 1 is laid out as:
//!
//! * 1 byte account discriminator and 1 byte header version.
//! * [`CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1`] bytes of header data.
//! * The tree itself: sequence number, active index and buffer size
//!   (`u64` each), `max_buffer_size` changelog entries and the rightmost
//!   path.
//! * The canopy, which caches the upper `canopy_depth` levels of the tree
//!   (excluding the root).

pub mod canopy;
pub mod errors;

pub use canopy::{max_canopy_depth, CanopyFit};
pub use errors::TreeSizeError;

/// Size of a single tree node.
pub const NODE_SIZE: usize = 32;
/// Account discriminator and header version byte.
pub const ACCOUNT_TYPE_AND_VERSION_SIZE: usize = 2;
/// `max_buffer_size: u32`, `max_depth: u32`, `authority: Pubkey`,
/// `creation_slot: u64`, `is_batch_initialized: bool` and 5 bytes of
/// padding.
pub const CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1: usize = 4 + 4 + 32 + 8 + 1 + 5;
/// `sequence_number`, `active_index` and `buffer_size`.
pub const TREE_METADATA_SIZE: usize = 3 * 8;
/// Largest account the runtime allows to be allocated (10 MiB).
pub const MAX_ACCOUNT_SIZE: usize = 10 * 1024 * 1024;

/// Size of one changelog entry: root, path of `max_depth` nodes, `u32` index
/// and `u32` padding.
pub fn changelog_entry_size(max_depth: u32) -> Option<usize> {
    (max_depth as usize)
        .checked_mul(NODE_SIZE)?
        .checked_add(NODE_SIZE + 4 + 4)
}

/// Size of the rightmost path: proof of `max_depth` nodes, leaf, `u32` index
/// and `u32` padding.
pub fn rightmost_path_size(max_depth: u32) -> Option<usize> {
    (max_depth as usize)
        .checked_mul(NODE_SIZE)?
        .checked_add(NODE_SIZE + 4 + 4)
}

/// Size of the tree data without header and canopy.
pub fn tree_size(max_depth: u32, max_buffer_size: u32) -> Option<usize> {
    let changelog = changelog_entry_size(max_depth)?.checked_mul(max_buffer_size as usize)?;
    TREE_METADATA_SIZE
        .checked_add(changelog)?
        .checked_add(rightmost_path_size(max_depth)?)
}

/// Number of nodes stored in a canopy of `canopy_depth` levels.
pub fn canopy_nodes(canopy_depth: u32) -> Option<usize> {
    1usize
        .checked_shl(canopy_depth.checked_add(1)?)?
        .checked_sub(2)
}

/// Size of a canopy of `canopy_depth` levels.
pub fn canopy_size(canopy_depth: u32) -> Option<usize> {
    canopy_nodes(canopy_depth)?.checked_mul(NODE_SIZE)
}

/// Number of bytes an account holding a concurrent Merkle tree with the given
/// parameters has to allocate.
pub fn concurrent_merkle_tree_account_size(
    max_depth: u32,
    max_buffer_size: u32,
    canopy_depth: u32,
) -> Result<usize, TreeSizeError> {
    let overflow = TreeSizeError::Overflow {
        max_depth,
        max_buffer_size,
        canopy_depth,
    };
    let tree_size = tree_size(max_depth, max_buffer_size).ok_or(overflow.clone())?;
    let canopy_size = canopy_size(canopy_depth).ok_or(overflow.clone())?;

    (ACCOUNT_TYPE_AND_VERSION_SIZE + CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1)
        .checked_add(tree_size)
        .and_then(|size| size.checked_add(canopy_size))
        .ok_or(overflow)
}
