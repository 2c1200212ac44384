use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeSizeError {
    #[error("Account size overflow: max_depth {max_depth}, max_buffer_size {max_buffer_size}, canopy_depth {canopy_depth}")]
    Overflow {
        max_depth: u32,
        max_buffer_size: u32,
        canopy_depth: u32,
    },
}
