use thiserror::Error;

/// Failures a caller can act on.
///
/// Drawing itself never fails: off-screen writes are clipped and degenerate
/// shapes draw nothing. These errors cover the edges where the caller hands
/// us something we cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GfxError {
    #[error("screen mode {0} has no graphics backend")]
    UnsupportedMode(u8),

    #[error("block buffer holds {actual} bytes but its header describes {needed}")]
    TruncatedBlock { needed: usize, actual: usize },

    #[error("capture needs {needed} bytes but the destination holds {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("VDP command still executing after {polls} status polls")]
    CommandTimeout { polls: u32 },
}
