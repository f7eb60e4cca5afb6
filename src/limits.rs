//! Decoder resource limits.

/// Maximum frame payload accepted by default (64 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Maximum object/array nesting accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Bounds applied while decoding untrusted input.
///
/// Declared element counts are additionally checked against the bytes
/// actually remaining, so a hostile count cannot force a large
/// allocation on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest payload, compressed or inflated, that a frame may carry.
    pub max_frame_size: usize,
    /// Deepest nesting of objects and arrays.
    pub max_depth: usize,
}

impl Limits {
    /// Creates limits with the default frame size and depth.
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum frame payload size.
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}
