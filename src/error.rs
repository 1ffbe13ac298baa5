//! Error types for dominant color extraction

use thiserror::Error;

use crate::tree::ClassId;

/// Result type alias for quantization operations
pub type Result<T> = std::result::Result<T, QuantizeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantizeError {
    /// Requested number of colors cannot be represented by an 8-bit label image
    #[error("The color count needs to be between 1-255. You picked: {count}")]
    InvalidColorCount { count: usize },

    /// Image has no pixels to build statistics from
    #[error("Image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Splitting the class would leave one side without pixels
    #[error("Class {classid} with {pixels} pixels cannot be split along its principal axis")]
    DegenerateSplit { classid: ClassId, pixels: usize },
}
