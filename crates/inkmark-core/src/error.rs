//! Error types shared by the annotation core.

use crate::items::ItemId;
use crate::tools::ToolKind;
use kurbo::Rect;
use thiserror::Error;

/// Errors raised by geometry, command and canvas operations.
///
/// Every variant is raised before any state is mutated, so a failed
/// operation leaves the scene exactly as it was.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error(
        "Cut-out rectangle {rect:?} spans neither the full width nor the full height \
         of a {width}x{height} image"
    )]
    CutOutNotSpanning { rect: Rect, width: u32, height: u32 },
    #[error("Cut-out rectangle has no area inside the image")]
    DegenerateCutOut,
    #[error("Cut-out rectangle covers the whole image")]
    CutOutRemovesImage,
    #[error("No background image loaded")]
    NoImage,
    #[error("Tool {0:?} does not draw items")]
    NotADrawingTool(ToolKind),
    #[error("Sticker tool has no image selected")]
    NoSticker,
    #[error("Command '{0}' is already applied")]
    CommandAlreadyApplied(&'static str),
    #[error("Command '{0}' is not applied")]
    CommandNotApplied(&'static str),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Item already in scene: {0}")]
    DuplicateItem(ItemId),
    #[error("Could not allocate {bytes} bytes for image composition")]
    ImageAllocation { bytes: usize },
    #[error("Sticker index {index} out of range ({count} stickers)")]
    StickerOutOfRange { index: usize, count: usize },
    #[error("Tab index {index} out of range ({count} tabs)")]
    TabOutOfRange { index: usize, count: usize },
    #[error("Composite failed: {0}")]
    Composite(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for annotation operations.
pub type AnnotateResult<T> = Result<T, AnnotateError>;
