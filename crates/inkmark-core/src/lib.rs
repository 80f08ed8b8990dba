//! inkmark core library
//!
//! Annotation items, their geometry, undoable commands and the canvas that
//! ties them to a background image. Rendering lives in `inkmark-render`
//! behind the [`Compositor`] trait.

pub mod camera;
pub mod canvas;
pub mod commands;
pub mod compose;
pub mod config;
pub mod error;
pub mod geometry;
pub mod items;
pub mod scene;
pub mod selection;
pub mod tabs;
pub mod tools;
pub mod undo;

pub use camera::Camera;
pub use canvas::{AnnotationCanvas, CanvasEvent};
pub use commands::{Command, CommandState, CutOrientation, CutOutCommand};
pub use compose::Compositor;
pub use config::AnnotatorConfig;
pub use error::{AnnotateError, AnnotateResult};
pub use geometry::{LineGeometry, RectGeometry};
pub use items::{AnnotationItem, ItemId, ItemProperties, ItemTrait, SerializableColor};
pub use scene::Scene;
pub use selection::{Corner, DragState, Edge, Handle, HandleKind};
pub use tabs::{AnnotationTab, AnnotationTabs};
pub use tools::{ToolKind, ToolManager};
pub use undo::UndoStack;
