//! Preview routing: type resolution, format renderers and the engine tying them together.

pub mod engine;
pub mod render;
pub mod resolver;

pub use engine::{decode_document, PreviewEngine};
pub use render::{render, render_with, RenderInput, RenderOptions};
pub use resolver::resolve_preview_kind;
