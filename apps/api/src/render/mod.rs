// Rendering: drawing commands, text metrics, asset lookup and the PDF backend.
// The worksheet builder only ever emits `RenderCommand`s; `pdf` is the single
// place that touches lopdf.

pub mod assets;
pub mod commands;
pub mod font_metrics;
pub mod pdf;

// Re-export the asset API consumed by startup and shared state.
pub use assets::{AssetLocator, DirAssetLocator};
