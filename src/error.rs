use thiserror::Error;

/// Reasons a layout cannot be started.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("cannot lay out an empty graph")]
    EmptyGraph,
    #[error("viewport {width}x{height} is not available for layout")]
    ViewportUnavailable { width: f32, height: f32 },
}
