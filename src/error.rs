use crate::merge::MergeError;
use fieldreport_layout::LayoutError;
use fieldreport_render::RenderError;
use fieldreport_resource::ResourceError;
use fieldreport_traits::PlatformError;
use thiserror::Error;

/// A comprehensive error type for the report print pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Image preparation failed: {0}")]
    Resource(#[from] ResourceError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
