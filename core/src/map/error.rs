//! Error types for map rendering operations

use thiserror::Error;

use super::renderer::Projection;

/// Errors reported by a [`super::MapRenderer`]
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("layer {id} does not exist")]
    UnknownLayer { id: String },

    #[error("layer {id} already exists")]
    DuplicateLayer { id: String },

    #[error("source {id} does not exist")]
    UnknownSource { id: String },

    #[error("projection {projection} is not supported by this renderer")]
    UnsupportedProjection { projection: Projection },
}
