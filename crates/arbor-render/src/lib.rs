#![forbid(unsafe_code)]

//! Headless renderer for animated tree diagrams.
//!
//! [`TreeRenderer`] owns the drawing surface, the layout engine, the retained scene and the
//! ad-hoc link registry. Every structural change re-runs the layout and reconciles the scene
//! (enter/update/exit), starting time-based transitions that are sampled against the scene clock.

pub mod config;
pub mod layout;
pub mod model;
pub mod path;
pub mod renderer;
pub mod scene;
pub mod svg;
pub mod text;
pub mod transition;

pub use config::{Margin, RenderConfig, Surface};
pub use layout::{LaidOutTree, TreeLayout};
pub use renderer::TreeRenderer;
pub use svg::SvgRenderOptions;
pub use transition::Ease;

use arbor_core::LinkKey;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] arbor_core::Error),
    #[error("no ad-hoc link between {key}")]
    LinkNotFound { key: LinkKey },
    #[error("an ad-hoc link already exists between {key}")]
    DuplicateLink { key: LinkKey },
    #[error("invalid render config: {message}")]
    InvalidConfig { message: String },
    #[error("render config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
