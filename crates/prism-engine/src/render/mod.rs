//! Rendering layer.
//!
//! [`Graphics`] owns the whole drawable state: two model pipelines (unlit
//! textured planes and Phong-lit models), the text pipeline, and the shared
//! projection/view matrices. Resources live in per-pipeline registries and
//! are addressed by [`ResourceId`]s handed back from the load calls.
//!
//! The composer submodule describes vertex and uniform layouts as sets of
//! enabled slots, which is what lets one pipeline type serve multiple
//! shader interfaces.

pub mod compose;
mod graphics;
mod pipeline;
mod registry;

pub use graphics::Graphics;
pub use pipeline::{ModelPipeline, PipelineConfig, TextAnchor, TextPipeline};
pub use registry::{ResourceId, ResourceRegistry};
