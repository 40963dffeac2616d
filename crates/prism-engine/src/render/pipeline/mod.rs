mod model;
mod text;

pub use model::{ModelPipeline, PipelineConfig};
pub use text::{TextAnchor, TextPipeline};
