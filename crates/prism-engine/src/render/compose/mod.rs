//! Vertex and uniform layout composition.
//!
//! Both GPU interfaces are described the same way: a fixed, ordered set of
//! known slots, of which each pipeline enables a subset. Locations and byte
//! offsets are then derived from the enabled subset only, so disabled slots
//! cost nothing and the remaining slots pack densely in their canonical
//! order.

mod uniform;
mod vertex;

pub use uniform::{Light, Material, UniformSlot, UniformSpec, UniformValue};
pub use vertex::{VertexFormat, VertexSlot};
