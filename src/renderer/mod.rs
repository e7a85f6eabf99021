//! Rendering data shared with the host
//!
//! No GPU work happens here: the crate supplies the shared cube geometry,
//! materials, vertex layouts and per-material instance batches.

pub mod instances;
pub mod registry;
pub mod vertex;

pub use instances::{InstanceBatch, batch_scene, batch_scene_live};
pub use registry::{BoxGeometry, Material, MaterialId, Registry, Shading};
pub use vertex::{InstanceRaw, Vertex};
