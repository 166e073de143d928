//! Render-side data for an external WebGPU renderer
//!
//! Nothing here touches a device: meshes and atlases are produced on the CPU
//! and handed over as Pod vertex slices and RGBA images.

pub mod atlas;
pub mod frame;
pub mod mesh;
pub mod vertex;

pub use atlas::label_atlas;
pub use frame::{DieInstanceRaw, die_instances, hull_overlay, layout_words, wall_vertices};
pub use mesh::{DieMesh, HULL_OVERLAY_SCALE, box_mesh, hull_wireframe, model_matrix};
pub use vertex::{DieVertex, LineVertex};
