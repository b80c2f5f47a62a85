//! Rendering side of the chunk engine.
//!
//! This module turns block grids into triangle meshes and hands them to an
//! external renderer. Graphics-API specifics (shaders, GPU buffers, draw calls)
//! live behind the [`render_target::RenderTarget`] boundary.

pub mod meshing;
pub mod render_target;
pub mod tasks;
