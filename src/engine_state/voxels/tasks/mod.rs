//! # Voxel Task System
//!
//! Tasks related to voxel world generation, processed on the worker pool so
//! that streaming new chunks never stalls the owning thread.

pub mod chunk_generation_task;
