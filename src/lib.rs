#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! A chunked voxel terrain engine: procedural height-field generation, face-culled
//! meshing and background chunk streaming.
//!
//! ## Key Modules
//!
//! * `config` - Terrain and world settings, loadable from JSON
//! * `core` - Core utilities shared between the owning thread and workers
//! * `engine_state` - The engine façade with voxels, meshing and task management
//! * `error` - Error types for block access, configuration and startup
//!
//! ## Architecture
//!
//! The engine keeps a clear separation between:
//! * Voxel storage (fixed-size chunks of block ids)
//! * Terrain generation (fractal noise sampled per world column)
//! * Meshing (one quad per exposed block face, emitted as two triangles)
//! * Task scheduling and execution on a pool of worker threads
//!
//! Finished meshes leave the engine as [`RenderCommand`]s submitted to a
//! [`RenderTarget`]; the crate never talks to a GPU itself.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_terrain::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```
//!
//! [`RenderCommand`]: engine_state::rendering::render_target::RenderCommand
//! [`RenderTarget`]: engine_state::rendering::render_target::RenderTarget

use std::env;

use cgmath::Point2;
use log::info;

use config::EngineConfig;
use engine_state::{rendering::render_target::DrawList, EngineState};
use error::EngineError;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

/// Streams the configured view radius around the origin and reports the result.
///
/// The first command line argument, if any, names a JSON config file. Logging is
/// controlled through `RUST_LOG`.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    let mut engine = EngineState::new(config)?;
    let mut draw_list = DrawList::new();

    let requested = engine.request_area(Point2::new(0, 0), config.world.view_radius);
    info!(
        "Streaming {} chunks with seed {}",
        requested, config.terrain.seed
    );
    engine.run_until_idle(&mut draw_list);

    let draw_calls = draw_list.draw_calls();
    info!(
        "Ready: {} chunks meshed, {} draw calls, {} vertices",
        draw_list.len(),
        draw_calls.len(),
        draw_list.total_vertices()
    );
    info!(
        "Terrain height at the origin: {}",
        engine.world().get().height_at_world(0, 0).unwrap_or(0.0)
    );

    Ok(())
}
