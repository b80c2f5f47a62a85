//! # Voxel Terrain Entry Point
//!
//! Calls into the library's `run()` function to load the configuration and stream
//! the starting area.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config.json
//! ```

fn main() {
    if let Err(err) = voxel_terrain::run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
