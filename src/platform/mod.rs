// loginsight - platform/mod.rs
//
// Platform layer: config directory resolution, config.toml, file reading.
// Dependencies: core data types, directories, memmap2.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
