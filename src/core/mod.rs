// loginsight - core/mod.rs
//
// Core logic layer: profiles, filtering, date handling, extraction, export.
// Works on text and values already in memory.
// Must NOT depend on: app, platform.

pub mod auth;
pub mod datefilter;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod profile;
pub mod timestamp;
