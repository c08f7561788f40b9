// loginsight - app/mod.rs
//
// Application layer: input selection and request retrieval.
// Dependencies: core, platform.

pub mod requests;
