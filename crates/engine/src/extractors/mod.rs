// ABOUTME: Extraction strategies: step interpreter, field evaluator, collection processors and custom functions.
// ABOUTME: The plan module compiles configuration into the structures the others execute.

//! Field extraction module.
//!
//! Submodules:
//! - `steps`: the `get`/`haveText` step interpreter.
//! - `fields`: locating a field's element and its text.
//! - `cast`: typed scalar casting and the SAT-scale parser.
//! - `collections`: array/object processing and cleanup rules.
//! - `custom`: named custom strategies.
//! - `sports`: the athletics table sub-extractor.
//! - `plan`: configuration compiled into an executable plan.

pub mod cast;
pub mod collections;
pub mod compiled;
pub mod custom;
pub mod fields;
pub mod plan;
pub mod sports;
pub mod steps;
