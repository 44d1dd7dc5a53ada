// ABOUTME: Main library entry point for the unipage profile extraction engine.
// ABOUTME: Re-exports the public API: Engine, EngineBuilder, ExtractionConfig, ExtractionResult, ExtractError.

//! unipage - declarative extraction of structured data from saved
//! university-profile pages.
//!
//! A JSON [`ExtractionConfig`] maps output field paths to small step programs
//! (`get:<css>`, `haveText:<literal>`) plus a declared type. An [`Engine`]
//! compiles that configuration once and turns each HTML snapshot into a flat
//! [`ExtractionResult`] with exactly one value per configured field.
//!
//! # Example
//!
//! ```
//! use unipage_engine::{Engine, ExtractError, ExtractionConfig};
//!
//! fn main() -> Result<(), ExtractError> {
//!     let config = ExtractionConfig::from_json(
//!         r#"{"campusInfo.name": {"find": ["get:h1"]}}"#,
//!     )?;
//!     let engine = Engine::builder().config(config).build()?;
//!     let result = engine.extract("<h1>  Example   University </h1>");
//!     assert_eq!(result.get("campusInfo.name").unwrap(), "Example University");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod options;
pub mod rankings;
pub mod resource;
pub mod result;
pub mod text;
pub mod validate;

pub use crate::config::{
    page_prefix_for_file, ExtractionConfig, FieldConfig, FieldType, MappingRule, ScalarType,
};
pub use crate::engine::{extract, DocumentContext, Engine};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::options::{EngineBuilder, FieldErrorPolicy, Options, DEFAULT_RANKINGS_FIELD};
pub use crate::rankings::normalize_rankings;
pub use crate::result::ExtractionResult;
pub use crate::validate::TypeMismatch;
