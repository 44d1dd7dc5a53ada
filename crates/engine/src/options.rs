// ABOUTME: Engine configuration: FieldErrorPolicy, Options, and the fluent EngineBuilder.
// ABOUTME: build() compiles the field configuration and returns a ready Engine.

use std::fmt;

use crate::config::ExtractionConfig;
use crate::engine::Engine;
use crate::error::ExtractError;

/// Field path whose ranking list is normalized by default.
pub const DEFAULT_RANKINGS_FIELD: &str = "overallRankings.rankings";

/// What to do with a field whose rule is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldErrorPolicy {
    /// Fail the whole build on the first malformed rule.
    #[default]
    Propagate,
    /// Keep building; the malformed field extracts as `null`.
    Isolate,
}

impl fmt::Display for FieldErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldErrorPolicy::Propagate => "propagate",
            FieldErrorPolicy::Isolate => "isolate",
        };
        write!(f, "{}", s)
    }
}

/// Configuration options for the extraction engine.
#[derive(Debug, Clone)]
pub struct Options {
    pub config: ExtractionConfig,
    pub field_errors: FieldErrorPolicy,
    pub rankings_field: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: ExtractionConfig::default(),
            field_errors: FieldErrorPolicy::Propagate,
            rankings_field: DEFAULT_RANKINGS_FIELD.to_string(),
        }
    }
}

/// Builder for constructing Engine instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    opts: Options,
}

impl EngineBuilder {
    /// Create a new EngineBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field configuration to extract.
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.opts.config = config;
        self
    }

    /// Choose how malformed field rules are handled.
    pub fn field_errors(mut self, policy: FieldErrorPolicy) -> Self {
        self.opts.field_errors = policy;
        self
    }

    /// Set the field path rewritten by the ranking normalizer.
    pub fn rankings_field(mut self, path: impl Into<String>) -> Self {
        self.opts.rankings_field = path.into();
        self
    }

    /// Compile the configuration and build the Engine.
    pub fn build(self) -> Result<Engine, ExtractError> {
        Engine::new(self.opts)
    }
}
