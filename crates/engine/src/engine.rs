// ABOUTME: The extraction engine façade: runs a compiled field plan against one parsed document.
// ABOUTME: Holds the per-document context that memoizes the shared sports section.

//! Extraction engine.
//!
//! An [`Engine`] is built once per configuration and is then a pure function
//! of the document it is given: it keeps no state between calls and can be
//! shared across threads to extract many documents concurrently.

use once_cell::unsync::OnceCell;
use scraper::Html;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extractors::cast::cast;
use crate::extractors::collections::{build_flexible_object, build_mapped_object, collect_array};
use crate::extractors::fields::{find_candidates, resolve_text};
use crate::extractors::plan::{CompiledConfig, CompiledField, FieldKind, ObjectPlan};
use crate::extractors::sports::{extract_sports, SportsSection};
use crate::options::{EngineBuilder, FieldErrorPolicy, Options};
use crate::result::ExtractionResult;

/// State scoped to a single document-processing call.
///
/// The sports section is computed on first demand and shared by every
/// sports field of the same document.
pub struct DocumentContext<'a> {
    doc: &'a Html,
    sports: OnceCell<SportsSection>,
}

impl<'a> DocumentContext<'a> {
    pub fn new(doc: &'a Html) -> Self {
        Self {
            doc,
            sports: OnceCell::new(),
        }
    }

    pub fn doc(&self) -> &'a Html {
        self.doc
    }

    /// Returns the document's sports section, extracting it on first use.
    pub fn sports(&self) -> &SportsSection {
        self.sports.get_or_init(|| extract_sports(self.doc))
    }

    /// Returns true once the sports section has been extracted.
    pub fn sports_computed(&self) -> bool {
        self.sports.get().is_some()
    }
}

/// Extracts configured fields from profile pages.
#[derive(Debug)]
pub struct Engine {
    opts: Options,
    plan: CompiledConfig,
    config_errors: Vec<ExtractError>,
}

impl Engine {
    /// Creates a builder for configuring an Engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Compiles `opts.config` according to `opts.field_errors`.
    pub fn new(opts: Options) -> Result<Self, ExtractError> {
        let (plan, config_errors) = match opts.field_errors {
            FieldErrorPolicy::Propagate => (CompiledConfig::compile(&opts.config)?, Vec::new()),
            FieldErrorPolicy::Isolate => {
                let (plan, errors) = CompiledConfig::compile_isolated(&opts.config);
                for err in &errors {
                    warn!(field = %err.field, error = %err, "field rule isolated");
                }
                (plan, errors)
            }
        };
        Ok(Self {
            opts,
            plan,
            config_errors,
        })
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &ExtractionConfig {
        &self.opts.config
    }

    /// Errors of fields isolated at build time (always empty under `Propagate`).
    pub fn config_errors(&self) -> &[ExtractError] {
        &self.config_errors
    }

    /// Parses `html` and extracts every configured field.
    pub fn extract(&self, html: &str) -> ExtractionResult {
        let doc = Html::parse_document(html);
        self.extract_document(&doc)
    }

    /// Extracts every configured field from an already-parsed document.
    pub fn extract_document(&self, doc: &Html) -> ExtractionResult {
        let ctx = DocumentContext::new(doc);
        let result: ExtractionResult = self
            .plan
            .fields()
            .iter()
            .map(|field| (field.path.clone(), evaluate_field(&ctx, field)))
            .collect();
        info!(
            fields = result.len(),
            sports = ctx.sports_computed(),
            "document extracted"
        );
        result
    }

    /// Normalizes the configured ranking field of `result` in place.
    pub fn process_rankings(&self, result: ExtractionResult) -> ExtractionResult {
        result.process_rankings(&self.opts.rankings_field)
    }
}

/// Produces the value of one field.
fn evaluate_field(ctx: &DocumentContext<'_>, field: &CompiledField) -> Value {
    let doc = ctx.doc();
    let candidates = match field.kind {
        FieldKind::Custom(_) | FieldKind::Broken(_) => Vec::new(),
        _ => find_candidates(doc, &field.find),
    };

    let value = match &field.kind {
        FieldKind::Scalar(ty) => {
            let text = candidates
                .first()
                .map(|el| resolve_text(doc, *el, &field.get_text));
            cast(text.as_deref(), *ty)
        }
        FieldKind::Array(rule) => Value::Array(
            collect_array(doc, &candidates, &field.get_text, *rule)
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        FieldKind::Object(ObjectPlan::Mapped { keys, cleanup }) => {
            Value::Object(build_mapped_object(doc, &candidates, keys, cleanup))
        }
        FieldKind::Object(ObjectPlan::Flexible { pair }) => {
            Value::Object(build_flexible_object(&candidates, pair))
        }
        FieldKind::Custom(function) => function.run(ctx, field),
        FieldKind::Broken(_) => Value::Null,
    };
    debug!(
        field = %field.path,
        kind = field.kind_name(),
        candidates = candidates.len(),
        null = value.is_null(),
        "field evaluated"
    );
    value
}

/// Extracts `config` from `html` in one call, failing on the first malformed rule.
pub fn extract(html: &str, config: &ExtractionConfig) -> Result<ExtractionResult, ExtractError> {
    let engine = Engine::builder().config(config.clone()).build()?;
    Ok(engine.extract(html))
}
