//! Directive resolution.
//!
//! Test-definition documents carry directives such as `%CONTEXT` whose raw
//! text must be turned into a runtime value before a test can execute. Each
//! directive kind gets its own resolver variant; the set of resolvers is built
//! explicitly and handed to whatever loads the suite.

pub mod context;

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::error::{HarnessError, Result};

pub use context::{DefaultContextResolver, ExecutionContext};

/// Directive name the default context resolver is registered under.
pub const CONTEXT_DIRECTIVE: &str = "context";

/// A value produced by resolving a directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedValue {
    Context(ExecutionContext),
}

/// One resolver per directive kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandardDirectiveResolver {
    DefaultContext(DefaultContextResolver),
}

impl StandardDirectiveResolver {
    pub fn name(&self) -> &'static str {
        match self {
            StandardDirectiveResolver::DefaultContext(r) => r.name(),
        }
    }

    /// Resolve a raw directive value found in `document_name`.
    pub fn resolve(
        &self,
        execution_id: &str,
        document_name: &str,
        directive_name: &str,
        raw_value: &str,
    ) -> Result<ResolvedValue> {
        match self {
            StandardDirectiveResolver::DefaultContext(r) => r
                .resolve(execution_id, document_name, directive_name, raw_value)
                .map(ResolvedValue::Context),
        }
    }
}

/// Resolvers keyed by directive name.
#[derive(Debug, Clone, Default)]
pub struct DirectiveResolvers {
    resolvers: BTreeMap<String, StandardDirectiveResolver>,
}

impl DirectiveResolvers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolvers every standard test document understands.
    pub fn standard() -> Self {
        Self::new().with(
            CONTEXT_DIRECTIVE,
            StandardDirectiveResolver::DefaultContext(DefaultContextResolver::new()),
        )
    }

    /// Register `resolver` for `directive_name`, replacing any previous one.
    pub fn with(mut self, directive_name: impl Into<String>, resolver: StandardDirectiveResolver) -> Self {
        self.resolvers.insert(normalize(&directive_name.into()), resolver);
        self
    }

    pub fn get(&self, directive_name: &str) -> Option<&StandardDirectiveResolver> {
        self.resolvers.get(&normalize(directive_name))
    }

    pub fn directive_names(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }

    /// Dispatch to the resolver registered for `directive_name`.
    pub fn resolve(
        &self,
        execution_id: &str,
        document_name: &str,
        directive_name: &str,
        raw_value: &str,
    ) -> Result<ResolvedValue> {
        let resolver = self
            .get(directive_name)
            .ok_or_else(|| HarnessError::UnsupportedDirective(directive_name.to_string()))?;
        log::debug!(
            "[{}] resolving '{}' in {} with {}",
            execution_id,
            directive_name,
            document_name,
            resolver.name()
        );
        resolver.resolve(execution_id, document_name, directive_name, raw_value)
    }
}

// Directive names are case-insensitive.
fn normalize(directive_name: &str) -> String {
    directive_name.trim().to_ascii_lowercase()
}
