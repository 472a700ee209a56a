use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::error::{HarnessError, Result};

/// Runtime context a template test is executed against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, serde_json::Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

/// Builds the default [`ExecutionContext`] from a `context` directive.
///
/// The directive grammar is not settled yet, so every call fails with
/// [`HarnessError::NotImplemented`] and the suite refuses to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultContextResolver;

impl DefaultContextResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &'static str {
        "default-context"
    }

    // TODO: parse `raw_value` into variables once the context directive grammar lands,
    // returning MalformedDirective on bad input.
    pub fn resolve(
        &self,
        _execution_id: &str,
        document_name: &str,
        directive_name: &str,
        _raw_value: &str,
    ) -> Result<ExecutionContext> {
        Err(HarnessError::NotImplemented {
            resolver: self.name(),
            directive: directive_name.to_string(),
            document: document_name.to_string(),
        })
    }
}
