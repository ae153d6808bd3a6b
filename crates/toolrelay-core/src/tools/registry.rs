//! Tool registry
//!
//! Maps tool names to their description, parameter schema and handler.
//! The registry is built with `&mut` registration and then shared behind an
//! `Arc`; lookups never mutate it.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::Tool;

/// Errors raised while registering or running tools
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// A tool with this name is already registered
    #[error("Tool '{0}' is already registered")]
    Duplicate(String),

    /// The parameter schema could not be compiled
    #[error("Invalid schema for tool '{name}': {reason}")]
    InvalidSchema { name: String, reason: String },

    /// An argument had the wrong shape for the handler
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// The handler failed
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type HandlerResult<T> = Result<T, ToolError>;

/// Tool handler: receives validated params, returns the JSON result
pub type ToolHandler = Box<dyn Fn(&Map<String, Value>) -> HandlerResult<Value> + Send + Sync>;

/// A registered tool
pub struct ToolEntry {
    name: String,
    description: String,
    schema: Value,
    validator: jsonschema::Validator,
    handler: ToolHandler,
}

impl ToolEntry {
    /// Tool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameter schema as registered
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate params against the compiled schema
    ///
    /// Returns every violation joined with `; `.
    pub fn validate(&self, params: &Value) -> Result<(), String> {
        if self.validator.validate(params).is_ok() {
            return Ok(());
        }

        let msgs: Vec<String> = self
            .validator
            .iter_errors(params)
            .map(|err| format!("{} at {}", err, err.instance_path))
            .collect();
        Err(msgs.join("; "))
    }

    /// Run the handler
    pub fn call(&self, params: &Map<String, Value>) -> HandlerResult<Value> {
        (self.handler)(params)
    }

    /// Definition offered to the LLM
    pub fn definition(&self) -> Tool {
        Tool::new(&self.name, &self.description).with_schema(self.schema.clone())
    }
}

impl fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Name-keyed set of tools served over JSON-RPC and offered to the LLM
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    ///
    /// The schema is compiled once here. Duplicate names and schemas that do
    /// not compile are rejected.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
        handler: F,
    ) -> HandlerResult<()>
    where
        F: Fn(&Map<String, Value>) -> HandlerResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }

        let validator = jsonschema::validator_for(&schema).map_err(|e| ToolError::InvalidSchema {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        self.tools.insert(
            name.clone(),
            ToolEntry {
                name,
                description: description.into(),
                schema,
                validator,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> Option<&ToolEntry> {
        self.tools.get(name)
    }

    /// Tool definitions for the LLM, sorted by name
    pub fn definitions(&self) -> Vec<Tool> {
        let mut defs: Vec<Tool> = self.tools.values().map(ToolEntry::definition).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
