//! Name-to-tool dispatch

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Number, Value};
use tracing::{error, info, warn};
use uex_api::{Payload, QueryParams};

use crate::catalog::uex_tools;
use crate::error::{Result, ToolError};
use crate::proxy::CachedFetchProxy;
use crate::schema::ToolDescriptor;
use crate::tool::Tool;

/// Arguments supplied by the LLM for one call
pub type ToolArgs = Map<String, Value>;

/// Check a call against the tool's schema and turn its arguments into query
/// parameters. Runs before any I/O.
///
/// Tools that declare no parameters ignore whatever was supplied.
pub fn validate(descriptor: &ToolDescriptor, args: &ToolArgs) -> Result<QueryParams> {
    if !descriptor.parameters.requires_argument() {
        return Ok(Vec::new());
    }

    if args.is_empty() {
        return Err(ToolError::MissingParameter(descriptor.name.clone()));
    }

    args.iter()
        .map(|(field, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => number_text(n),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(ToolError::InvalidArgument {
                        tool: descriptor.name.clone(),
                        field: field.clone(),
                    })
                }
            };
            Ok((field.clone(), value))
        })
        .collect()
}

/// Whole-valued floats are written as integers, so `4.0` and `4` produce the
/// same query and cache key.
fn number_text(n: &Number) -> String {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53

    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Fixed table of tools, built once at startup
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every UEX tool, reading through `proxy`
    pub fn standard(proxy: Arc<CachedFetchProxy>, base_url: &str) -> Self {
        let mut registry = Self::new();
        for tool in uex_tools(proxy, base_url) {
            registry.register(Arc::new(tool));
        }
        registry
    }

    /// Add a tool, replacing (and returning) any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.descriptor().name.clone();
        match self.by_name.get(&name) {
            Some(&index) => Some(std::mem::replace(&mut self.tools[index], tool)),
            None => {
                self.by_name.insert(name, self.tools.len());
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor())
    }

    /// The catalogue as a chat-completions `functions` array
    pub fn function_specs(&self) -> Vec<Value> {
        self.descriptors()
            .map(ToolDescriptor::to_function_spec)
            .collect()
    }

    /// Validate and execute a tool call
    pub async fn run_function(&self, name: &str, args: ToolArgs) -> Result<Payload> {
        info!(tool = name, args = ?args, "Function called");

        let Some(tool) = self.get(name) else {
            warn!(tool = name, "Function not defined");
            return Err(ToolError::UnknownTool(name.to_string()));
        };

        let query = validate(tool.descriptor(), &args)?;

        match tool.execute(query).await {
            Ok(payload) => {
                info!(tool = name, "Function executed successfully");
                Ok(payload)
            }
            Err(e) => {
                error!(tool = name, error = %e, "Function execution failed");
                Err(e)
            }
        }
    }
}
