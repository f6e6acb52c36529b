//! Callable tools for AI orchestration frameworks.
//!
//! A language model driving the narration decides on its own when to call
//! a tool. Each [`Tool`] therefore carries a name, a one-line description
//! the model reads, and a JSON Schema for its parameters.
//!
//! Built-in tools:
//!
//! | Name | Input | Output |
//! |------|-------|--------|
//! | `rulebookLookup` | `{ query, sessionId }` | one string of matching rules or a fallback message |
//! | `uploadedRulebooks` | `{ sessionId }` | `{ "rulebooks": [names...] }` |
//!
//! Extra tools implemented in Rust can be added to a [`ToolRegistry`] and
//! are served next to the built-ins.
//!
//! ```rust
//! use rulebook_harness::tools::ToolRegistry;
//!
//! let tools = ToolRegistry::with_builtins();
//! assert!(tools.find("rulebookLookup").is_some());
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::Config;
use crate::retrieve::{find_session_rules_with_limit, list_uploaded_rulebooks};
use crate::store::RuleStore;

/// A tool an AI agent can discover and call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Route name (`POST /tools/{name}`) and the name the model sees.
    fn name(&self) -> &str;

    /// One-line description the model uses to decide whether to call the tool.
    fn description(&self) -> &str;

    /// Whether this tool ships with the crate. Defaults to `false`.
    fn is_builtin(&self) -> bool {
        false
    }

    /// JSON Schema (`type: "object"`) describing the parameters.
    fn parameters_schema(&self) -> Value;

    /// Run the tool. `params` is always a JSON object.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

/// Shared state handed to every tool call.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn RuleStore>,
}

impl ToolContext {
    pub fn new(config: Arc<Config>, store: Arc<dyn RuleStore>) -> Self {
        Self { config, store }
    }
}

/// Reads a required, non-blank string parameter.
fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    match params.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => bail!("{} must not be empty", key),
    }
}

/// Built-in rule lookup used by the game master during narration.
pub struct RulebookLookupTool;

#[async_trait]
impl Tool for RulebookLookupTool {
    fn name(&self) -> &str {
        "rulebookLookup"
    }

    fn description(&self) -> &str {
        "Looks up specific rules from the user-uploaded rulebooks for the current game session. \
         Use this to answer questions about rules or to see how a character action should be \
         resolved according to the provided game system."
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The player action or rule question you are trying to resolve. For example: \"How does a grapple check work?\" or \"The character tries to cast a fireball spell.\""
                },
                "sessionId": {
                    "type": "string",
                    "description": "The unique ID for the current game session."
                }
            },
            "required": ["query", "sessionId"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        // An empty query is a normal "no keywords" outcome, not an error.
        let query = params.get("query").and_then(Value::as_str).unwrap_or("");
        let session_id = required_str(&params, "sessionId")?;

        let answer = find_session_rules_with_limit(
            ctx.store.as_ref(),
            query,
            session_id,
            ctx.config.retrieval.max_results,
        )
        .await;
        Ok(Value::String(answer))
    }
}

/// Built-in listing of a session's uploaded rulebook filenames.
pub struct UploadedRulebooksTool;

#[async_trait]
impl Tool for UploadedRulebooksTool {
    fn name(&self) -> &str {
        "uploadedRulebooks"
    }

    fn description(&self) -> &str {
        "Lists the rulebook files uploaded for the current game session."
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sessionId": {
                    "type": "string",
                    "description": "The unique ID for the current game session."
                }
            },
            "required": ["sessionId"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let session_id = required_str(&params, "sessionId")?;
        let names = list_uploaded_rulebooks(ctx.store.as_ref(), session_id).await;
        Ok(json!({ "rulebooks": names }))
    }
}

/// Registry of tools served over HTTP.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry holding `rulebookLookup` and `uploadedRulebooks`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(RulebookLookupTool));
        registry.register(Box::new(UploadedRulebooksTool));
        registry
    }

    /// Register a tool. A later tool with an existing name is shadowed.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Move every tool of `other` to the end of this registry.
    pub fn append(&mut self, other: ToolRegistry) {
        self.tools.extend(other.tools);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    /// Find a tool by name.
    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
