//! Tool trait and dispatch plumbing for the wallet operations.
//!
//! Each wallet operation is exposed as a tool: a JSON-schema-described
//! function that takes JSON arguments and returns a JSON envelope. The
//! serialized [`ToolDefinition`] follows the function-calling format
//! (`{"type": "function", "function": {...}}`) so the definitions can
//! be handed to a chat model unchanged; no model client lives in this
//! crate.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// A type alias for `Result<T, ToolError>`.
pub type ToolResult<T> = Result<T, ToolError>;

/// Definition of a tool for function calling.
///
/// Serializes to:
/// ```json
/// {
///     "type": "function",
///     "function": {
///         "name": "create_wallet",
///         "description": "...",
///         "parameters": { ... },
///         "strict": true
///     }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct ToolDefinition {
    /// Name of the tool, snake_case.
    pub name: String,

    /// What the tool does; shown to the caller deciding when to use it.
    pub description: String,

    /// JSON schema for the tool's arguments.
    pub parameters: Value,

    /// Whether the schema is enforced exactly (structured outputs).
    #[serde(default)]
    pub strict: Option<bool>,
}

impl ToolDefinition {
    /// Create a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            strict: None,
        }
    }

    /// Enable strict schema validation.
    ///
    /// Strict schemas must reject unknown keys, so
    /// `additionalProperties: false` is inserted when absent.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        if strict
            && let Some(obj) = self.parameters.as_object_mut()
            && !obj.contains_key("additionalProperties")
        {
            obj.insert("additionalProperties".to_owned(), Value::Bool(false));
        }
        self
    }

    /// Check if strict mode is enabled.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        matches!(self.strict, Some(true))
    }

    /// Returns the tool name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Custom serialization to the function-calling format.
impl Serialize for ToolDefinition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut function = serde_json::Map::new();
        function.insert("name".to_owned(), Value::String(self.name.clone()));
        function.insert(
            "description".to_owned(),
            Value::String(self.description.clone()),
        );
        function.insert("parameters".to_owned(), self.parameters.clone());
        if let Some(strict) = self.strict {
            function.insert("strict".to_owned(), Value::Bool(strict));
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "function")?;
        map.serialize_entry("function", &function)?;
        map.end()
    }
}

/// The core trait implemented by every wallet tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static name of the tool.
    const NAME: &'static str;

    /// Arguments type for the tool.
    type Args: for<'de> Deserialize<'de> + Send;

    /// Output type of the tool.
    type Output: Serialize + Send;

    /// Error type for tool execution.
    type Error: Into<ToolError> + Send;

    /// Get the name of the tool.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the JSON schema for the tool's arguments.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with typed arguments.
    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error>;

    /// Get the tool definition for function calling.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_owned(),
            description: self.description(),
            parameters: self.parameters_schema(),
            strict: None,
        }
    }

    /// Call the tool with JSON arguments and return JSON output.
    ///
    /// Arguments arrive either as an object or as a JSON string holding
    /// one, which is how chat models deliver them.
    async fn call_json(&self, args: Value) -> Result<Value, ToolError>
    where
        Self::Output: 'static,
    {
        let typed_args: Self::Args = match &args {
            Value::String(s) => {
                serde_json::from_str(s).map_err(|e| ToolError::InvalidArguments(e.to_string()))?
            }
            _ => serde_json::from_value(args)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?,
        };

        let result = self.call(typed_args).await.map_err(Into::into)?;
        serde_json::to_value(result).map_err(|e| ToolError::Execution(e.to_string()))
    }
}

/// A boxed dynamic tool that can be used in collections.
pub type BoxedTool = Box<dyn DynTool>;

/// Object-safe version of the Tool trait for dynamic dispatch.
#[async_trait]
pub trait DynTool: Send + Sync {
    /// Get the name of the tool.
    fn name(&self) -> &str;

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Call the tool with JSON arguments.
    async fn call_json(&self, args: Value) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T: Tool + 'static> DynTool for T
where
    T::Output: 'static,
{
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> String {
        Tool::description(self)
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        Tool::call_json(self, args).await
    }
}

/// A collection of tools addressed by name.
#[derive(Default)]
pub struct ToolBox {
    tools: HashMap<String, BoxedTool>,
}

impl ToolBox {
    /// Create a new empty toolbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool to the toolbox.
    pub fn add<T: Tool + 'static>(&mut self, tool: T)
    where
        T::Output: 'static,
    {
        self.tools.insert(tool.name().to_owned(), Box::new(tool));
    }

    /// Add a boxed tool to the toolbox.
    pub fn add_boxed(&mut self, tool: BoxedTool) {
        self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoxedTool> {
        self.tools.get(name)
    }

    /// Get all tool definitions.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Get the names of all tools.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.values().map(|t| t.name()).collect()
    }

    /// Check if the toolbox contains a tool with the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of tools in the toolbox.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the toolbox is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name with JSON arguments.
    pub async fn call(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_owned()))?;
        tool.call_json(args).await
    }
}

impl fmt::Debug for ToolBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBox")
            .field("tools", &self.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod tool_definition {
        use super::*;

        fn sample_parameters() -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "walletAddress": {"type": "string"}
                },
                "required": ["walletAddress"]
            })
        }

        #[test]
        fn new_creates_definition() {
            let def = ToolDefinition::new("get_balance", "Read a balance", sample_parameters());
            assert_eq!(def.name(), "get_balance");
            assert_eq!(def.description(), "Read a balance");
            assert!(def.strict.is_none());
        }

        #[test]
        fn with_strict_adds_additional_properties() {
            let def = ToolDefinition::new("t", "d", sample_parameters()).with_strict(true);
            assert!(def.is_strict());
            assert_eq!(
                def.parameters.get("additionalProperties"),
                Some(&Value::Bool(false))
            );
        }

        #[test]
        fn with_strict_preserves_existing_additional_properties() {
            let params = serde_json::json!({
                "type": "object",
                "additionalProperties": true
            });
            let def = ToolDefinition::new("t", "d", params).with_strict(true);
            assert_eq!(
                def.parameters.get("additionalProperties"),
                Some(&Value::Bool(true))
            );
        }

        #[test]
        fn serializes_to_function_calling_format() {
            let def = ToolDefinition::new("get_balance", "Read a balance", sample_parameters());
            let json = serde_json::to_value(&def).unwrap();

            assert_eq!(json["type"], "function");
            assert_eq!(json["function"]["name"], "get_balance");
            assert_eq!(json["function"]["description"], "Read a balance");
            assert!(json["function"]["parameters"].is_object());
            assert!(json["function"].get("strict").is_none());
        }

        #[test]
        fn serializes_strict_flag_when_set() {
            let def = ToolDefinition::new("t", "d", sample_parameters()).with_strict(true);
            let json = serde_json::to_value(&def).unwrap();
            assert_eq!(json["function"]["strict"], Value::Bool(true));
        }

        #[test]
        fn deserializes_from_flat_form() {
            let json = r#"{
                "name": "submit_signature",
                "description": "Submit a signature",
                "parameters": {"type": "object"}
            }"#;
            let def: ToolDefinition = serde_json::from_str(json).unwrap();
            assert_eq!(def.name, "submit_signature");
            assert!(!def.is_strict());
        }
    }

    mod dispatch {
        use super::*;

        struct HexPrefixTool;

        #[derive(Deserialize)]
        struct PrefixArgs {
            value: String,
        }

        #[derive(Serialize)]
        struct PrefixOutput {
            prefixed: String,
        }

        #[async_trait]
        impl Tool for HexPrefixTool {
            const NAME: &'static str = "hex_prefix";
            type Args = PrefixArgs;
            type Output = PrefixOutput;
            type Error = ToolError;

            fn description(&self) -> String {
                "Prefix a hex string with 0x".to_owned()
            }

            fn parameters_schema(&self) -> Value {
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "value": {"type": "string"}
                    },
                    "required": ["value"],
                    "additionalProperties": false
                })
            }

            async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
                if args.value.is_empty() {
                    return Err(ToolError::InvalidArguments("value is empty".to_owned()));
                }
                let prefixed = if args.value.starts_with("0x") {
                    args.value
                } else {
                    format!("0x{}", args.value)
                };
                Ok(PrefixOutput { prefixed })
            }
        }

        #[tokio::test]
        async fn call_json_with_object_arguments() {
            let tool = HexPrefixTool;
            let out = Tool::call_json(&tool, serde_json::json!({"value": "abcd"}))
                .await
                .unwrap();
            assert_eq!(out["prefixed"], "0xabcd");
        }

        #[tokio::test]
        async fn call_json_with_stringified_arguments() {
            let tool = HexPrefixTool;
            let out = Tool::call_json(&tool, Value::String(r#"{"value": "0xff"}"#.to_owned()))
                .await
                .unwrap();
            assert_eq!(out["prefixed"], "0xff");
        }

        #[tokio::test]
        async fn call_json_rejects_malformed_arguments() {
            let tool = HexPrefixTool;
            let err = Tool::call_json(&tool, serde_json::json!({"nope": 1}))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
        }

        #[test]
        fn definition_carries_schema() {
            let def = Tool::definition(&HexPrefixTool);
            assert_eq!(def.name, "hex_prefix");
            assert!(def.parameters.get("properties").is_some());
        }

        #[tokio::test]
        async fn toolbox_add_call_and_lookup() {
            let mut toolbox = ToolBox::new();
            assert!(toolbox.is_empty());
            toolbox.add(HexPrefixTool);

            assert_eq!(toolbox.len(), 1);
            assert!(toolbox.contains("hex_prefix"));
            assert!(toolbox.get("hex_prefix").is_some());
            assert_eq!(toolbox.definitions().len(), 1);

            let out = toolbox
                .call("hex_prefix", serde_json::json!({"value": "12"}))
                .await
                .unwrap();
            assert_eq!(out["prefixed"], "0x12");
        }

        #[tokio::test]
        async fn toolbox_reports_unknown_tool() {
            let toolbox = ToolBox::new();
            let err = toolbox
                .call("missing", serde_json::json!({}))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::NotFound(_)));
        }

        #[tokio::test]
        async fn boxed_tool_dispatches() {
            let mut toolbox = ToolBox::new();
            let tool: BoxedTool = Box::new(HexPrefixTool);
            toolbox.add_boxed(tool);
            assert!(toolbox.contains("hex_prefix"));
        }

        #[test]
        fn toolbox_debug_lists_names() {
            let mut toolbox = ToolBox::new();
            toolbox.add(HexPrefixTool);
            let debug = format!("{toolbox:?}");
            assert!(debug.contains("ToolBox"));
            assert!(debug.contains("hex_prefix"));
        }
    }
}
