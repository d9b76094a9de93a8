use crate::error::{EngineError, Result};
use chorus_llm::ToolDescriptor;
use serde::{Deserialize, Serialize};

/// A plain callable declared to the engine: name, human description, and
/// a JSON Schema parameter object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Tool descriptor in Model Context Protocol shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// The tool shapes the engine accepts. Closed set; anything else must
/// arrive as [`ToolInput::Raw`] and classify into one of the two known
/// variants or fail resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    Function(FunctionDecl),
    Mcp(McpTool),
    /// An unclassified tool value, e.g. read straight from configuration.
    Raw(serde_json::Value),
}

impl ToolInput {
    /// Sort a raw JSON value into one of the known variants by shape.
    /// Never returns `Raw`.
    pub fn classify(value: serde_json::Value) -> Result<Self> {
        if value.get("inputSchema").is_some() {
            let tool: McpTool = serde_json::from_value(value)
                .map_err(|e| EngineError::Configuration(format!("malformed MCP tool: {e}")))?;
            return Ok(Self::Mcp(tool));
        }
        if value.get("parameters").is_some() {
            let decl: FunctionDecl = serde_json::from_value(value).map_err(|e| {
                EngineError::Configuration(format!("malformed function tool: {e}"))
            })?;
            return Ok(Self::Function(decl));
        }
        Err(EngineError::Configuration(format!(
            "unrecognized tool shape: {value}"
        )))
    }
}

/// Normalize configured tools into transport descriptors, preserving
/// input order.
pub(crate) fn resolve_tools(tools: &[ToolInput]) -> Result<Vec<ToolDescriptor>> {
    tools.iter().map(descriptor_for).collect()
}

fn descriptor_for(tool: &ToolInput) -> Result<ToolDescriptor> {
    match tool {
        ToolInput::Function(decl) => Ok(ToolDescriptor {
            name: decl.name.clone(),
            description: decl.description.clone(),
            parameters: decl.parameters.clone(),
        }),
        ToolInput::Mcp(tool) => Ok(ToolDescriptor {
            name: tool.name.clone(),
            description: tool.description.clone().unwrap_or_default(),
            parameters: tool.input_schema.clone(),
        }),
        ToolInput::Raw(value) => descriptor_for(&ToolInput::classify(value.clone())?),
    }
}
