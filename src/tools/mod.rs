//! Vision tools for the chat orchestration layer.
//!
//! Four independent tools, one per vision operation. The orchestration layer
//! lists them with [`VisionToolset::definitions`] and hands model tool calls
//! to [`VisionToolset::execute`], which always returns a [`ToolResult`]:
//! the operation's camelCase result on success, `{"error": "..."}` otherwise.

pub mod schema;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::tool::{ToolCall, ToolDefinition, ToolResult};
use crate::vision::{
    CaptionArgs, DetectArgs, PointArgs, QueryArgs, VisionClient, VisionOperation, VisionResult,
    VisionService,
};
use crate::{Error, ErrorContext, Result};
use schema::{tool_parameters_for, ArgumentValidator};

const QUERY_DESCRIPTION: &str = "Answer natural language questions about images using visual question answering. Use this to understand what is in an image or answer specific questions about image content. You can pass the same image data URL that the user uploaded.";
const DETECT_DESCRIPTION: &str = "Detect and locate objects in an image with bounding boxes. Returns normalized coordinates (0-1) for object locations and creates a visual overlay showing detected objects. Use this when the user wants to see WHERE objects are located with bounding boxes drawn on the image.";
const POINT_DESCRIPTION: &str = "Get precise center point coordinates for objects in an image. Returns normalized coordinates (0-1) for the center of each detected object and creates a visual overlay with point markers. Use this when the user wants to see POINT locations marked on the image.";
const CAPTION_DESCRIPTION: &str = "Generate detailed natural language descriptions of images. Use this to get specialized captions or when you want a highly detailed description beyond what you can see directly.";

struct VisionTool {
    operation: VisionOperation,
    definition: ToolDefinition,
    validator: ArgumentValidator,
}

impl VisionTool {
    fn new(operation: VisionOperation) -> Result<Self> {
        let (description, parameters) = match operation {
            VisionOperation::Query => (QUERY_DESCRIPTION, tool_parameters_for::<QueryArgs>()),
            VisionOperation::Detect => (DETECT_DESCRIPTION, tool_parameters_for::<DetectArgs>()),
            VisionOperation::Point => (POINT_DESCRIPTION, tool_parameters_for::<PointArgs>()),
            VisionOperation::Caption => (CAPTION_DESCRIPTION, tool_parameters_for::<CaptionArgs>()),
        };
        let validator = ArgumentValidator::compile(&parameters)?;
        Ok(Self {
            operation,
            definition: ToolDefinition::function(operation.tool_name(), description, parameters),
            validator,
        })
    }
}

/// The four vision tools bound to one [`VisionService`].
pub struct VisionToolset {
    service: Arc<dyn VisionService>,
    tools: Vec<VisionTool>,
}

impl VisionToolset {
    pub fn new(service: Arc<dyn VisionService>) -> Result<Self> {
        let tools = VisionOperation::ALL
            .into_iter()
            .map(VisionTool::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { service, tools })
    }

    /// Toolset backed by the hosted API, or `None` when no credential is configured.
    ///
    /// The orchestration layer should only offer vision tools when this returns `Some`.
    pub fn from_env() -> Result<Option<Self>> {
        match VisionClient::from_env() {
            Ok(client) => Self::new(Arc::new(client)).map(Some),
            Err(Error::Configuration { ref context, .. })
                if context.field_path.as_deref() == Some(crate::config::ENV_API_KEY) =>
            {
                warn!("vision tools disabled: no API key configured");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.definition.name())
    }

    pub fn handles(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.definition.name() == name)
    }

    /// Run one model tool call. Never fails: errors become `{"error": ...}` content.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.invoke(call).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(content) => ToolResult::success(&call.id, content),
                Err(e) => ToolResult::failure(&call.id, Error::from(e).to_string()),
            },
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
                ToolResult::failure(&call.id, e.to_string())
            }
        }
    }

    /// Typed variant of [`Self::execute`].
    pub async fn invoke(&self, call: &ToolCall) -> Result<VisionResult> {
        let name = call.name.as_str();
        let tool = self
            .tools
            .iter()
            .find(|t| t.definition.name() == name)
            .ok_or_else(|| {
                Error::validation_with_context(
                    format!("Unknown tool: {}", name),
                    ErrorContext::new().with_source("tool_dispatch"),
                )
            })?;

        let arguments = call.parsed_arguments().map_err(|e| {
            Error::validation_with_context(
                format!("invalid arguments for {}", name),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("tool_dispatch"),
            )
        })?;
        tool.validator.validate(name, &arguments)?;
        debug!(tool = name, call_id = %call.id, "dispatching tool call");

        let service = self.service.as_ref();
        match tool.operation {
            VisionOperation::Query => {
                let args: QueryArgs = decode_arguments(name, arguments)?;
                service.query(&args).await.map(VisionResult::Query)
            }
            VisionOperation::Detect => {
                let args: DetectArgs = decode_arguments(name, arguments)?;
                service.detect(&args).await.map(VisionResult::Detect)
            }
            VisionOperation::Point => {
                let args: PointArgs = decode_arguments(name, arguments)?;
                service.point(&args).await.map(VisionResult::Point)
            }
            VisionOperation::Caption => {
                let args: CaptionArgs = decode_arguments(name, arguments)?;
                service.caption(&args).await.map(VisionResult::Caption)
            }
        }
    }
}

/// Tool definitions without a bound service, e.g. for listing.
pub fn definitions() -> Result<Vec<ToolDefinition>> {
    VisionOperation::ALL
        .into_iter()
        .map(|op| VisionTool::new(op).map(|t| t.definition))
        .collect()
}

fn decode_arguments<T: DeserializeOwned>(name: &str, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| {
        Error::validation_with_context(
            format!("invalid arguments for {}", name),
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("tool_dispatch"),
        )
    })
}
