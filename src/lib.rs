//! # senpai-vision
//!
//! Pocket Senpai 的视觉工具网关与标注渲染器。
//!
//! Vision tool gateway and annotation renderer for the Pocket Senpai chat
//! assistant.
//!
//! ## Overview
//!
//! The chat orchestration layer (an LLM with tool calling) may decide, per
//! turn, to look at an image the user uploaded. This crate gives it four
//! tools backed by the hosted Moondream API, and renders the detection and
//! pointing results as overlays on the image.
//!
//! - **Single attempt**: every vision call is one POST with a 25 s deadline, never retried
//! - **Unexceptional tools**: tool calls always produce a value, either the result or `{"error": ...}`
//! - **Resolution-independent overlays**: normalized coordinates are mapped onto the displayed size
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use senpai_vision::tools::VisionToolset;
//! use senpai_vision::types::ToolCall;
//!
//! #[tokio::main]
//! async fn main() -> senpai_vision::Result<()> {
//!     let Some(tools) = VisionToolset::from_env()? else {
//!         return Ok(()); // MOONDREAM_API_KEY not set: do not offer vision tools
//!     };
//!
//!     let definitions = tools.definitions(); // hand these to the model
//!     # let _ = definitions;
//!
//!     let call = ToolCall::new(
//!         "call_1",
//!         "moondreamDetect",
//!         serde_json::json!({"imageUrl": "https://example.com/cat.jpg", "object": "cat"}),
//!     );
//!     let result = tools.execute(&call).await;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`vision`] | Typed client for the four vision operations |
//! | [`tools`] | Tool definitions and dispatch for the orchestration layer |
//! | [`render`] | Overlay geometry, rasterization, and the annotated image component |
//! | [`image_ref`] | Remote URL / data URI image references |
//! | [`transport`] | Deadline-bounded JSON POST primitive |
//! | [`config`] | Credential, base URL, and timeout configuration |
//! | [`types`] | Provider-neutral tool calling shapes |

pub mod config;
pub mod image_ref;
pub mod render;
pub mod tools;
pub mod transport;
pub mod types;
pub mod vision;

// Re-export main types for convenience
pub use config::VisionConfig;
pub use image_ref::ImageReference;
pub use render::{AnnotatedImage, AnnotationSet};
pub use tools::VisionToolset;
pub use types::tool::{ToolCall, ToolDefinition, ToolResult};
pub use vision::{VisionClient, VisionClientBuilder, VisionResult, VisionService};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
