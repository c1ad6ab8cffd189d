//! Vision operation arguments, results, and provider wire shapes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The four remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionOperation {
    Query,
    Detect,
    Point,
    Caption,
}

impl VisionOperation {
    pub const ALL: [VisionOperation; 4] = [
        VisionOperation::Query,
        VisionOperation::Detect,
        VisionOperation::Point,
        VisionOperation::Caption,
    ];

    /// Sub-path under the API base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Detect => "detect",
            Self::Point => "point",
            Self::Caption => "caption",
        }
    }

    /// Diagnostic label used in logs and transport errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Query => "Moondream Query",
            Self::Detect => "Moondream Detect",
            Self::Point => "Moondream Point",
            Self::Caption => "Moondream Caption",
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Query => "moondreamQuery",
            Self::Detect => "moondreamDetect",
            Self::Point => "moondreamPoint",
            Self::Caption => "moondreamCaption",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.tool_name() == name)
    }
}

// ---------------------------------------------------------------------------
// Tool arguments (camelCase, as the model sends them)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryArgs {
    /// The image URL or base64 encoded image data URL (data:image/jpeg;base64,...). Use the same data URL from the uploaded image in the conversation.
    #[schemars(length(min = 1))]
    pub image_url: String,
    /// The natural language question to ask about the image
    #[schemars(length(min = 1))]
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectArgs {
    /// The image URL or base64 encoded image data URL (data:image/jpeg;base64,...). Use the same data URL from the uploaded image in the conversation.
    #[schemars(length(min = 1))]
    pub image_url: String,
    /// The object to detect in the image (e.g., "person", "car", "face", "dog"). Can detect any object type.
    #[schemars(length(min = 1))]
    pub object: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointArgs {
    /// The image URL or base64 encoded image data URL (data:image/jpeg;base64,...). Use the same data URL from the uploaded image in the conversation.
    #[schemars(length(min = 1))]
    pub image_url: String,
    /// The object to point to in the image (e.g., "face", "building", "logo"). Can point to any object type.
    #[schemars(length(min = 1))]
    pub object: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptionArgs {
    /// The image URL or base64 encoded image data URL (data:image/jpeg;base64,...). Use the same data URL from the uploaded image in the conversation.
    #[schemars(length(min = 1))]
    pub image_url: String,
    /// The desired length of the caption (default: normal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<CaptionLength>,
    /// Whether to stream the caption (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaptionLength {
    Short,
    #[default]
    Normal,
    Long,
}

impl CaptionLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Normal => "normal",
            Self::Long => "long",
        }
    }

}

impl std::str::FromStr for CaptionLength {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "normal" => Ok(Self::Normal),
            "long" => Ok(Self::Long),
            other => Err(crate::Error::validation_with_context(
                format!("unknown caption length: {}", other),
                crate::ErrorContext::new()
                    .with_field_path("length")
                    .with_details("expected short, normal, or long"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized geometry
// ---------------------------------------------------------------------------

/// Box edges as fractions of image width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl NormalizedBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// All edges finite, inside [0, 1], and min <= max on both axes.
    pub fn is_well_formed(&self) -> bool {
        [self.x_min, self.y_min, self.x_max, self.y_max]
            .iter()
            .all(|v| is_fraction(*v))
            && self.x_min <= self.x_max
            && self.y_min <= self.y_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_well_formed(&self) -> bool {
        is_fraction(self.x) && is_fraction(self.y)
    }
}

fn is_fraction(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualizationType {
    #[serde(rename = "bounding-boxes")]
    BoundingBoxes,
    #[serde(rename = "points")]
    Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutput {
    pub answer: String,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectOutput {
    pub image_url: String,
    pub object: String,
    pub objects: Vec<NormalizedBox>,
    pub request_id: String,
    pub count: usize,
    pub visualization_type: VisualizationType,
}

impl DetectOutput {
    pub fn new(
        image_url: impl Into<String>,
        object: impl Into<String>,
        objects: Vec<NormalizedBox>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            object: object.into(),
            count: objects.len(),
            objects,
            request_id: request_id.into(),
            visualization_type: VisualizationType::BoundingBoxes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOutput {
    pub image_url: String,
    pub object: String,
    pub points: Vec<NormalizedPoint>,
    pub request_id: String,
    pub count: usize,
    pub visualization_type: VisualizationType,
}

impl PointOutput {
    pub fn new(
        image_url: impl Into<String>,
        object: impl Into<String>,
        points: Vec<NormalizedPoint>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            object: object.into(),
            count: points.len(),
            points,
            request_id: request_id.into(),
            visualization_type: VisualizationType::Points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionOutput {
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CaptionMetrics>,
    pub finish_reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionMetrics {
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub prefill_time_ms: f64,
    pub decode_time_ms: f64,
    pub ttft_ms: f64,
}

/// Result of one tool invocation, tagged by operation.
///
/// Serializes untagged so the tool output is exactly the operation's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisionResult {
    Query(QueryOutput),
    Detect(DetectOutput),
    Point(PointOutput),
    Caption(CaptionOutput),
}

impl VisionResult {
    pub fn operation(&self) -> VisionOperation {
        match self {
            Self::Query(_) => VisionOperation::Query,
            Self::Detect(_) => VisionOperation::Detect,
            Self::Point(_) => VisionOperation::Point,
            Self::Caption(_) => VisionOperation::Caption,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider wire shapes (snake_case)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    pub answer: String,
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl From<WireBox> for NormalizedBox {
    fn from(b: WireBox) -> Self {
        NormalizedBox::new(b.x_min, b.y_min, b.x_max, b.y_max)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetectResponse {
    pub objects: Vec<WireBox>,
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePoint {
    pub x: f64,
    pub y: f64,
}

impl From<WirePoint> for NormalizedPoint {
    fn from(p: WirePoint) -> Self {
        NormalizedPoint::new(p.x, p.y)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointResponse {
    pub points: Vec<WirePoint>,
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaptionResponse {
    pub caption: String,
    #[serde(default)]
    pub metrics: Option<WireCaptionMetrics>,
    pub finish_reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCaptionMetrics {
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub prefill_time_ms: f64,
    pub decode_time_ms: f64,
    pub ttft_ms: f64,
}

impl From<WireCaptionMetrics> for CaptionMetrics {
    fn from(m: WireCaptionMetrics) -> Self {
        Self {
            input_tokens: m.input_tokens,
            output_tokens: m.output_tokens,
            prefill_time_ms: m.prefill_time_ms,
            decode_time_ms: m.decode_time_ms,
            ttft_ms: m.ttft_ms,
        }
    }
}
