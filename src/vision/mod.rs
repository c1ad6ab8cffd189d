//! Vision gateway: typed access to the hosted image-understanding API.
//!
//! | Operation | Endpoint | Result |
//! |-----------|----------|--------|
//! | query     | `/query`   | [`QueryOutput`] |
//! | detect    | `/detect`  | [`DetectOutput`] |
//! | point     | `/point`   | [`PointOutput`] |
//! | caption   | `/caption` | [`CaptionOutput`] |
//!
//! Each call is a single POST with a hard deadline; failures come back as
//! [`crate::Error`] and are never retried here.

mod client;
mod types;

pub use client::{VisionClient, VisionClientBuilder, VisionService};
pub use types::{
    CaptionArgs, CaptionLength, CaptionMetrics, CaptionOutput, DetectArgs, DetectOutput,
    NormalizedBox, NormalizedPoint, PointArgs, PointOutput, QueryArgs, QueryOutput,
    VisionOperation, VisionResult, VisualizationType,
};
