//! HTTP transport for the vision API.
//!
//! One POST per call, JSON in and out, a hard per-call deadline, no retries.

pub mod http;

pub use http::{HttpTransport, TransportError, AUTH_HEADER, DEFAULT_API_BASE, DEFAULT_TIMEOUT_MS};
