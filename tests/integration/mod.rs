//! Integration tests with mock HTTP server

pub mod gateway;
pub mod mock_server;
pub mod timeout;
pub mod tools;
