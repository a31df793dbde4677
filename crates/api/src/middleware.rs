/// Identity extraction from upstream auth headers
pub mod auth;
/// Mapping from domain errors to HTTP responses
pub mod error_handling;
/// JSON body extractor with domain-mapped rejections
pub mod json_body;
