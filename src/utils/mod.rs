//! Shared utility functions.

mod html;
mod http;

pub use html::strip_tags;
pub use http::describe_request_error;
