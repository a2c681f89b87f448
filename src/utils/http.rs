//! Transport error formatting.

use std::error::Error as _;

/// One-line description of a failed request, including its cause chain.
///
/// reqwest's own `Display` stops at "error sending request", which hides
/// whether the connection was refused or the timeout fired.
pub fn describe_request_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();

    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    if err.is_timeout() && !message.contains("timed out") {
        message.push_str(" (timed out)");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_keeps_cause() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();

        let message = describe_request_error(&err);
        assert!(message.starts_with(&err.to_string()));
        assert!(message.len() > err.to_string().len());
    }

    #[test]
    fn test_builder_error() {
        let err = reqwest::Client::new()
            .get("http://example.com/")
            .header("x-bad", "line\nbreak")
            .build()
            .unwrap_err();

        assert!(describe_request_error(&err).starts_with("builder error"));
    }
}
