//! Shared HTTP response helpers for the source API client.

use crate::error::SourceError;

/// Check an HTTP response's status code, returning its body text on
/// success and [`SourceError::Api`] otherwise.
pub async fn check_response(resp: reqwest::Response) -> Result<String, SourceError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(SourceError::Api { status: status.as_u16(), message: body });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(::http::Response::builder().status(status).body(body).unwrap())
    }

    #[tokio::test]
    async fn success_returns_body() {
        let resp = mock_response(200, "hello");
        assert_eq!(check_response(resp).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn non_success_becomes_api_error() {
        let resp = mock_response(503, "down");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, SourceError::Api { status: 503, .. }));
    }
}
