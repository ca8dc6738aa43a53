use reqwest::{Response, StatusCode};
use serde::Deserialize;

/// Error body the Bitmark services answer non-2xx requests with
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("[{code}] {message}")]
    Service {
        status: StatusCode,
        code: i64,
        message: String,
    },
    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: StatusCode, body: String },
    #[error("ledger accepted the request but returned no transaction")]
    NoTransaction,
    #[error("asset response is missing a file name")]
    MissingFileName,
    #[error("encryption key for {0} failed verification")]
    InvalidKey(String),
}

impl ApiError {
    /// Turn a non-2xx response into a service error, keeping the raw body
    /// when it is not the `{code, message}` shape
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ApiError::Transport(e),
        };
        match serde_json::from_str::<ServiceErrorBody>(&body) {
            Ok(error) => ApiError::Service {
                status,
                code: error.code,
                message: error.message,
            },
            Err(_) => ApiError::UnexpectedResponse { status, body },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Service { status, .. } | ApiError::UnexpectedResponse { status, .. } => {
                Some(*status)
            }
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::test_server::TestLedger;

    #[tokio::test]
    async fn test_service_error_body() {
        let ledger = TestLedger::start().await;
        let url = format!("{}/v1/bitmarks/{}", ledger.config().api_url, "00".repeat(32));
        let response = reqwest::get(url).await.unwrap();

        let error = ApiError::from_response(response).await;
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "[1002] bitmark not found");
    }

    #[tokio::test]
    async fn test_unexpected_body_is_kept() {
        let ledger = TestLedger::start().await;
        let url = format!("{}/v3/nowhere", ledger.config().api_url);
        let response = reqwest::get(url).await.unwrap();

        match ApiError::from_response(response).await {
            ApiError::UnexpectedResponse { status, .. } => {
                assert_eq!(status, StatusCode::NOT_FOUND)
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
