use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::error::LedgerError;

const USER_AGENT: &str = concat!("taproot-sweeper/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with a per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, LedgerError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| LedgerError::Http(format!("build http client: {e}")))
}

/// Pass successful responses through; turn the rest into typed errors.
///
/// 404 becomes `NotFound`, other 4xx (except 429) become `Rejected` with the
/// service's message, everything else keeps its status code.
pub(crate) async fn check_status(resp: Response) -> Result<Response, LedgerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    Err(classify_status(status, &url, body.trim()))
}

fn classify_status(status: StatusCode, url: &str, body: &str) -> LedgerError {
    if status == StatusCode::NOT_FOUND {
        LedgerError::NotFound(url.to_string())
    } else if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        LedgerError::Rejected(if body.is_empty() {
            status.to_string()
        } else {
            body.to_string()
        })
    } else {
        LedgerError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }
    }
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{}", path.trim_start_matches('/'))
    }
}
