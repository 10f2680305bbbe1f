//! HTTP requests behind the reachability and search checks.

use std::time::Duration;

use serde::Deserialize;

use super::ProbeError;
use crate::db::{request_url, SearchStatus};

/// Query parameters carried by a search request, keyword last.
const SEARCH_QUERY: [(&str, &str); 1] = [("ac", "videolist")];
const KEYWORD_PARAM: &str = "wd";

/// Check that the endpoint answers with a 2xx status.
pub async fn check_reachable(
    client: &reqwest::Client,
    address: &str,
    timeout: Duration,
) -> Result<(), ProbeError> {
    let response = client
        .get(request_url(address))
        .send()
        .await
        .map_err(|e| map_transport(e, timeout))?;

    ensure_success(&response)
}

/// Issue a search request and decode its JSON payload.
pub async fn fetch_search(
    client: &reqwest::Client,
    address: &str,
    keyword: &str,
    timeout: Duration,
) -> Result<SearchPayload, ProbeError> {
    let response = client
        .get(request_url(address))
        .query(&SEARCH_QUERY)
        .query(&[(KEYWORD_PARAM, keyword)])
        .send()
        .await
        .map_err(|e| map_transport(e, timeout))?;

    ensure_success(&response)?;

    // Decode failures are payload errors; body transfer failures stay transport errors
    response.json::<SearchPayload>().await.map_err(|e| {
        if e.is_decode() {
            ProbeError::Payload(e.to_string())
        } else {
            map_transport(e, timeout)
        }
    })
}

/// Search payload; only the result list matters.
#[derive(Debug, Deserialize)]
pub struct SearchPayload {
    list: Option<Vec<serde_json::Value>>,
}

/// Interpret a decoded search payload.
pub fn classify_search(payload: SearchPayload) -> Result<SearchStatus, ProbeError> {
    match payload.list {
        Some(list) if list.is_empty() => Ok(SearchStatus::NoResults),
        Some(_) => Ok(SearchStatus::Ok),
        None => Err(ProbeError::Payload("missing `list` field".to_string())),
    }
}

fn ensure_success(response: &reqwest::Response) -> Result<(), ProbeError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ProbeError::Status(status.as_u16()))
    }
}

fn map_transport(e: reqwest::Error, timeout: Duration) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout(timeout)
    } else {
        ProbeError::Network(e.to_string())
    }
}
