use serde::Deserialize;

use crate::{AccountInfo, Result, ScraperError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub concurrency_limit: u64,
    pub concurrent_requests: u64,
    pub failed_request_count: u64,
    pub request_count: u64,
    // The service sends this one as a string.
    pub request_limit: String,
}

pub fn decode_account(body: &str) -> Result<AccountInfo> {
    let wire = serde_json::from_str::<AccountResponse>(body).map_err(|err| {
        ScraperError::Decode(format!("invalid account response JSON: {err}; body: {body}"))
    })?;
    let request_limit = wire.request_limit.trim().parse::<u64>().map_err(|_| {
        ScraperError::Decode(format!(
            "requestLimit must be an integer string, got '{}'",
            wire.request_limit
        ))
    })?;

    Ok(AccountInfo {
        concurrency_limit: wire.concurrency_limit,
        concurrent_requests: wire.concurrent_requests,
        failed_request_count: wire.failed_request_count,
        request_count: wire.request_count,
        request_limit,
    })
}
