/// Account usage reported by the service's `account` endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    pub concurrency_limit: u64,
    pub concurrent_requests: u64,
    pub failed_request_count: u64,
    pub request_count: u64,
    pub request_limit: u64,
}
