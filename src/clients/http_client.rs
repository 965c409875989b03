use reqwest::Client;
use std::time::Duration;

/// Shared client for calls into the managed backend. Built once at startup.
pub fn new_backend_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Below the backend's keep-alive so stale pooled connections are not reused
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}
