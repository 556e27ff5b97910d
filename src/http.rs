use std::time::Duration;

use log::warn;
use reqwest::Client;

use crate::error::FetchError;

/// Build an HTTP client, retrying without system proxy discovery when that fails.
pub fn build_http_client(timeout: Duration) -> Result<Client, FetchError> {
    let user_agent = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

    if cfg!(test) {
        return Ok(Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .no_proxy()
            .build()?);
    }

    match Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
    {
        Ok(client) => Ok(client),
        Err(e) => {
            warn!("HTTP client build failed ({}); retrying with proxy discovery disabled", e);
            Ok(Client::builder()
                .timeout(timeout)
                .user_agent(user_agent)
                .no_proxy()
                .build()?)
        }
    }
}
