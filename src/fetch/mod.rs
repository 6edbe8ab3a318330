mod api_key;
mod basic;
mod client;

pub use api_key::{ApiKey, ApiKeyError};
pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use serde::de::DeserializeOwned;

/// Issues a GET and decodes the JSON body, failing on non-success statuses.
pub async fn get_json<C: HttpClient, T: DeserializeOwned>(client: &C, url: &str) -> Result<T> {
    let mut req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);
    req.headers_mut().insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let resp = client.execute(req).await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("request to {} failed with status {}: {}", url, status, body);
    }

    Ok(resp.json::<T>().await?)
}
