#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for provaudit
//!
//! This crate handles HTTP access to the registry and the source hosting
//! service: a pooled client with per-request timeouts, plus helpers that
//! turn non-success statuses into errors.

mod client;

pub use client::{NetClient, NetConfig};

use provaudit_errors::{Error, NetworkError};
use serde::de::DeserializeOwned;

async fn get_success(client: &NetClient, url: &str) -> Result<reqwest::Response, Error> {
    let response = client.get(url).await?;

    if !response.status().is_success() {
        return Err(NetworkError::HttpError {
            status: response.status().as_u16(),
            message: response.status().to_string(),
        }
        .into());
    }

    Ok(response)
}

/// Fetch binary content from a URL
///
/// # Errors
///
/// Returns an error if the HTTP request fails, the server returns an error status,
/// or the response body cannot be read as bytes.
pub async fn fetch_bytes(client: &NetClient, url: &str) -> Result<Vec<u8>, Error> {
    tracing::debug!(url, "fetching bytes");

    get_success(client, url)
        .await?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| NetworkError::DownloadFailed(e.to_string()).into())
}

/// Fetch and deserialize a JSON document
///
/// # Errors
///
/// Returns an error if the HTTP request fails, the server returns an error status,
/// or the body is not valid JSON for `T`.
pub async fn fetch_json<T: DeserializeOwned>(client: &NetClient, url: &str) -> Result<T, Error> {
    tracing::debug!(url, "fetching json");

    get_success(client, url)
        .await?
        .json::<T>()
        .await
        .map_err(|e| NetworkError::DownloadFailed(e.to_string()).into())
}

/// Join a base URL and path segments with exactly one `/` between parts
#[must_use]
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.trim_matches('/'));
    }
    url
}
