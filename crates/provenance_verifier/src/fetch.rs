// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use reqwest::header::ACCEPT;
use tracing::debug;

use crate::error::FetchError;

/// Fetches provenance bytes from a `file://` URI, an `http(s)://` URI, or a bare path.
///
/// HTTP responses must be successful; their body is returned verbatim.
pub async fn fetch_provenance(uri: &str, client: &reqwest::Client) -> Result<Vec<u8>, FetchError> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        debug!(uri, "fetching provenance over HTTP");
        let http_err = |source| FetchError::Http {
            uri: uri.to_string(),
            source,
        };
        let response = client
            .get(uri)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;
        let bytes = response.bytes().await.map_err(http_err)?;
        return Ok(bytes.to_vec());
    }

    let path = match uri.strip_prefix("file://") {
        Some(path) => PathBuf::from(path),
        None if uri.contains("://") => return Err(FetchError::UnsupportedScheme(uri.to_string())),
        None => PathBuf::from(uri),
    };
    debug!(path = %path.display(), "reading provenance file");
    tokio::fs::read(&path)
        .await
        .map_err(|source| FetchError::Io { path, source })
}

/// Fetches every URI concurrently. Results are in input order.
pub async fn fetch_provenances(uris: &[String]) -> Vec<Result<Vec<u8>, FetchError>> {
    let client = reqwest::Client::new();
    let fetches = uris.iter().map(|uri| fetch_provenance(uri, &client));
    futures::future::join_all(fetches).await
}
