use once_cell::sync::Lazy;
use reqwest::Client;

/// Shared HTTP client with a custom User-Agent so that public data portals
/// don't reject the request. Building the client once avoids the cost of TLS
/// and connection pool setup for every download.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("clustermap/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
});

/// Sends `request` and decodes the JSON body, turning non-success statuses into
/// [`crate::MapError::Http`].
pub(crate) async fn get_json<T>(request: reqwest::RequestBuilder) -> crate::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(crate::MapError::Http {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
