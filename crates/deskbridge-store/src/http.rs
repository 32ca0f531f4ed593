use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};

/// ## Summary
/// Sends a request and decodes a JSON body, turning non-2xx responses into `StoreError::Status`.
///
/// ## Errors
/// Returns an error if the transport fails, the status is not a success, or the body does not decode.
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> StoreResult<T> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(service, status = status.as_u16(), body = %body, "Request rejected");
        return Err(StoreError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// ## Summary
/// Parses `base` and appends `segments` as individually escaped path segments.
///
/// ## Errors
/// Returns `StoreError::InvalidUrl` if `base` is not an absolute URL that can carry a path.
pub(crate) fn join_segments<I, S>(base: &str, segments: I) -> StoreResult<reqwest::Url>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url =
        reqwest::Url::parse(base).map_err(|e| StoreError::InvalidUrl(format!("{base}: {e}")))?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(format!("{base}: cannot be a base")))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment.as_ref());
        }
    }

    Ok(url)
}
