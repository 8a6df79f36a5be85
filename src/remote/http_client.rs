use super::*;

/// Media type of every page response and structured error.
pub const APPLIN_RESPONSE: &str = "application/vnd.applin_response";

/// `text/plain; charset=utf-8` -> `text/plain`
pub fn content_type_base(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Maps one finished exchange to its outcome.
///
/// `Ok(None)` is the server's "nothing changed" signal: a 2xx with an empty body.
pub fn classify(
    path: &str,
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Option<PageSpec>, ApplinError> {
    if !status.is_success() {
        return Err(classify_error(path, status, content_type, body));
    }
    if body.is_empty() {
        return Ok(None);
    }
    let base = content_type.map(content_type_base).unwrap_or_default();
    if base != APPLIN_RESPONSE {
        return Err(ApplinError::server(
            Some(status.as_u16()),
            format!(
                "server returned non-applin content-type for {}: {:?}",
                path,
                content_type.unwrap_or_default()
            ),
        ));
    }
    decode_envelope(body).map(Some)
}

pub(super) fn decode_envelope(body: &[u8]) -> Result<PageSpec, ApplinError> {
    let envelope: ResponseEnvelope = serde_json::from_slice(body).map_err(processing_error)?;
    PageSpec::from_item(&envelope.page).map_err(processing_error)
}

fn processing_error(err: impl std::fmt::Display) -> ApplinError {
    ApplinError::server(None, format!("error processing server response: {}", err))
}

pub(super) fn classify_error(
    path: &str,
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> ApplinError {
    let base = content_type.map(content_type_base).unwrap_or_default();
    if base == APPLIN_RESPONSE
        && let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body)
    {
        return ApplinError::User(envelope.message);
    }
    let reason = status.canonical_reason().unwrap_or("");
    let message = if base == "text/plain" {
        format!(
            "server returned error for {}: {} {} \"{}\"",
            path,
            status.as_u16(),
            reason,
            String::from_utf8_lossy(body)
        )
    } else {
        format!(
            "server returned error for {}: {} {}, len={} {}",
            path,
            status.as_u16(),
            reason,
            body.len(),
            content_type.unwrap_or("(no content-type)")
        )
    };
    ApplinError::server(Some(status.as_u16()), message)
}

impl ServerCaller {
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends a request and reads the whole body. Only transport failures are errors here.
    pub(super) async fn exchange(
        &self,
        label: &str,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), ApplinError> {
        tracing::info!(%path, "{}", label);
        let resp = req
            .send()
            .await
            .map_err(|e| ApplinError::Network(format!("{} {}: {}", label, path, e)))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApplinError::Network(format!("{} {}: reading body: {}", label, path, e)))?;
        tracing::debug!(%path, status = status.as_u16(), len = body.len(), "response");
        Ok((status, headers, body.to_vec()))
    }
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
