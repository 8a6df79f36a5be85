//! Newline-delimited page envelopes over one long GET.

use super::*;

pub struct PageStream {
    path: String,
    response: reqwest::Response,
    buf: Vec<u8>,
    done: bool,
}

impl ServerCaller {
    /// Opens a stream. Only waiting for the response head is time-limited.
    pub async fn stream(&self, path: &str) -> Result<PageStream, ApplinError> {
        tracing::info!(%path, "GET stream");
        let send = self
            .stream_client
            .get(self.url(path))
            .header(reqwest::header::ACCEPT, APPLIN_RESPONSE)
            .send();
        let response = tokio::time::timeout(self.resource_timeout, send)
            .await
            .map_err(|_| ApplinError::Network(format!("GET stream {}: timed out", path)))?
            .map_err(|e| ApplinError::Network(format!("GET stream {}: {}", path, e)))?;
        let status = response.status();
        let content_type = header_content_type(response.headers()).map(str::to_string);
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(classify_error(path, status, content_type.as_deref(), &body));
        }
        let base = content_type.as_deref().map(content_type_base).unwrap_or_default();
        if base != APPLIN_RESPONSE {
            return Err(ApplinError::server(
                Some(status.as_u16()),
                format!(
                    "server returned non-applin content-type for stream {}: {:?}",
                    path,
                    content_type.unwrap_or_default()
                ),
            ));
        }
        Ok(PageStream {
            path: path.to_string(),
            response,
            buf: Vec::new(),
            done: false,
        })
    }
}

impl PageStream {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next page from the stream, or `None` once the server closed it.
    pub async fn next(&mut self) -> Result<Option<PageSpec>, ApplinError> {
        loop {
            if let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                if line.trim_ascii().is_empty() {
                    continue;
                }
                return decode_envelope(&line).map(Some);
            }
            if self.done {
                if self.buf.trim_ascii().is_empty() {
                    return Ok(None);
                }
                let line = std::mem::take(&mut self.buf);
                return decode_envelope(&line).map(Some);
            }
            match self.response.chunk().await {
                Ok(Some(chunk)) => self.buf.extend_from_slice(&chunk),
                Ok(None) => self.done = true,
                Err(e) => {
                    return Err(ApplinError::Network(format!(
                        "reading stream {}: {}",
                        self.path, e
                    )));
                }
            }
        }
    }
}
