//! Page fetches, RPC posts and uploads.

use super::*;

impl ServerCaller {
    /// GET the page at `path`, or POST `vars` to it when there are any.
    ///
    /// `Ok(None)` means the server had nothing new.
    pub async fn fetch(
        &self,
        path: &str,
        vars: &[(String, Var)],
    ) -> Result<Option<PageUpdate>, ApplinError> {
        let url = self.url(path);
        let (label, req) = if vars.is_empty() {
            ("GET", self.client.get(&url))
        } else {
            let body: serde_json::Map<String, serde_json::Value> = vars
                .iter()
                .map(|(name, var)| {
                    let value = match var {
                        Var::Bool(b) => serde_json::Value::Bool(*b),
                        Var::String(s) => serde_json::Value::String(s.clone()),
                    };
                    (name.clone(), value)
                })
                .collect();
            tracing::debug!(%path, body = %serde_json::Value::Object(body.clone()), "request body");
            ("POST", self.client.post(&url).json(&body))
        };
        let req = req.header(reqwest::header::ACCEPT, APPLIN_RESPONSE);
        let (status, headers, body) = self.exchange(label, path, req).await?;
        let fetched_at = OffsetDateTime::now_utc();
        let spec = classify(path, status, header_content_type(&headers), &body)?;
        Ok(spec.map(|spec| PageUpdate {
            spec,
            meta: CacheMeta::from_headers(&headers, fetched_at),
        }))
    }

    /// PUT raw bytes. Success is any 2xx; the body is not read as a page.
    pub async fn upload(&self, path: &str, body: UploadBody) -> Result<(), ApplinError> {
        let req = self
            .client
            .put(self.url(path))
            .header(CONTENT_TYPE, body.content_type)
            .body(body.data);
        let (status, headers, resp_body) = self.exchange("PUT", path, req).await?;
        if status.is_success() {
            return Ok(());
        }
        Err(classify_error(
            path,
            status,
            header_content_type(&headers),
            &resp_body,
        ))
    }
}
