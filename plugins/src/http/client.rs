use std::collections::HashMap;
use std::time::Duration;

use encoding_rs::Encoding;
use nekobend_core::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::encoding::{decode_body, resolve_encodings};
use super::error::HttpError;

const BODY_PREVIEW_LIMIT: usize = 512;

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().nth(BODY_PREVIEW_LIMIT).is_some() {
        out.push_str("...");
    }
    out
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let key = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::header_error(name, e))?;
        let val = HeaderValue::from_str(value).map_err(|e| HttpError::header_error(name, e))?;
        map.insert(key, val);
    }
    Ok(map)
}

/// Small JSON-over-HTTP helper.
///
/// `get`/`post` log failures and return `None`, so call sites can branch without
/// error plumbing. `try_get`/`try_post` expose the error instead.
#[derive(Clone)]
pub struct HttpHelper {
    http: reqwest::Client,
    encodings: Vec<&'static Encoding>,
}

impl HttpHelper {
    pub fn new(cfg: &HttpConfig) -> anyhow::Result<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_millis(cfg.timeout_ms));
        if let Some(ua) = cfg.user_agent.as_deref().filter(|s| !s.trim().is_empty()) {
            builder = builder.user_agent(ua);
        }
        Ok(Self {
            http: builder.build()?,
            encodings: resolve_encodings(&cfg.encodings),
        })
    }

    pub async fn get(&self, url: &str, headers: &HashMap<String, String>) -> Option<String> {
        report(self.try_get(url, headers).await)
    }

    pub async fn post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &Value,
    ) -> Option<String> {
        report(self.try_post(url, headers, body).await)
    }

    /// Declared for parity with `get`/`post`; always `None`.
    pub async fn put(
        &self,
        url: &str,
        _headers: &HashMap<String, String>,
        _body: &Value,
    ) -> Option<String> {
        tracing::warn!(method = "PUT", url = %url, "method not implemented");
        None
    }

    /// Declared for parity with `get`/`post`; always `None`.
    pub async fn delete(&self, url: &str, _headers: &HashMap<String, String>) -> Option<String> {
        tracing::warn!(method = "DELETE", url = %url, "method not implemented");
        None
    }

    pub async fn try_get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<String, HttpError> {
        tracing::debug!(stage = "http.get.in", url = %url, headers = headers.len());
        let req = self.http.get(url).headers(header_map(headers)?);
        self.send(req, url).await
    }

    pub async fn try_post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &Value,
    ) -> Result<String, HttpError> {
        tracing::debug!(stage = "http.post.in", url = %url, headers = headers.len());
        let req = self.http.post(url).headers(header_map(headers)?).json(body);
        self.send(req, url).await
    }

    async fn send(&self, req: reqwest::RequestBuilder, url: &str) -> Result<String, HttpError> {
        let resp = req
            .send()
            .await
            .map_err(|err| HttpError::from_reqwest(err, url))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| HttpError::from_reqwest(err, url))?;
        let body = decode_body(&bytes, &self.encodings);

        if !status.is_success() {
            return Err(HttpError::status_error(status.as_u16(), url, preview_body(&body)));
        }

        tracing::debug!(stage = "http.out", url = %url, status = %status, bytes = bytes.len());
        Ok(body)
    }
}

fn report(res: Result<String, HttpError>) -> Option<String> {
    match res {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::error!(error.kind = %e.kind(), status = ?e.status(), "Error: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn helper() -> HttpHelper {
        HttpHelper::new(&HttpConfig {
            timeout_ms: 5_000,
            ..HttpConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn get_returns_body_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/item")
            .match_header("x-token", "abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"x":1}"#)
            .create_async()
            .await;

        let headers = HashMap::from([("X-Token".to_string(), "abc".to_string())]);
        let body = helper()
            .get(&format!("{}/item", server.url()), &headers)
            .await;

        mock.assert_async().await;
        assert_eq!(body.as_deref(), Some(r#"{"x":1}"#));
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/items")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({"name": "ねこ"})))
            .with_status(201)
            .with_body(r#"{"id":7}"#)
            .create_async()
            .await;

        let body = helper()
            .post(
                &format!("{}/items", server.url()),
                &HashMap::new(),
                &json!({"name": "ねこ"}),
            )
            .await;

        mock.assert_async().await;
        assert_eq!(body.as_deref(), Some(r#"{"id":7}"#));
    }

    #[tokio::test]
    async fn failure_status_yields_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/broken")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let url = format!("{}/broken", server.url());
        assert_eq!(helper().get(&url, &HashMap::new()).await, None);

        let err = helper().try_get(&url, &HashMap::new()).await.unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::Status);
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn shift_jis_body_is_decoded() {
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode("こんにちは");
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/sjis")
            .with_body(bytes.into_owned())
            .create_async()
            .await;

        let body = helper()
            .get(&format!("{}/sjis", server.url()), &HashMap::new())
            .await;
        assert_eq!(body.as_deref(), Some("こんにちは"));
    }

    #[tokio::test]
    async fn bad_header_is_reported_not_sent() {
        let headers = HashMap::from([("bad header".to_string(), "v".to_string())]);
        let err = helper()
            .try_get("http://127.0.0.1:9/never", &headers)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::Header);
    }

    #[tokio::test]
    async fn put_and_delete_are_not_implemented() {
        let h = helper();
        assert_eq!(h.put("http://127.0.0.1:9/x", &HashMap::new(), &json!({})).await, None);
        assert_eq!(h.delete("http://127.0.0.1:9/x", &HashMap::new()).await, None);
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
        let p = preview_body(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.len(), BODY_PREVIEW_LIMIT + 3);
        assert_eq!(preview_body("  "), "<empty body>");
    }
}
