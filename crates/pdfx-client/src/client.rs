//! The extraction client: multipart `/extract` requests and the `/health` probe.

use std::path::Path;
use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::multipart::Form;

use crate::transport::Transport;
use crate::url::join_url;
use crate::{ClientConfig, ConvertOptions, ExtractError, ExtractionResult, Payload};

const EXTRACT_ENDPOINT: &str = "extract";
const HEALTH_ENDPOINT: &str = "health";

/// Client for a single extraction service instance.
///
/// Holds no per-call state. It is as safe to share across tasks as the
/// transport it was given; the default `reqwest::Client` is.
#[derive(Clone)]
pub struct ExtractionClient {
    base_url: String,
    /// Builds requests (URL, headers, multipart body).
    http: reqwest::Client,
    /// Sends them.
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ExtractionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ExtractionClient {
    /// Create a client using a default `reqwest::Client` as transport.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Create a client that builds and sends requests with `client`.
    pub fn with_http_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            transport: Arc::new(client.clone()),
            http: client,
        }
    }

    /// Build the default transport from `config` (timeouts, user agent).
    pub fn from_config(config: &ClientConfig) -> Result<Self, ExtractError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        Ok(Self::with_http_client(
            config.base_url.clone(),
            builder.build()?,
        ))
    }

    /// Replace the transport while keeping the request builder.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a PDF for extraction.
    ///
    /// Sends one multipart `POST {base_url}/extract` and returns the body of a
    /// 200 response as a stream. Any other status becomes
    /// [`ExtractError::Response`] with the body as diagnostic text. Nothing is
    /// retried.
    ///
    /// Invalid options and unreadable local files are reported before anything
    /// is sent.
    pub async fn extract(
        &self,
        payload: impl Into<Payload>,
        options: &ConvertOptions,
    ) -> Result<ExtractionResult, ExtractError> {
        options.validate()?;
        let payload: Payload = payload.into();
        let file_part = payload.into_part().await?;

        let form = options
            .form_fields()
            .into_iter()
            .fold(Form::new().part("file", file_part), |form, (name, value)| {
                form.text(name, value)
            });

        let url = join_url(&self.base_url, EXTRACT_ENDPOINT);
        let request = self.http.post(&url).multipart(form).build()?;

        tracing::debug!(
            url = %url,
            format = %options.format(),
            first_page = options.first_page().get(),
            last_page = ?options.last_page().map(|p| p.get()),
            "sending extraction request"
        );

        let response = self.transport.execute(request).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        status = status.as_u16(),
                        error = %e,
                        "could not read error body"
                    );
                    format!("<body unreadable: {e}>")
                }
            };
            tracing::warn!(url = %url, status = status.as_u16(), "extraction request failed");
            return Err(ExtractError::Response {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ExtractionResult::new(response))
    }

    /// Convenience for [`extract`](Self::extract) with a local file.
    pub async fn extract_file(
        &self,
        path: impl AsRef<Path>,
        options: &ConvertOptions,
    ) -> Result<ExtractionResult, ExtractError> {
        self.extract(Payload::path(path), options).await
    }

    /// Probe `GET {base_url}/health`.
    ///
    /// Healthy means HTTP 200 with a JSON body whose `status` is `"up"`.
    /// Every failure, including transport errors, is reported as `false`.
    pub async fn check_service_health(&self) -> bool {
        let url = join_url(&self.base_url, HEALTH_ENDPOINT);

        let request = match self.http.get(&url).build() {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "health probe: invalid request");
                return false;
            }
        };

        let response = match self.transport.execute(request).await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "health probe: transport error");
                return false;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(url = %url, status = response.status().as_u16(), "health probe: unexpected status");
            return false;
        }

        let data: serde_json::Value = match response.json().await {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "health probe: body is not JSON");
                return false;
            }
        };

        data["status"].as_str() == Some("up")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;
    use crate::mock::{MockResponse, MockTransport};
    use std::num::NonZeroU32;

    fn client_with(mock: &Arc<MockTransport>) -> ExtractionClient {
        ExtractionClient::new("http://localhost:3000/").with_transport(mock.clone())
    }

    #[tokio::test]
    async fn extract_posts_multipart_to_extract_endpoint() {
        let mock = Arc::new(MockTransport::new(MockResponse::ok("Hello from page one")));
        let client = client_with(&mock);

        let result = client
            .extract(b"%PDF-1.4 test".to_vec(), &ConvertOptions::default())
            .await
            .unwrap();
        assert_eq!(result.text().await.unwrap(), "Hello from page one");

        assert_eq!(mock.call_count(), 1);
        let req = &mock.requests()[0];
        assert_eq!(req.method, reqwest::Method::POST);
        assert_eq!(req.url, "http://localhost:3000/extract");
        let content_type = req.content_type.as_deref().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[tokio::test]
    async fn extract_non_200_is_response_error() {
        let mock = Arc::new(MockTransport::new(MockResponse::status(500, "internal error")));
        let client = client_with(&mock);

        let err = client
            .extract(b"%PDF-1.4".to_vec(), &ConvertOptions::default())
            .await
            .unwrap_err();
        match err {
            ExtractError::Response { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected Response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn extract_error_body_cut_off_keeps_status() {
        let mock = Arc::new(MockTransport::new(MockResponse::BrokenBody {
            status: 500,
            prefix: "internal",
        }));

        let err = client_with(&mock)
            .extract(b"%PDF".to_vec(), &ConvertOptions::default())
            .await
            .unwrap_err();
        match err {
            ExtractError::Response { status, body } => {
                assert_eq!(status, 500);
                assert!(body.starts_with("<body unreadable"), "got {body:?}");
            }
            other => panic!("expected Response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn extract_other_2xx_is_still_an_error() {
        let mock = Arc::new(MockTransport::new(MockResponse::status(202, "queued")));
        let err = client_with(&mock)
            .extract(b"%PDF".to_vec(), &ConvertOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(202));
    }

    #[tokio::test]
    async fn extract_missing_file_makes_no_call() {
        let mock = Arc::new(MockTransport::new(MockResponse::ok("unused")));
        let client = client_with(&mock);
        let path = std::env::temp_dir().join("pdfx_client_test_missing.pdf");
        let _ = std::fs::remove_file(&path);

        let err = client
            .extract_file(&path, &ConvertOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::LocalFile { .. }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn extract_invalid_range_makes_no_call() {
        let mock = Arc::new(MockTransport::new(MockResponse::ok("unused")));
        let options = ConvertOptions::default()
            .with_first_page(NonZeroU32::new(3).unwrap())
            .with_last_page(NonZeroU32::new(1).unwrap());

        let err = client_with(&mock)
            .extract(b"%PDF".to_vec(), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidOptions(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn extract_json_then_decode() {
        let mock = Arc::new(MockTransport::new(MockResponse::ok(
            r#"{"meta":{"pages":1},"pages":[{"number":1,"text":"hi"}]}"#,
        )));
        let options = ConvertOptions::default().with_format(Format::Json);

        let doc = client_with(&mock)
            .extract(b"%PDF".to_vec(), &options)
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(doc["meta"]["pages"], 1);
        assert_eq!(doc["pages"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn extract_text_body_fails_json_decode() {
        let mock = Arc::new(MockTransport::new(MockResponse::ok("not json")));
        let err = client_with(&mock)
            .extract(b"%PDF".to_vec(), &ConvertOptions::default())
            .await
            .unwrap()
            .json()
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::JsonDecode(_)));
    }

    #[tokio::test]
    async fn health_up() {
        let mock = Arc::new(MockTransport::new(MockResponse::ok(r#"{"status":"up"}"#)));
        let client = client_with(&mock);
        assert!(client.check_service_health().await);

        let req = &mock.requests()[0];
        assert_eq!(req.method, reqwest::Method::GET);
        assert_eq!(req.url, "http://localhost:3000/health");
    }

    #[tokio::test]
    async fn health_false_cases() {
        let mock = Arc::new(MockTransport::with_sequence(vec![
            MockResponse::ok(r#"{"status":"down"}"#),
            MockResponse::ok("<html>It works!</html>"),
            MockResponse::ok(r#"{"healthy":true}"#),
            MockResponse::ok(r#"{"status":1}"#),
            MockResponse::status(503, r#"{"status":"up"}"#),
        ]));
        let client = client_with(&mock);
        for _ in 0..5 {
            assert!(!client.check_service_health().await);
        }
        assert_eq!(mock.call_count(), 5);
    }

    #[test]
    fn from_config_keeps_base_url() {
        let config = ClientConfig {
            base_url: "http://extractor:9000".into(),
            timeout: Some(std::time::Duration::from_secs(5)),
            ..Default::default()
        };
        let client = ExtractionClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://extractor:9000");
    }
}
