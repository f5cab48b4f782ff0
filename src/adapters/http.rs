use crate::core::{ConfigProvider, DocumentSource};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("curriculum-etl/", env!("CARGO_PKG_VERSION"));

/// Fetches documents from the study-program service, one blocking round trip at a time.
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.base_url(), config.request_timeout())
    }

    /// Document paths are taken verbatim from earlier payloads and are always relative to the base.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.resolve(path)?;
        tracing::debug!("📡 GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_resolve_joins_relative_and_rooted_paths() {
        let source = HttpSource::new("https://studien.rj.ost.ch/", None).unwrap();

        assert_eq!(
            source.resolve("allStudies/10191_I.json").unwrap().as_str(),
            "https://studien.rj.ost.ch/allStudies/10191_I.json"
        );
        assert_eq!(
            source.resolve("/module/M_AD1.json").unwrap().as_str(),
            "https://studien.rj.ost.ch/module/M_AD1.json"
        );
    }

    #[tokio::test]
    async fn test_fetch_json_success() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/allStudies/10191_I.json");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({"kredits": []}));
            })
            .await;

        let source = HttpSource::new(&server.url("/"), Some(Duration::from_secs(5))).unwrap();
        let document = source.fetch_json("allStudies/10191_I.json").await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(document, serde_json::json!({"kredits": []}));
    }

    #[tokio::test]
    async fn test_fetch_json_non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/module/M_AD1.json");
                then.status(404);
            })
            .await;

        let source = HttpSource::new(&server.url("/"), None).unwrap();
        let result = source.fetch_json("module/M_AD1.json").await;

        api_mock.assert_async().await;
        match result {
            Err(EtlError::HttpStatusError { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/module/M_AD1.json"));
            }
            other => panic!("expected HttpStatusError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_json_invalid_body_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/broken.json");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let source = HttpSource::new(&server.url("/"), None).unwrap();
        assert!(matches!(
            source.fetch_json("broken.json").await,
            Err(EtlError::ApiError(_))
        ));
    }
}
