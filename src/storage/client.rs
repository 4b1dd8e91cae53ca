use super::StorageOperations;
use super::types::{Bucket, BucketInsertRequest, Object};
use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::instrument;
use url::Url;

pub struct StorageClient {
    client: Client,
    access_token: String,
    api_base_url: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig, client: Client, access_token: String) -> Self {
        Self {
            client,
            access_token,
            api_base_url: config.api_base_url.clone(),
        }
    }

    /// Build a URL under the API base, encoding each segment on its own
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base_url)
            .map_err(|e| AppError::Config(format!("Invalid storage API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("Storage API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Storage(format!(
            "Failed to {}: {} - {}",
            action, status, body
        )))
    }
}

#[async_trait]
impl StorageOperations for StorageClient {
    #[instrument(name = "Fetching bucket", skip(self))]
    async fn get_bucket(&self, bucket: &str) -> Result<Option<Bucket>> {
        let url = self.endpoint(&["storage", "v1", "b", bucket])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response, "get bucket").await?;
        Ok(Some(response.json().await?))
    }

    #[instrument(name = "Creating bucket", skip(self))]
    async fn insert_bucket(&self, project_id: &str, bucket: &str) -> Result<Bucket> {
        let url = self.endpoint(&["storage", "v1", "b"])?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .query(&[("project", project_id)])
            .json(&BucketInsertRequest { name: bucket })
            .send()
            .await?;

        let response = Self::check(response, "create bucket").await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Uploading object", skip(self, data), fields(bytes = data.len()))]
    async fn insert_object(&self, bucket: &str, name: &str, data: Vec<u8>) -> Result<Object> {
        let url = self.endpoint(&["upload", "storage", "v1", "b", bucket, "o"])?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "media"), ("name", name)])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;

        let response = Self::check(response, "insert object").await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Fetching object metadata", skip(self))]
    async fn get_object(&self, bucket: &str, name: &str) -> Result<Object> {
        let url = self.endpoint(&["storage", "v1", "b", bucket, "o", name])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::check(response, &format!("get {}/{}", bucket, name)).await?;
        Ok(response.json().await?)
    }

    #[instrument(name = "Downloading object", skip(self))]
    async fn download(&self, media_link: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(media_link)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let response = Self::check(response, "download object").await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeServer, http_client};

    fn client(base_url: &str) -> StorageClient {
        let config = StorageConfig {
            api_base_url: base_url.to_string(),
            ..Default::default()
        };
        StorageClient::new(&config, http_client(), "token-abc".to_string())
    }

    #[tokio::test]
    async fn test_get_bucket_not_found() {
        let server = FakeServer::start(vec![(404, r#"{"error": {"code": 404}}"#)]);

        let bucket = client(&server.base_url).get_bucket("words").await.unwrap();

        let requests = server.finish();
        assert_eq!(bucket, None);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "/storage/v1/b/words");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer token-abc"));
    }

    #[tokio::test]
    async fn test_get_bucket_forbidden_is_error() {
        let server = FakeServer::start(vec![(403, r#"{"error": {"code": 403}}"#)]);

        let result = client(&server.base_url).get_bucket("words").await;
        server.finish();

        assert!(matches!(result, Err(AppError::Storage(msg)) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_insert_bucket() {
        let server = FakeServer::start(vec![(
            200,
            r#"{"name": "words", "selfLink": "https://example.test/b/words"}"#,
        )]);

        let bucket = client(&server.base_url)
            .insert_bucket("my-project", "words")
            .await
            .unwrap();

        let requests = server.finish();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "/storage/v1/b?project=my-project");
        assert_eq!(requests[0].body, r#"{"name":"words"}"#);
        assert_eq!(bucket.name, "words");
        assert_eq!(
            bucket.self_link.as_deref(),
            Some("https://example.test/b/words")
        );
    }

    #[tokio::test]
    async fn test_insert_object_uploads_media() {
        let server = FakeServer::start(vec![(
            200,
            r#"{"name": "english-dictionary", "bucket": "words", "size": "12"}"#,
        )]);

        let object = client(&server.base_url)
            .insert_object("words", "english-dictionary", b"apple\nbanana".to_vec())
            .await
            .unwrap();

        let requests = server.finish();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].url,
            "/upload/storage/v1/b/words/o?uploadType=media&name=english-dictionary"
        );
        assert_eq!(requests[0].body, "apple\nbanana");
        assert_eq!(object.size.as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_get_object_encodes_name() {
        let server = FakeServer::start(vec![(
            200,
            r#"{"name": "dict/en us", "bucket": "words", "mediaLink": "http://example.test/media"}"#,
        )]);

        let object = client(&server.base_url)
            .get_object("words", "dict/en us")
            .await
            .unwrap();

        let requests = server.finish();
        assert_eq!(requests[0].url, "/storage/v1/b/words/o/dict%2Fen%20us");
        assert_eq!(
            object.media_link.as_deref(),
            Some("http://example.test/media")
        );
    }

    #[tokio::test]
    async fn test_download() {
        let server = FakeServer::start(vec![(200, "apple\nbanana")]);
        let media_link = format!("{}/download/words?alt=media", server.base_url);

        let contents = client(&server.base_url)
            .download(&media_link)
            .await
            .unwrap();

        let requests = server.finish();
        assert_eq!(requests[0].url, "/download/words?alt=media");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer token-abc"));
        assert_eq!(contents, b"apple\nbanana");
    }
}
