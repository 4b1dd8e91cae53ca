use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::storage::{Object, StorageOperations};
use indicatif::ProgressStyle;
use std::fs;
use tracing::{Span, info, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TRANSFER_STEPS: u64 = 4;

/// Round trip of the source file through a bucket
pub struct TransferEngine<SC> {
    config: StorageConfig,
    storage_client: SC,
}

impl<SC> TransferEngine<SC>
where
    SC: StorageOperations + Sync,
{
    pub fn new(config: StorageConfig, storage_client: SC) -> Self {
        Self {
            config,
            storage_client,
        }
    }

    /// Ensure the bucket, upload the source file, then download it again.
    /// Returns the downloaded object contents.
    #[instrument(name = "Transfer", skip_all, fields(bucket = %self.config.bucket))]
    pub async fn run(&self) -> Result<Vec<u8>> {
        let span = Span::current();
        span.pb_set_style(
            &ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| AppError::Other(e.into()))?,
        );
        span.pb_set_length(TRANSFER_STEPS);

        span.pb_set_message("Checking bucket");
        self.ensure_bucket().await?;
        span.pb_inc(1);

        span.pb_set_message("Uploading");
        self.upload().await?;
        span.pb_inc(1);

        span.pb_set_message("Fetching metadata");
        let object = self
            .storage_client
            .get_object(&self.config.bucket, &self.config.object_name)
            .await?;
        span.pb_inc(1);

        span.pb_set_message("Downloading");
        let contents = self.download(&object).await?;
        span.pb_inc(1);

        Ok(contents)
    }

    async fn ensure_bucket(&self) -> Result<()> {
        let bucket = &self.config.bucket;

        if self.storage_client.get_bucket(bucket).await?.is_some() {
            info!(bucket = %bucket, "Bucket already exists, skipping create");
            return Ok(());
        }

        let created = self
            .storage_client
            .insert_bucket(&self.config.project_id, bucket)
            .await?;
        info!(
            bucket = %created.name,
            location = created.self_link.as_deref().unwrap_or_default(),
            "Created bucket"
        );

        Ok(())
    }

    async fn upload(&self) -> Result<()> {
        let path = &self.config.source_file;
        let data = fs::read(path).map_err(|source| AppError::ReadFile {
            path: path.clone(),
            source,
        })?;

        let object = self
            .storage_client
            .insert_object(&self.config.bucket, &self.config.object_name, data)
            .await?;
        info!(
            object = %object.name,
            location = object.self_link.as_deref().unwrap_or_default(),
            "Created object"
        );

        Ok(())
    }

    async fn download(&self, object: &Object) -> Result<Vec<u8>> {
        let media_link = object.media_link.as_deref().ok_or_else(|| {
            AppError::Storage(format!(
                "Object {}/{} has no media link",
                object.bucket, object.name
            ))
        })?;

        info!(media_link = media_link, "Downloading media");
        self.storage_client.download(media_link).await
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use crate::storage::Bucket;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    pub(crate) const MEDIA_LINK: &str = "https://storage.test/download/object";

    #[derive(Clone, Default)]
    pub(crate) struct MockStorageClient {
        pub buckets: Arc<Mutex<Vec<Bucket>>>,
        pub objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        pub inserted_buckets: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl MockStorageClient {
        pub(crate) fn with_bucket(name: &str) -> Self {
            let client = Self::default();
            client.buckets.lock().unwrap().push(Bucket {
                name: name.to_string(),
                ..Default::default()
            });
            client
        }
    }

    #[async_trait]
    impl StorageOperations for MockStorageClient {
        async fn get_bucket(&self, bucket: &str) -> Result<Option<Bucket>> {
            let buckets = self.buckets.lock().unwrap();
            Ok(buckets.iter().find(|b| b.name == bucket).cloned())
        }

        async fn insert_bucket(&self, project_id: &str, bucket: &str) -> Result<Bucket> {
            let created = Bucket {
                name: bucket.to_string(),
                self_link: Some(format!("https://storage.test/b/{}", bucket)),
                ..Default::default()
            };
            self.buckets.lock().unwrap().push(created.clone());
            self.inserted_buckets
                .lock()
                .unwrap()
                .push((project_id.to_string(), bucket.to_string()));
            Ok(created)
        }

        async fn insert_object(&self, bucket: &str, name: &str, data: Vec<u8>) -> Result<Object> {
            self.objects.lock().unwrap().insert(name.to_string(), data);
            Ok(Object {
                name: name.to_string(),
                bucket: bucket.to_string(),
                ..Default::default()
            })
        }

        async fn get_object(&self, bucket: &str, name: &str) -> Result<Object> {
            if !self.objects.lock().unwrap().contains_key(name) {
                return Err(AppError::Storage(format!("No such object {}", name)));
            }
            Ok(Object {
                name: name.to_string(),
                bucket: bucket.to_string(),
                media_link: Some(format!("{}/{}", MEDIA_LINK, name)),
                ..Default::default()
            })
        }

        async fn download(&self, media_link: &str) -> Result<Vec<u8>> {
            let name = media_link
                .strip_prefix(&format!("{}/", MEDIA_LINK))
                .ok_or_else(|| AppError::Storage(format!("Unknown media link {}", media_link)))?;
            self.objects
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| AppError::Storage(format!("No such object {}", name)))
        }
    }
}
