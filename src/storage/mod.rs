mod client;
pub mod types;

pub use client::StorageClient;
pub use types::{Bucket, Object};

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StorageOperations {
    /// Fetch bucket metadata, `None` when the bucket does not exist
    async fn get_bucket(&self, bucket: &str) -> Result<Option<Bucket>>;

    async fn insert_bucket(&self, project_id: &str, bucket: &str) -> Result<Bucket>;

    async fn insert_object(&self, bucket: &str, name: &str, data: Vec<u8>) -> Result<Object>;

    async fn get_object(&self, bucket: &str, name: &str) -> Result<Object>;

    async fn download(&self, media_link: &str) -> Result<Vec<u8>>;
}
