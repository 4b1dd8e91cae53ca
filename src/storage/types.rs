use serde::{Deserialize, Serialize};

// https://cloud.google.com/storage/docs/json_api/v1/buckets#resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// https://cloud.google.com/storage/docs/json_api/v1/objects#resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    pub name: String,
    pub bucket: String,
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub media_link: Option<String>,
    // int64 fields are encoded as JSON strings
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct BucketInsertRequest<'a> {
    pub(super) name: &'a str,
}
