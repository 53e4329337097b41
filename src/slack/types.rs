//! Wire shapes for the parts of a thread the archiver consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message from `conversations.replies`, in service order.
///
/// Only the fields the pipeline reads are typed. Everything else the API
/// sends rides along in `extra`, so the raw data file keeps the full record
/// the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub ts: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// The wire calls these `files`; plain replies omit the field entirely.
    #[serde(default, rename = "files", skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One file entry attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, rename = "mimetype", skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    /// Download URL; fetching it needs the same bearer token as the API.
    #[serde(default, rename = "url_private", skip_serializing_if = "String::is_empty")]
    pub source_url: String,
    #[serde(default, rename = "name", skip_serializing_if = "String::is_empty")]
    pub original_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
