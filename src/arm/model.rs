//! ARM wire models (resource groups, resources, locations, tags).
//!
//! Only the fields the shell reads are modelled; everything else in the
//! provider payloads is ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag name -> tag value. Ordered so rendering and log lines are stable.
pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
}

impl ResourceGroup {
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

/// A resource inside a group, as returned with `$expand=createdTime,changedTime`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericResource {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub changed_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body of `GET {scope}/providers/Microsoft.Resources/tags/default`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagsResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: Option<TagsProperties>,
}

impl TagsResource {
    pub fn into_tags(self) -> Tags {
        self.properties.and_then(|p| p.tags).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TagsProperties {
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TagsOperation {
    Merge,
    Delete,
}

impl fmt::Display for TagsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TagsOperation::Merge => "Merge",
            TagsOperation::Delete => "Delete",
        };
        f.write_str(s)
    }
}

/// Body of `PATCH {scope}/providers/Microsoft.Resources/tags/default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagsPatch {
    pub operation: TagsOperation,
    pub properties: TagsProperties,
}

impl TagsPatch {
    pub fn new(operation: TagsOperation, tags: Tags) -> Self {
        Self {
            operation,
            properties: TagsProperties { tags: Some(tags) },
        }
    }

    pub fn tags(&self) -> &Tags {
        static EMPTY: Tags = BTreeMap::new();
        self.properties.tags.as_ref().unwrap_or(&EMPTY)
    }
}

/// One page of a list response; `nextLink` points at the following page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Status document served at an `Azure-AsyncOperation` URL.
#[derive(Debug, Deserialize)]
pub(crate) struct AsyncOperationStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}
