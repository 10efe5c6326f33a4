//! ANS resource event payload

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceKitError};

/// Severity of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational, no action needed
    #[default]
    Info,
    /// Normal but significant condition
    Notice,
    /// Something may need attention soon
    Warning,
    /// An operation failed
    Error,
    /// The resource is unusable
    Fatal,
}

/// Category of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Plain notification
    #[default]
    Notification,
    /// Condition that requires a reaction
    Alert,
    /// Unexpected failure
    Exception,
}

/// The resource an event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Name of the affected resource, e.g. an application name
    pub resource_name: String,
    /// Kind of resource, e.g. `app`
    pub resource_type: String,
    /// Free-form resource tags; omitted from the JSON when empty
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// An event posted to the ANS producer API.
///
/// # Examples
///
/// ```
/// use servicekit::ans::{Category, Event, Severity};
///
/// let event = Event::new("Build failed", "Pipeline step 'scan' failed")
///     .with_resource("web-shop", "app")
///     .with_severity(Severity::Error)
///     .with_category(Category::Alert)
///     .with_tag("ans:correlationId", "30118");
///
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["severity"], "ERROR");
/// assert_eq!(json["resource"]["resourceName"], "web-shop");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unix timestamp in seconds
    pub event_timestamp: i64,
    /// Resource the event is about
    pub resource: Resource,
    /// Event severity; `INFO` when absent
    #[serde(default)]
    pub severity: Severity,
    /// Event category; `NOTIFICATION` when absent
    #[serde(default)]
    pub category: Category,
    /// Short summary line
    pub subject: String,
    /// Full event text
    pub body: String,
    /// Event tags such as `ans:correlationId`; omitted from the JSON when empty
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Event {
    /// Creates an `INFO`/`NOTIFICATION` event stamped with the current time.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            event_timestamp: chrono::Utc::now().timestamp(),
            resource: Resource::default(),
            severity: Severity::default(),
            category: Category::default(),
            subject: subject.into(),
            body: body.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Parses an event from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::Config`] if the JSON does not describe an
    /// event.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ServiceKitError::Config(format!("invalid ANS event: {}", e)).into())
    }

    /// Sets the resource name and type.
    pub fn with_resource(
        mut self,
        resource_name: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        self.resource.resource_name = resource_name.into();
        self.resource.resource_type = resource_type.into();
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Adds or replaces an event tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Overrides the Unix timestamp (seconds).
    pub fn with_timestamp(mut self, event_timestamp: i64) -> Self {
        self.event_timestamp = event_timestamp;
        self
    }
}
