//! Canned lookup tools for calendars and inboxes.

use std::collections::HashMap;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde_json::Value;

use crate::tool::{Tool, ToolError};

/// Input accepted by the lookup tools.
#[derive(Debug, JsonSchema)]
struct PersonQuery {
    /// The name of the person to look up
    person_name: String,
}

impl PersonQuery {
    fn parse(argument: &str) -> Result<Self, ToolError> {
        let person_name = argument.trim();
        if person_name.is_empty() {
            return Err(ToolError::InvalidArguments("person_name is required".to_string()));
        }
        Ok(Self {
            person_name: person_name.to_string(),
        })
    }
}

/// A tool that answers from a fixed table keyed by lower-cased person name.
#[derive(Debug, Clone)]
pub struct LookupTool {
    name: String,
    description: String,
    label: String,
    entries: HashMap<String, String>,
    fallback: String,
}

impl LookupTool {
    /// Creates a lookup tool. `label` prefixes every answer, e.g. `"Calendar for"`.
    pub fn new<'a>(
        name: impl Into<String>,
        description: impl Into<String>,
        label: impl Into<String>,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            label: label.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            fallback: fallback.into(),
        }
    }

    pub fn calendar() -> Self {
        Self::new(
            "calendar",
            "Checks calendar events for a person",
            "Calendar for",
            [
                ("alice", "Meeting with clients at 2pm"),
                ("bob", "Team standup at 10am"),
                ("charlie", "Lunch meeting at 12pm"),
            ],
            "No meetings found",
        )
    }

    pub fn email() -> Self {
        Self::new(
            "email",
            "Searches emails for a person",
            "Emails from",
            [
                ("alice", "Latest email about Q4 planning"),
                ("bob", "Project status update"),
                ("charlie", "Vacation request pending"),
            ],
            "No recent emails",
        )
    }
}

#[async_trait]
impl Tool for LookupTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn argument_name(&self) -> &str {
        "person_name"
    }

    fn parameters_schema(&self) -> Value {
        let mut schema = serde_json::to_value(schemars::schema_for!(PersonQuery))
            .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
            obj.remove("title");
        }
        schema
    }

    async fn execute(&self, argument: &str) -> Result<String, ToolError> {
        let query = PersonQuery::parse(argument)?;
        let entry = self
            .entries
            .get(&query.person_name.to_lowercase())
            .unwrap_or(&self.fallback);
        Ok(format!("{} {}: {}", self.label, query.person_name, entry))
    }
}
