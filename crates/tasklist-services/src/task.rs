//! Task records as exchanged with the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single task.
///
/// The identifier is assigned by the remote store and travels as `_id`.
/// Server timestamps are kept so a replaced record stays faithful to the
/// store's representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", alias = "id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(
        rename = "createdAt",
        alias = "created_at",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "updatedAt",
        alias = "updated_at",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed,
            created_at: None,
            updated_at: None,
        }
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Request to create a new task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskCreateRequest {
    pub title: String,
}

/// Request to update an existing task (partial update).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskUpdateRequest {
    /// Change only the completed flag
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Change only the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserialization_with_mongo_fields() {
        let json = r#"{
            "_id": "65f0c2a1e4b0a1b2c3d4e5f6",
            "title": "buy milk",
            "completed": true,
            "user": "65f0c2a1e4b0a1b2c3d4e000",
            "createdAt": "2026-01-30T12:00:00Z",
            "updatedAt": "2026-01-30T12:05:00Z",
            "__v": 0
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "65f0c2a1e4b0a1b2c3d4e5f6");
        assert_eq!(task.title, "buy milk");
        assert!(task.completed);
        assert!(task.updated_at > task.created_at);
    }

    #[test]
    fn test_task_accepts_plain_and_numeric_ids() {
        let task: Task = serde_json::from_str(r#"{"id": 7, "title": "x"}"#).unwrap();
        assert_eq!(task.id, "7");
        assert!(!task.completed);
        assert!(task.created_at.is_none());

        let task: Task = serde_json::from_str(r#"{"id": "abc", "title": "y"}"#).unwrap();
        assert_eq!(task.id, "abc");
    }

    #[test]
    fn test_task_serializes_with_store_id_field() {
        let json = serde_json::to_string(&Task::new("1", "write spec", false)).unwrap();
        assert_eq!(json, r#"{"_id":"1","title":"write spec","completed":false}"#);
    }

    #[test]
    fn test_create_request_serialization() {
        let req = TaskCreateRequest {
            title: "New task".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"title":"New task"}"#);
    }

    #[test]
    fn test_update_request_partial() {
        let json = serde_json::to_string(&TaskUpdateRequest::completed(true)).unwrap();
        assert_eq!(json, r#"{"completed":true}"#);

        let json = serde_json::to_string(&TaskUpdateRequest::title("renamed")).unwrap();
        assert_eq!(json, r#"{"title":"renamed"}"#);
    }
}
