use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Generate a fresh record identifier (UUID v4, hyphenated)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A pinned board position (top-left corner of the node, board units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// This position shifted by `dx`, `dy`
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A single checklist entry attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl ChecklistItem {
    pub fn new(title: impl Into<String>) -> Self {
        ChecklistItem {
            id: new_id(),
            title: title.into(),
            is_completed: false,
        }
    }
}

/// A task. Tasks form a forest per project through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    /// `None` for root tasks
    #[serde(default)]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    /// Sibling sort key (ascending)
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_expanded")]
    pub is_expanded: bool,
    /// Overrides automatic layout when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_expanded() -> bool {
    true
}

impl Task {
    /// Create a new task: not completed, expanded, no position, no checklist
    pub fn new(
        project_id: impl Into<String>,
        parent_id: Option<String>,
        title: impl Into<String>,
        order: i64,
    ) -> Self {
        let now = timestamp::now();
        Task {
            id: new_id(),
            project_id: project_id.into(),
            parent_id,
            title: title.into(),
            is_completed: false,
            order,
            is_expanded: true,
            position: None,
            checklist: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Checklist entries (empty slice when the task has no checklist)
    pub fn checklist_items(&self) -> &[ChecklistItem] {
        self.checklist.as_deref().unwrap_or(&[])
    }

    /// `(done, total)` checklist counts
    pub fn checklist_progress(&self) -> (usize, usize) {
        let items = self.checklist_items();
        (items.iter().filter(|i| i.is_completed).count(), items.len())
    }
}

/// A task with its children, as produced by `ops::tree::build_tree`
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<'a> {
    pub task: &'a Task,
    pub children: Vec<TreeNode<'a>>,
}

impl TreeNode<'_> {
    /// Number of nodes in this subtree, including this one
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_task_defaults() {
        let task = Task::new("p1", None, "Write outline", 3);
        assert!(task.is_root());
        assert!(!task.is_completed);
        assert!(task.is_expanded);
        assert_eq!(task.order, 3);
        assert!(task.position.is_none());
        assert!(task.checklist.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let task = Task::new("p1", None, "Bare", 0);
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("position").is_none());
        assert!(json.get("checklist").is_none());
        assert_eq!(json["parentId"], serde_json::Value::Null);
        assert_eq!(json["isExpanded"], true);
    }

    #[test]
    fn reads_minimal_record() {
        let raw = r#"{
            "id": "t1",
            "projectId": "p1",
            "parentId": null,
            "title": "Minimal",
            "createdAt": "2024-06-01T08:30:00.000Z",
            "updatedAt": "2024-06-01T08:30:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.order, 0);
        assert!(task.is_expanded);
        assert!(!task.is_completed);
        assert_eq!(task.checklist_items().len(), 0);
    }

    #[test]
    fn reads_full_record() {
        let raw = r#"{
            "id": "t2",
            "projectId": "p1",
            "parentId": "t1",
            "title": "Full",
            "isCompleted": true,
            "order": 4,
            "isExpanded": false,
            "position": {"x": 12.5, "y": -40},
            "checklist": [
                {"id": "c1", "title": "one", "isCompleted": true},
                {"id": "c2", "title": "two", "isCompleted": false}
            ],
            "createdAt": "2024-06-01T08:30:00.000Z",
            "updatedAt": "2024-06-03T08:30:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.parent_id.as_deref(), Some("t1"));
        assert_eq!(task.position, Some(Position::new(12.5, -40.0)));
        assert_eq!(task.checklist_progress(), (1, 2));
    }

    #[test]
    fn checklist_items_get_distinct_ids() {
        let a = ChecklistItem::new("a");
        let b = ChecklistItem::new("a");
        assert_ne!(a.id, b.id);
    }
}
