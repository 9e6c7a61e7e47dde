use serde::Serialize;

use crate::model::{Project, Task, TreeNode};
use crate::ops::graph::{GraphEdge, GraphNode, GraphView};
use crate::ops::search::{MatchField, SearchHit};

/// Characters of an id shown in text output
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectJson<'a> {
    #[serde(flatten)]
    pub project: &'a Project,
    pub task_count: usize,
}

#[derive(Serialize)]
pub struct TreeJson<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeJson<'a>>,
}

#[derive(Serialize)]
pub struct LayoutJson<'a> {
    pub nodes: Vec<&'a GraphNode>,
    pub edges: Vec<&'a GraphEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundsJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsJson {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHitJson<'a> {
    pub project_id: &'a str,
    #[serde(flatten)]
    pub hit: &'a SearchHit,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn tree_to_json<'a>(node: &TreeNode<'a>, all: bool) -> TreeJson<'a> {
    let children = if all || node.task.is_expanded {
        node.children.iter().map(|c| tree_to_json(c, all)).collect()
    } else {
        Vec::new()
    };
    TreeJson {
        task: node.task,
        children,
    }
}

pub fn layout_to_json(view: &GraphView) -> LayoutJson<'_> {
    LayoutJson {
        nodes: view.nodes().collect(),
        edges: view.edges().collect(),
        bounds: view.bounds().map(|b| BoundsJson {
            min_x: b.min_x,
            min_y: b.min_y,
            max_x: b.max_x,
            max_y: b.max_y,
        }),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn check_marker(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// One line of `tt projects`
pub fn format_project_line(project: &Project, task_count: usize) -> String {
    let noun = if task_count == 1 { "task" } else { "tasks" };
    format!(
        "{}  {}  {}  {} {}",
        short_id(&project.id),
        project.created_at.format("%Y-%m-%d"),
        project.title,
        task_count,
        noun
    )
}

/// A single task as shown in tree listings (no indentation)
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "{} {}  {}",
        check_marker(task.is_completed),
        task.title,
        short_id(&task.id)
    );
    let (done, total) = task.checklist_progress();
    if total > 0 {
        line.push_str(&format!("  ({done}/{total})"));
    }
    if task.position.is_some() {
        line.push_str("  @pinned");
    }
    line
}

/// Indented tree. Unless `all`, collapsed children are summarized as
/// `+N hidden`.
pub fn format_tree(forest: &[TreeNode<'_>], all: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for root in forest {
        format_tree_node(root, 0, all, &mut lines);
    }
    lines
}

fn format_tree_node(node: &TreeNode<'_>, depth: usize, all: bool, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}{}", format_task_line(node.task));
    let collapsed = !node.task.is_expanded && !node.children.is_empty();
    if collapsed && !all {
        line.push_str(&format!("  +{} hidden", node.size() - 1));
        lines.push(line);
        return;
    }
    lines.push(line);
    for child in &node.children {
        format_tree_node(child, depth + 1, all, lines);
    }
}

/// Text rendering of `tt layout`
pub fn format_layout(view: &GraphView) -> Vec<String> {
    let mut lines = Vec::new();
    for node in view.nodes() {
        let pin = if node.pinned { "pinned" } else { "auto" };
        lines.push(format!(
            "{}{} {}  ({}, {}) {}",
            "  ".repeat(node.depth),
            short_id(&node.id),
            node.title,
            node.position.x,
            node.position.y,
            pin
        ));
    }
    if let Some(b) = view.bounds() {
        lines.push(format!(
            "bounds: ({}, {}) - ({}, {})",
            b.min_x, b.min_y, b.max_x, b.max_y
        ));
    }
    lines
}

pub fn format_search_hit(project: &str, hit: &SearchHit) -> String {
    match hit.field {
        MatchField::Title => format!("{}  {}  {}", project, short_id(&hit.task_id), hit.title),
        MatchField::Checklist => format!(
            "{}  {}  {}  - {}",
            project,
            short_id(&hit.task_id),
            hit.title,
            hit.text
        ),
    }
}
