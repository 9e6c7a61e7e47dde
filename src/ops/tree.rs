//! Tree operations over the flat parent-pointer task list.
//!
//! Storage keeps tasks as a flat list where each task names its parent. These
//! helpers rebuild the forest, walk subtrees, and answer the structural
//! questions the store and the board ask. All of them tolerate dangling
//! parent ids and parent-pointer cycles.

use std::collections::{HashMap, HashSet};

use crate::model::{Task, TreeNode};

/// Build the nested forest from a flat task list.
///
/// - Tasks without a parent, or whose parent is not in `tasks`, are roots.
/// - Siblings are sorted ascending by `order`; ties keep input order.
/// - Tasks caught in a parent cycle are unreachable from any root; for each
///   such loop the member that comes first in input order is promoted to a
///   root, so every task appears exactly once and tasks hanging off the loop
///   keep their parent.
pub fn build_tree(tasks: &[Task]) -> Vec<TreeNode<'_>> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut children: HashMap<&str, Vec<&Task>> = HashMap::new();
    let mut roots: Vec<&Task> = Vec::new();
    for task in tasks {
        match task.parent_id.as_deref() {
            Some(parent) if by_id.contains_key(parent) && parent != task.id => {
                children.entry(parent).or_default().push(task)
            }
            _ => roots.push(task),
        }
    }
    for list in children.values_mut() {
        list.sort_by_key(|t| t.order);
    }

    // Cycle rescue: walk from the roots, then promote unreached tasks.
    let mut reached: HashSet<&str> = HashSet::new();
    for root in &roots {
        mark_reached(root, &children, &mut reached);
    }
    let position: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();
    for task in tasks {
        if !reached.contains(task.id.as_str()) {
            let member = cycle_member(task, &by_id, &position);
            roots.push(member);
            mark_reached(member, &children, &mut reached);
        }
    }
    roots.sort_by_key(|t| t.order);

    let mut placed = HashSet::new();
    roots
        .into_iter()
        .filter_map(|root| build_node(root, &children, &mut placed))
        .collect()
}

/// The cycle member to promote for an unreached task: follow parent ids up
/// from `task` until one repeats, then pick the member of that loop that
/// comes first in input order. Every ancestor of an unreached task is itself
/// unreached, so the walk always ends in a loop.
fn cycle_member<'a>(
    task: &'a Task,
    by_id: &HashMap<&str, &'a Task>,
    position: &HashMap<&str, usize>,
) -> &'a Task {
    let mut path: Vec<&'a Task> = Vec::new();
    let mut current = task;
    loop {
        if let Some(start) = path.iter().position(|t| t.id == current.id) {
            return path[start..]
                .iter()
                .copied()
                .min_by_key(|t| position.get(t.id.as_str()).copied().unwrap_or(usize::MAX))
                .unwrap_or(task);
        }
        path.push(current);
        match current.parent_id.as_deref().and_then(|p| by_id.get(p).copied()) {
            Some(parent) => current = parent,
            None => return task,
        }
    }
}

fn mark_reached<'a>(
    task: &'a Task,
    children: &HashMap<&str, Vec<&'a Task>>,
    reached: &mut HashSet<&'a str>,
) {
    let mut stack = vec![task];
    while let Some(current) = stack.pop() {
        if !reached.insert(current.id.as_str()) {
            continue;
        }
        if let Some(kids) = children.get(current.id.as_str()) {
            stack.extend(kids.iter().copied());
        }
    }
}

fn build_node<'a>(
    task: &'a Task,
    children: &HashMap<&str, Vec<&'a Task>>,
    placed: &mut HashSet<&'a str>,
) -> Option<TreeNode<'a>> {
    // A promoted cycle member's parent would otherwise re-enter it.
    if !placed.insert(task.id.as_str()) {
        return None;
    }
    let kids = children
        .get(task.id.as_str())
        .map(|list| {
            list.iter()
                .filter_map(|child| build_node(child, children, placed))
                .collect()
        })
        .unwrap_or_default();
    Some(TreeNode {
        task,
        children: kids,
    })
}

/// Ids of `root_id` and every descendant, depth-first, root first.
/// Returns just `root_id` when it has no children (or is unknown).
pub fn collect_subtree_ids(tasks: &[Task], root_id: &str) -> Vec<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        if let Some(parent) = task.parent_id.as_deref() {
            children.entry(parent).or_default().push(task.id.as_str());
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id.to_string());
        if let Some(kids) = children.get(id) {
            // reversed so the first child is visited first
            stack.extend(kids.iter().rev().copied());
        }
    }
    out
}

/// Direct children of `parent_id` (roots for `None`) sorted by `order`.
pub fn children_of<'a>(tasks: &'a [Task], parent_id: Option<&str>) -> Vec<&'a Task> {
    let mut kids: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.parent_id.as_deref() == parent_id)
        .collect();
    kids.sort_by_key(|t| t.order);
    kids
}

/// Order value that places a new task after every current sibling.
pub fn next_order<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    project_id: &str,
    parent_id: Option<&str>,
) -> i64 {
    tasks
        .into_iter()
        .filter(|t| t.project_id == project_id && t.parent_id.as_deref() == parent_id)
        .map(|t| t.order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Ids visible on the board: every root, plus the children of every visible
/// expanded task, recursively.
pub fn visible_ids(tasks: &[Task]) -> HashSet<String> {
    let mut visible = HashSet::new();
    for root in build_tree(tasks) {
        collect_visible(&root, &mut visible);
    }
    visible
}

fn collect_visible(node: &TreeNode<'_>, visible: &mut HashSet<String>) {
    visible.insert(node.task.id.clone());
    if node.task.is_expanded {
        for child in &node.children {
            collect_visible(child, visible);
        }
    }
}

/// A node from a pre-order walk of the forest
#[derive(Debug, Clone, Copy)]
pub struct FlatNode<'a> {
    pub task: &'a Task,
    pub depth: usize,
    /// Number of descendants (all depths)
    pub descendants: usize,
}

/// Pre-order walk of the forest. With `respect_collapse`, children of
/// collapsed tasks are skipped.
pub fn flatten<'a>(forest: &[TreeNode<'a>], respect_collapse: bool) -> Vec<FlatNode<'a>> {
    let mut out = Vec::new();
    for root in forest {
        flatten_into(root, 0, respect_collapse, &mut out);
    }
    out
}

fn flatten_into<'a>(
    node: &TreeNode<'a>,
    depth: usize,
    respect_collapse: bool,
    out: &mut Vec<FlatNode<'a>>,
) {
    out.push(FlatNode {
        task: node.task,
        depth,
        descendants: node.size() - 1,
    });
    if respect_collapse && !node.task.is_expanded {
        return;
    }
    for child in &node.children {
        flatten_into(child, depth + 1, respect_collapse, out);
    }
}
