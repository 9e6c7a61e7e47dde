//! Board graph: the visible part of a project's task tree as nodes and
//! edges with board positions, plus the gestures the board sends back.

use std::collections::HashMap;

use log::info;
use petgraph::Direction as EdgeDirection;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::io::storage::KeyValueStore;
use crate::model::{LayoutConfig, Position, Task};
use crate::ops::layout::{Bounds, layered_positions};
use crate::ops::store::{AppStore, StoreError};
use crate::ops::tree::{build_tree, flatten};

/// A visible task on the board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    pub is_root: bool,
    pub depth: usize,
    /// Top-left corner in board units
    pub position: Position,
    /// True when `position` comes from the task rather than the layout
    pub pinned: bool,
    /// Descendants hidden behind a collapsed node
    pub hidden: usize,
    pub checklist_done: usize,
    pub checklist_total: usize,
}

/// Parent → child edge between two visible nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// The child is completed (rendered dimmed)
    pub completed: bool,
}

/// Graph view over one project's tasks
#[derive(Debug, Clone)]
pub struct GraphView {
    graph: DiGraph<GraphNode, GraphEdge>,
    index: HashMap<String, NodeIndex>,
    node_width: f64,
    node_height: f64,
}

impl GraphView {
    /// Build the view: visible nodes in tree order, edges between them,
    /// and positions (stored ones win over the layout).
    pub fn build(tasks: &[Task], config: &LayoutConfig) -> Self {
        let forest = build_tree(tasks);
        let mut graph: DiGraph<GraphNode, GraphEdge> = DiGraph::new();
        let mut index = HashMap::new();
        let mut roots = Vec::new();
        let mut stored = Vec::new();
        // last node seen at each depth
        let mut ancestors: Vec<NodeIndex> = Vec::new();

        for flat in flatten(&forest, true) {
            let task = flat.task;
            let (done, total) = task.checklist_progress();
            let node = graph.add_node(GraphNode {
                id: task.id.clone(),
                title: task.title.clone(),
                is_completed: task.is_completed,
                is_root: flat.depth == 0,
                depth: flat.depth,
                position: Position::new(0.0, 0.0),
                pinned: task.position.is_some(),
                hidden: if task.is_expanded { 0 } else { flat.descendants },
                checklist_done: done,
                checklist_total: total,
            });
            index.insert(task.id.clone(), node);
            stored.push(task.position);

            ancestors.truncate(flat.depth);
            match ancestors.last() {
                Some(&parent) => {
                    let edge = GraphEdge {
                        source: graph[parent].id.clone(),
                        target: task.id.clone(),
                        completed: task.is_completed,
                    };
                    graph.add_edge(parent, node, edge);
                }
                None => roots.push(node),
            }
            ancestors.push(node);
        }

        let computed = layered_positions(&graph, &roots, config);
        for (i, (auto, pinned)) in computed.into_iter().zip(stored).enumerate() {
            graph[NodeIndex::new(i)].position = pinned.unwrap_or(auto);
        }

        GraphView {
            graph,
            index,
            node_width: config.node_width,
            node_height: config.node_height,
        }
    }

    /// Visible nodes in tree order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.graph.edge_weights()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.graph[i])
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn rect(&self, node: &GraphNode) -> Bounds {
        Bounds::from_rect(node.position, self.node_width, self.node_height)
    }

    /// Bounding box of every node rectangle, `None` for an empty board
    pub fn bounds(&self) -> Option<Bounds> {
        self.nodes().map(|n| self.rect(n)).reduce(Bounds::union)
    }

    pub fn parent(&self, id: &str) -> Option<&GraphNode> {
        let &node = self.index.get(id)?;
        self.graph
            .neighbors_directed(node, EdgeDirection::Incoming)
            .next()
            .map(|p| &self.graph[p])
    }

    /// Visible children in sibling order
    pub fn children(&self, id: &str) -> Vec<&GraphNode> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut kids: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, EdgeDirection::Outgoing)
            .collect();
        kids.sort();
        kids.into_iter().map(|k| &self.graph[k]).collect()
    }

    /// The node and its siblings in order (the roots for a root node)
    pub fn siblings(&self, id: &str) -> Vec<&GraphNode> {
        match self.parent(id) {
            Some(parent) => self.children(&parent.id),
            None => self.nodes().filter(|n| n.is_root).collect(),
        }
    }
}

/// Whether making `new_parent` the parent of `task_id` would close a loop:
/// `new_parent` is the task itself or one of its descendants.
pub fn creates_cycle(tasks: &[Task], task_id: &str, new_parent: &str) -> bool {
    if task_id == new_parent {
        return true;
    }
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
    for task in tasks {
        nodes.insert(task.id.as_str(), graph.add_node(task.id.as_str()));
    }
    for task in tasks {
        let Some(parent) = task.parent_id.as_deref() else {
            continue;
        };
        if let (Some(&p), Some(&c)) = (nodes.get(parent), nodes.get(task.id.as_str())) {
            graph.add_edge(p, c, ());
        }
    }
    match (nodes.get(task_id), nodes.get(new_parent)) {
        (Some(&from), Some(&to)) => has_path_connecting(&graph, from, to, None),
        _ => false,
    }
}

/// A board interaction that changes the task tree
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// A node was dropped at a new position
    DragEnd { id: String, position: Position },
    /// `target` was connected under `source`
    Connect { source: String, target: String },
    /// Nodes were deleted (each with its subtree)
    Delete { ids: Vec<String> },
}

/// Translate a gesture into store calls.
pub fn apply_gesture<S: KeyValueStore + Clone>(
    store: &mut AppStore<S>,
    gesture: Gesture,
) -> Result<(), StoreError> {
    match gesture {
        Gesture::DragEnd { id, position } => {
            store.update_task_position(&id, Some(position))?;
        }
        Gesture::Connect { source, target } => {
            if creates_cycle(&store.task_list(), &target, &source) {
                info!("event=gesture_connect module=graph status=refused reason=cycle");
                return Err(StoreError::Cycle {
                    task: target,
                    parent: source,
                });
            }
            store.move_task(&target, Some(&source), 0)?;
        }
        Gesture::Delete { ids } => {
            let mut removed = 0;
            for id in &ids {
                removed += store.delete_task(id)?.len();
            }
            info!("event=gesture_delete module=graph status=ok removed={removed}");
        }
    }
    Ok(())
}
