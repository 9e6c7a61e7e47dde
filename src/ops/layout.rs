//! Layered layout for the board.
//!
//! Node placement within a rank is delegated to `rust-sugiyama`; this module
//! only maps its coordinates onto board units. `LR` grows to the right, `TB`
//! grows downward.

use std::collections::{HashMap, HashSet};

use petgraph::Direction as EdgeDirection;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::{Direction, LayoutConfig, Position};

/// Axis-aligned box in board units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_rect(pos: Position, width: f64, height: f64) -> Self {
        Bounds {
            min_x: pos.x,
            min_y: pos.y,
            max_x: pos.x + width,
            max_y: pos.y + height,
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Top-left position of every node reachable from `roots`, indexed by
/// `NodeIndex::index()`. The graph must be a forest; unreachable nodes stay
/// at the origin.
///
/// Rank is tree depth: a node of rank `r` starts at `r * (extent +
/// rank_sep)` along the rank axis. Cross-axis coordinates come from the
/// Sugiyama layout of each tree, rescaled so that neighbours within a rank
/// sit at least `extent + node_sep` apart. Trees are laid side by side in
/// root order.
pub fn layered_positions<N, E>(
    graph: &DiGraph<N, E>,
    roots: &[NodeIndex],
    config: &LayoutConfig,
) -> Vec<Position> {
    let (rank_extent, cross_extent) = match config.direction {
        Direction::LeftRight => (config.node_width, config.node_height),
        Direction::TopBottom => (config.node_height, config.node_width),
    };
    let rank_pitch = rank_extent + config.rank_sep;
    let cross_pitch = cross_extent + config.node_sep;

    let cross = sugiyama_cross(graph);
    let mut out = vec![Position::new(0.0, 0.0); graph.node_count()];
    let mut offset = 0.0;

    for &root in roots {
        let members = subtree_ranks(graph, root);
        let raw = |node: NodeIndex| cross.get(&node.index()).copied().unwrap_or(0.0);
        let min = members
            .iter()
            .map(|&(n, _)| raw(n))
            .fold(f64::INFINITY, f64::min);
        // A chain has no two nodes on one rank; fall back to any gap.
        let flat: Vec<(NodeIndex, usize)> = members.iter().map(|&(n, _)| (n, 0)).collect();
        let unit = min_rank_gap(&members, &raw)
            .or_else(|| min_rank_gap(&flat, &raw))
            .unwrap_or(1.0);

        let mut span: f64 = 0.0;
        for &(node, rank) in &members {
            let c = (raw(node) - min) / unit * cross_pitch;
            span = span.max(c);
            let main = rank as f64 * rank_pitch;
            out[node.index()] = match config.direction {
                Direction::LeftRight => Position::new(main, offset + c),
                Direction::TopBottom => Position::new(offset + c, main),
            };
        }
        offset += span + cross_pitch;
    }
    out
}

/// Raw cross-axis coordinate per node index, for every node with an edge.
/// Nodes without edges are left out; the library only sees edges.
fn sugiyama_cross<N, E>(graph: &DiGraph<N, E>) -> HashMap<usize, f64> {
    let edges: Vec<(u32, u32)> = graph
        .raw_edges()
        .iter()
        .map(|e| (e.source().index() as u32, e.target().index() as u32))
        .collect();
    if edges.is_empty() {
        return HashMap::new();
    }

    let mut cross = HashMap::new();
    for (coords, _, _) in rust_sugiyama::from_edges(&edges).build() {
        for (id, (x, _)) in coords {
            cross.insert(id as usize, x as f64);
        }
    }
    cross
}

/// `root` and its descendants with their depth below `root`, pre-order
fn subtree_ranks<N, E>(graph: &DiGraph<N, E>, root: NodeIndex) -> Vec<(NodeIndex, usize)> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![(root, 0)];
    while let Some((node, rank)) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        out.push((node, rank));
        stack.extend(
            graph
                .neighbors_directed(node, EdgeDirection::Outgoing)
                .map(|kid| (kid, rank + 1)),
        );
    }
    out
}

/// Smallest positive distance between two nodes of the same rank
fn min_rank_gap(members: &[(NodeIndex, usize)], raw: &impl Fn(NodeIndex) -> f64) -> Option<f64> {
    let mut by_rank: HashMap<usize, Vec<f64>> = HashMap::new();
    for &(node, rank) in members {
        by_rank.entry(rank).or_default().push(raw(node));
    }
    by_rank
        .into_values()
        .flat_map(|mut xs| {
            xs.sort_by(f64::total_cmp);
            xs.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>()
        })
        .filter(|gap| *gap > f64::EPSILON)
        .reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// a(b c) d
    fn sample() -> (DiGraph<&'static str, ()>, Vec<NodeIndex>) {
        let mut g = DiGraph::new();
        let a = g.add_node("a");
        let b = g.add_node("b");
        let c = g.add_node("c");
        let d = g.add_node("d");
        g.add_edge(a, b, ());
        g.add_edge(a, c, ());
        (g, vec![a, d])
    }

    fn assert_apart(a: f64, b: f64, pitch: f64) {
        assert!((a - b).abs() >= pitch - 1e-9, "{a} and {b} closer than {pitch}");
    }

    #[test]
    fn left_right_ranks_by_depth() {
        let (g, roots) = sample();
        let config = LayoutConfig::default();
        let pitch = config.node_height + config.node_sep;
        let pos = layered_positions(&g, &roots, &config);
        let rank = config.node_width + config.rank_sep;

        let xs: Vec<f64> = pos.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, rank, rank, 0.0]);
        assert_apart(pos[1].y, pos[2].y, pitch);
        // the first tree starts at the origin, the second after it
        assert_eq!(pos[..3].iter().map(|p| p.y).fold(f64::INFINITY, f64::min), 0.0);
        let first_tree_end = pos[..3].iter().map(|p| p.y).fold(0.0, f64::max);
        assert!(pos[3].y >= first_tree_end + pitch);
    }

    #[test]
    fn top_bottom_swaps_axes() {
        let (g, roots) = sample();
        let config = LayoutConfig {
            direction: Direction::TopBottom,
            ..LayoutConfig::default()
        };
        let pos = layered_positions(&g, &roots, &config);
        let rank = config.node_height + config.rank_sep;

        let ys: Vec<f64> = pos.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, rank, rank, 0.0]);
        assert_apart(pos[1].x, pos[2].x, config.node_width + config.node_sep);
        assert!(pos[3].x > pos[0].x);
    }

    #[test]
    fn nodes_of_a_rank_never_overlap() {
        // r(x(x1 x2 x3) y)
        let mut g: DiGraph<(), ()> = DiGraph::new();
        let r = g.add_node(());
        let x = g.add_node(());
        let x1 = g.add_node(());
        let x2 = g.add_node(());
        let x3 = g.add_node(());
        let y = g.add_node(());
        for (p, c) in [(r, x), (x, x1), (x, x2), (x, x3), (r, y)] {
            g.add_edge(p, c, ());
        }
        let config = LayoutConfig::default();
        let pitch = config.node_height + config.node_sep;
        let pos = layered_positions(&g, &[r], &config);

        assert_apart(pos[x.index()].y, pos[y.index()].y, pitch);
        for (a, b) in [(x1, x2), (x1, x3), (x2, x3)] {
            assert_apart(pos[a.index()].y, pos[b.index()].y, pitch);
        }
        assert_eq!(pos[x1.index()].x, 2.0 * (config.node_width + config.rank_sep));
    }

    #[test]
    fn lone_roots_stack_along_the_cross_axis() {
        let mut g: DiGraph<(), ()> = DiGraph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let config = LayoutConfig::default();
        let pos = layered_positions(&g, &[a, b], &config);
        assert_eq!(
            pos,
            vec![
                Position::new(0.0, 0.0),
                Position::new(0.0, config.node_height + config.node_sep),
            ]
        );
    }

    #[test]
    fn bounds_union() {
        let a = Bounds::from_rect(Position::new(0.0, 0.0), 10.0, 10.0);
        let b = Bounds::from_rect(Position::new(-5.0, 20.0), 10.0, 10.0);
        let u = a.union(b);
        assert_eq!((u.min_x, u.min_y, u.max_x, u.max_y), (-5.0, 0.0, 10.0, 30.0));
        assert_eq!(u.center(), Position::new(2.5, 15.0));
    }
}
