//! Graph fixtures for traversal scenarios

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Directed graph over `u32` nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: BTreeMap<u32, Vec<u32>>,
}

impl Graph {
    pub fn neighbours(&self, node: u32) -> &[u32] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every node mentioned by an edge
    pub fn nodes(&self) -> BTreeSet<u32> {
        self.adjacency
            .iter()
            .flat_map(|(from, to)| std::iter::once(*from).chain(to.iter().copied()))
            .collect()
    }

    /// Nodes reachable from `start`, `start` included
    pub fn reachable_from(&self, start: u32) -> BTreeSet<u32> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for &next in self.neighbours(node) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }
}

/// Builder for test graphs
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge(mut self, from: u32, to: u32) -> Self {
        self.graph.adjacency.entry(from).or_default().push(to);
        self
    }

    pub fn edges(self, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        edges
            .into_iter()
            .fold(self, |builder, (from, to)| builder.edge(from, to))
    }

    /// `0 -> 1 -> ... -> len - 1`
    pub fn chain(self, len: u32) -> Self {
        self.edges((1..len).map(|to| (to - 1, to)))
    }

    /// Complete `fan_out`-ary tree of the given depth rooted at 0
    pub fn tree(self, fan_out: u32, depth: u32) -> Self {
        let mut edges = Vec::new();
        let mut level = vec![0];
        let mut next_id = 1;

        for _ in 0..depth {
            let mut next_level = Vec::new();
            for parent in level {
                for _ in 0..fan_out {
                    edges.push((parent, next_id));
                    next_level.push(next_id);
                    next_id += 1;
                }
            }
            level = next_level;
        }
        self.edges(edges)
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}
