//! Dependency graph management using petgraph.

use std::collections::HashSet;

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use crate::error::{Error, Result};
use crate::package::Package;

/// Directed acyclic graph of the dependencies between workspace packages.
///
/// An edge points from a package to one of its dependencies. Dependencies on
/// packages outside the workspace are not represented, and packages that
/// neither depend on nor are used by another workspace package are pruned.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: IndexMap<String, NodeIndex>,
}

struct Frame {
    node: NodeIndex,
    children: Vec<NodeIndex>,
    next: usize,
}

impl DependencyGraph {
    /// Builds the graph for a set of packages keyed by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CircularDependency`] if the packages depend on each
    /// other in a cycle. No graph is returned in that case.
    pub fn new(packages: &IndexMap<String, Package>) -> Result<Self> {
        let mut full: DiGraph<String, ()> = DiGraph::new();
        let mut full_map: IndexMap<String, NodeIndex> = IndexMap::new();

        let mut node_for = |graph: &mut DiGraph<String, ()>, name: &str| -> NodeIndex {
            if let Some(idx) = full_map.get(name) {
                return *idx;
            }
            let idx = graph.add_node(name.to_string());
            full_map.insert(name.to_string(), idx);
            idx
        };

        for package in packages.values() {
            let from = node_for(&mut full, &package.name);
            for dep_name in package.dependencies.keys() {
                if !packages.contains_key(dep_name) {
                    continue;
                }
                let to = node_for(&mut full, dep_name);
                full.update_edge(from, to, ());
            }
        }

        let graph = full.filter_map(
            |idx, name| {
                let linked = full.neighbors_undirected(idx).next().is_some();
                if !linked {
                    debug!(package = %name, "pruning package without workspace dependencies");
                }
                linked.then(|| name.clone())
            },
            |_, edge| Some(*edge),
        );
        let node_map = graph
            .node_indices()
            .map(|idx| (graph[idx].clone(), idx))
            .collect();

        let dependency_graph = Self { graph, node_map };
        dependency_graph.detect_cycle()?;
        Ok(dependency_graph)
    }

    /// Depth-first search over dependency edges from every node, keeping the
    /// current path on an explicit stack.
    fn detect_cycle(&self) -> Result<()> {
        let mut done: HashSet<NodeIndex> = HashSet::new();
        let mut on_path: HashSet<NodeIndex> = HashSet::new();

        for start in self.graph.node_indices() {
            if done.contains(&start) {
                continue;
            }

            on_path.insert(start);
            let mut stack = vec![Frame {
                node: start,
                children: self.neighbors(start, Direction::Outgoing),
                next: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                let child = frame.children.get(frame.next).copied();
                frame.next += 1;
                let node = frame.node;

                match child {
                    Some(child) if on_path.contains(&child) => {
                        let mut cycle: Vec<String> = stack
                            .iter()
                            .skip_while(|f| f.node != child)
                            .map(|f| self.graph[f.node].clone())
                            .collect();
                        cycle.push(self.graph[child].clone());
                        return Err(Error::CircularDependency(cycle));
                    }
                    Some(child) if done.contains(&child) => {}
                    Some(child) => {
                        on_path.insert(child);
                        stack.push(Frame {
                            node: child,
                            children: self.neighbors(child, Direction::Outgoing),
                            next: 0,
                        });
                    }
                    None => {
                        stack.pop();
                        on_path.remove(&node);
                        done.insert(node);
                    }
                }
            }
        }

        Ok(())
    }

    /// Neighbors in the order their edges were added.
    fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        neighbors.reverse();
        neighbors
    }

    fn names_of(&self, name: &str, direction: Direction) -> Vec<String> {
        match self.node_map.get(name) {
            Some(idx) => self
                .neighbors(*idx, direction)
                .into_iter()
                .map(|n| self.graph[n].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Returns the workspace packages `name` directly depends on.
    ///
    /// A package that is not part of the graph has no dependencies.
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        self.names_of(name, Direction::Outgoing)
    }

    /// Returns the workspace packages that directly depend on `name`.
    pub fn used_by(&self, name: &str) -> Vec<String> {
        self.names_of(name, Direction::Incoming)
    }

    /// Names of all packages in the graph, in the order they were first seen.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.node_map.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
