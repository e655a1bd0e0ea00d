//! Dependency ordering between resources
//!
//! A resource depends on every resource its properties reference and on
//! its explicit `DependsOn` entries. The provisioning engine creates them in
//! a topological order of this graph, so a cycle makes the stack undeployable.

use crate::error::{Error, Result};
use crate::id::LogicalId;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Directed graph: node -> the nodes it must be created after
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in declaration order
    nodes: Vec<LogicalId>,
    dependencies: BTreeMap<LogicalId, BTreeSet<LogicalId>>,
}

impl DependencyGraph {
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (LogicalId, BTreeSet<LogicalId>)>,
    {
        let mut graph = Self::default();
        for (id, deps) in nodes {
            graph.nodes.push(id.clone());
            graph.dependencies.insert(id, deps);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// What `id` must be created after
    pub fn dependencies_of(&self, id: &LogicalId) -> Option<&BTreeSet<LogicalId>> {
        self.dependencies.get(id)
    }

    /// What must be created after `id`, in declaration order
    pub fn dependents_of(&self, id: &LogicalId) -> Vec<&LogicalId> {
        self.nodes
            .iter()
            .filter(|n| {
                self.dependencies
                    .get(*n)
                    .is_some_and(|deps| deps.contains(id))
            })
            .collect()
    }

    /// A creation order respecting every dependency
    ///
    /// Ties are broken by declaration order, so the result is stable for a
    /// given stack. Dependencies on nodes outside the graph are ignored;
    /// [`Stack::validate`](crate::Stack::validate) reports those.
    pub fn creation_order(&self) -> Result<Vec<LogicalId>> {
        let position: BTreeMap<&LogicalId, usize> =
            self.nodes.iter().enumerate().map(|(i, n)| (n, i)).collect();

        let mut pending: BTreeMap<&LogicalId, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&LogicalId, Vec<&LogicalId>> = BTreeMap::new();
        for node in &self.nodes {
            let deps = self
                .dependencies
                .get(node)
                .map(|deps| {
                    deps.iter()
                        .filter(|d| position.contains_key(d) && *d != node)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            pending.insert(node, deps.len());
            for dep in deps {
                dependents.entry(dep).or_default().push(node);
            }
        }

        let mut ready: VecDeque<&LogicalId> = self
            .nodes
            .iter()
            .filter(|n| pending.get(n) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_front() {
            order.push(node.clone());
            let mut unlocked: Vec<&LogicalId> = Vec::new();
            for next in dependents.get(node).into_iter().flatten() {
                if let Some(count) = pending.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        unlocked.push(next);
                    }
                }
            }
            unlocked.sort_by_key(|n| position[n]);
            ready.extend(unlocked);
        }

        if order.len() < self.nodes.len() {
            let stuck: Vec<String> = self
                .nodes
                .iter()
                .filter(|n| pending.get(n).is_some_and(|c| *c > 0))
                .map(ToString::to_string)
                .collect();
            return Err(Error::DependencyCycle(stuck));
        }

        Ok(order)
    }
}
