use indexmap::IndexMap;

use crate::error::GraphError;
use crate::graph::Graph;

/// Task-level traversal structure built from a graph's links.
///
/// Both data links and wait links contribute edges: a wait link carries no
/// value but constrains order exactly like a data link does. Parallel links
/// between the same pair of tasks collapse onto one edge.
#[derive(Debug, Clone)]
pub struct Topology {
  /// task -> downstream tasks
  adjacency: IndexMap<String, Vec<String>>,
  /// task -> upstream tasks
  reverse: IndexMap<String, Vec<String>>,
}

impl Topology {
  pub fn new(graph: &Graph) -> Self {
    let mut adjacency: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut reverse: IndexMap<String, Vec<String>> = IndexMap::new();

    for task in graph.tasks() {
      adjacency.entry(task.name.clone()).or_default();
      reverse.entry(task.name.clone()).or_default();
    }

    for link in graph.links() {
      if link.from.task == link.to.task {
        continue;
      }
      let downstream = adjacency.entry(link.from.task.clone()).or_default();
      if !downstream.contains(&link.to.task) {
        downstream.push(link.to.task.clone());
      }
      let upstream = reverse.entry(link.to.task.clone()).or_default();
      if !upstream.contains(&link.from.task) {
        upstream.push(link.from.task.clone());
      }
    }

    Self { adjacency, reverse }
  }

  pub fn downstream(&self, task: &str) -> &[String] {
    self
      .adjacency
      .get(task)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn upstream(&self, task: &str) -> &[String] {
    self.reverse.get(task).map(|v| v.as_slice()).unwrap_or(&[])
  }

  /// Tasks with no upstream edges.
  pub fn entry_points(&self) -> Vec<&str> {
    self
      .reverse
      .iter()
      .filter(|(_, upstream)| upstream.is_empty())
      .map(|(name, _)| name.as_str())
      .collect()
  }

  /// Kahn-style topological order over all tasks.
  ///
  /// Any task left with a positive in-degree signals a cycle; that is fatal
  /// for a run and no partial order is returned.
  pub fn toposort(&self) -> Result<Vec<String>, GraphError> {
    let mut in_degree: IndexMap<&str, usize> = self
      .reverse
      .iter()
      .map(|(name, upstream)| (name.as_str(), upstream.len()))
      .collect();

    let mut queue: Vec<&str> = in_degree
      .iter()
      .filter(|(_, degree)| **degree == 0)
      .map(|(name, _)| *name)
      .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    let mut cursor = 0;

    while cursor < queue.len() {
      let current = queue[cursor];
      cursor += 1;
      order.push(current.to_string());

      for next in self.downstream(current) {
        let degree = in_degree
          .get_mut(next.as_str())
          .expect("downstream task missing from topology");
        *degree -= 1;
        if *degree == 0 {
          queue.push(next.as_str());
        }
      }
    }

    if order.len() != in_degree.len() {
      let remaining: Vec<String> = in_degree
        .iter()
        .filter(|(name, _)| !order.iter().any(|done| done == *name))
        .map(|(name, _)| name.to_string())
        .collect();
      return Err(GraphError::CyclicGraph { remaining });
    }

    Ok(order)
  }
}
