//! Read-side export of a recorded run.

use serde::{Deserialize, Serialize};

use crate::recorder::ProvenanceRecorder;
use crate::types::{DataNode, ProcessNode, ProvEdge};

/// JSON-shaped snapshot of one run's provenance graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceExport {
  pub workflow: String,
  pub flow_id: String,
  pub run_id: String,
  pub process_nodes: Vec<ProcessNode>,
  pub data_nodes: Vec<DataNode>,
  pub edges: Vec<ProvEdge>,
}

impl ProvenanceRecorder {
  pub fn export(&self) -> ProvenanceExport {
    let inner = self.read_inner();
    ProvenanceExport {
      workflow: inner.workflow.clone(),
      flow_id: inner.flow_id.clone(),
      run_id: inner.run_id.clone(),
      process_nodes: inner.processes.values().cloned().collect(),
      data_nodes: inner.data.values().cloned().collect(),
      edges: inner.edges.clone(),
    }
  }

  /// Render the run as a directed-graph description: boxes for processes,
  /// ellipses for data.
  pub fn to_dot(&self) -> String {
    let inner = self.read_inner();
    let mut out = String::from("digraph provenance {\n");

    for process in inner.processes.values() {
      out.push_str(&format!(
        "  \"{}\" [shape=box, label=\"{}\\n{:?}\"];\n",
        process.id.as_str(),
        process.id.as_str(),
        process.state,
      ));
    }
    for data in inner.data.values() {
      let preview = truncate(&data.value.to_string(), 32);
      out.push_str(&format!(
        "  \"{}\" [shape=ellipse, label=\"{preview}\"];\n",
        data.hash,
      ));
    }
    for edge in &inner.edges {
      out.push_str(&format!(
        "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
        edge.from, edge.to, edge.label,
      ));
    }

    out.push_str("}\n");
    out
  }
}

fn truncate(text: &str, max: usize) -> String {
  if text.chars().count() <= max {
    text.to_string()
  } else {
    let cut: String = text.chars().take(max).collect();
    format!("{cut}…")
  }
}
