use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl NodeSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub id: String,
    #[serde(alias = "sourceId", alias = "from")]
    pub source: String,
    #[serde(alias = "targetId", alias = "to")]
    pub target: String,
}

impl EdgeSpec {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DiagramError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    #[error("duplicate edge id `{0}`")]
    DuplicateEdge(String),
    #[error("node `{id}` has invalid size {width}x{height}")]
    InvalidSize { id: String, width: f32, height: f32 },
}

/// A stock-and-flow document snapshot as supplied by the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    /// Inline config overrides, same shape as a config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node or resizes the existing one with the same id.
    pub fn ensure_node(&mut self, id: &str, width: f32, height: f32) {
        if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
            node.width = width;
            node.height = height;
            return;
        }
        self.nodes.push(NodeSpec {
            id: id.to_string(),
            width,
            height,
        });
    }

    pub fn add_edge(&mut self, id: &str, source: &str, target: &str) {
        self.edges.push(EdgeSpec::new(id, source, target));
    }

    pub fn validate(&self) -> Result<(), DiagramError> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(DiagramError::DuplicateNode(node.id.clone()));
            }
            let valid = |value: f32| value.is_finite() && value >= 0.0;
            if !valid(node.width) || !valid(node.height) {
                return Err(DiagramError::InvalidSize {
                    id: node.id.clone(),
                    width: node.width,
                    height: node.height,
                });
            }
        }
        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(DiagramError::DuplicateEdge(edge.id.clone()));
            }
        }
        Ok(())
    }

    pub fn node_sizes(&self) -> BTreeMap<String, NodeSize> {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), NodeSize::new(node.width, node.height)))
            .collect()
    }
}

/// Parses a diagram document, accepting JSON5 when strict JSON fails.
pub fn parse_diagram(input: &str) -> anyhow::Result<Diagram> {
    match serde_json::from_str::<Diagram>(input) {
        Ok(diagram) => Ok(diagram),
        Err(json_err) => json5::from_str::<Diagram>(input)
            .map_err(|_| anyhow::anyhow!("invalid diagram document: {json_err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source_id_aliases() {
        let input = r#"{
            "nodes": [{"id": "a", "width": 100, "height": 50}],
            "edges": [{"id": "e1", "sourceId": "a", "targetId": "b"}]
        }"#;
        let diagram = parse_diagram(input).unwrap();
        assert_eq!(diagram.edges[0].source, "a");
        assert_eq!(diagram.edges[0].target, "b");
    }

    #[test]
    fn parses_json5_documents() {
        let input = "{ nodes: [{ id: 'a', width: 10, height: 10, }], edges: [] }";
        let diagram = parse_diagram(input).unwrap();
        assert_eq!(diagram.nodes.len(), 1);
    }

    #[test]
    fn rejects_duplicate_nodes() {
        let mut diagram = Diagram::new();
        diagram.nodes.push(NodeSpec {
            id: "a".to_string(),
            width: 1.0,
            height: 1.0,
        });
        diagram.nodes.push(NodeSpec {
            id: "a".to_string(),
            width: 2.0,
            height: 2.0,
        });
        assert_eq!(
            diagram.validate(),
            Err(DiagramError::DuplicateNode("a".to_string()))
        );
    }

    #[test]
    fn rejects_non_finite_sizes() {
        let mut diagram = Diagram::new();
        diagram.ensure_node("a", f32::NAN, 10.0);
        assert!(matches!(
            diagram.validate(),
            Err(DiagramError::InvalidSize { .. })
        ));
    }

    #[test]
    fn edges_to_missing_nodes_are_valid() {
        let mut diagram = Diagram::new();
        diagram.ensure_node("a", 10.0, 10.0);
        diagram.add_edge("e1", "a", "ghost");
        assert!(diagram.validate().is_ok());
    }

    #[test]
    fn ensure_node_resizes_existing() {
        let mut diagram = Diagram::new();
        diagram.ensure_node("a", 10.0, 10.0);
        diagram.ensure_node("a", 20.0, 30.0);
        assert_eq!(diagram.nodes.len(), 1);
        assert_eq!(diagram.node_sizes()["a"], NodeSize::new(20.0, 30.0));
    }
}
