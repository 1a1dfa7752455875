use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The closed set of node kinds a flow graph may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry point matched against inbound event text
    Trigger,
    /// Produces an outbound side effect (message send)
    Action,
    /// Delay, variable write, or condition branch
    Logic,
    /// Extension point; behavior is deployment-specific
    Integration,
}

/// Kind-specific node parameters
///
/// The editor emits a single `data` object for every node kind; which fields
/// are meaningful depends on the kind. Fields irrelevant to a kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    /// Human-readable label
    pub label: Option<String>,

    /// Message text for Action nodes
    pub message: Option<String>,

    /// Command string for Trigger nodes (e.g. "/start")
    pub command: Option<String>,

    /// Keyword string for Trigger nodes
    pub keyword: Option<String>,

    /// Condition expression for branching Logic nodes
    pub condition: Option<String>,

    /// Delay in seconds for Logic nodes
    pub delay: Option<u64>,

    /// Variable name for Logic nodes that write to the execution context
    pub variable: Option<String>,

    /// Variable value for Logic nodes that write to the execution context
    pub value: Option<String>,
}

/// Editor layout coordinates, carried through deserialization but unused by
/// the runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal canvas coordinate
    pub x: f64,
    /// Vertical canvas coordinate
    pub y: f64,
}

/// A single node in a flow graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// ID of the node, unique within the graph
    pub id: String,

    /// Kind of the node
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Kind-specific parameters
    #[serde(default)]
    pub data: NodeData,

    /// Editor layout position
    #[serde(default)]
    pub position: Position,
}

/// A directed edge between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// ID of the edge
    pub id: String,

    /// ID of the source node
    pub source: String,

    /// ID of the target node
    pub target: String,

    /// Disambiguates multiple outputs from one node (e.g. the "true" and
    /// "false" branches of a condition)
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,

    /// Disambiguates multiple inputs on the target node
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// Represents a parsed and validated flow graph
///
/// Immutable once attached to a bot instance; replacing a flow means
/// replacing the whole graph reference, never in-place mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowGraph {
    /// The nodes in this graph, in declaration order
    pub nodes: Vec<Node>,

    /// The edges in this graph, in declaration order
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowGraph {
    /// Parse a flow graph from the editor's JSON representation and validate it
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        let graph: FlowGraph = serde_json::from_value(value)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Validate the flow graph
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.nodes.is_empty() {
            return Err(CoreError::ValidationError(
                "Flow must have at least one node".to_string(),
            ));
        }

        // Check for ID uniqueness
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate node ID: {}",
                    node.id
                )));
            }
        }

        // Dangling edges are a load-time error, not a runtime one
        for edge in &self.edges {
            if !node_ids.contains(edge.source.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "Edge {} references non-existent source node: {}",
                    edge.id, edge.source
                )));
            }
            if !node_ids.contains(edge.target.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "Edge {} references non-existent target node: {}",
                    edge.id, edge.target
                )));
            }
        }

        Ok(())
    }

    /// Look up a node by ID
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Outgoing edges of a node, in edge declaration order
    pub fn successors<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |edge| edge.source == node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flow_graph_deserialization() {
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                {
                    "id": "trigger_1",
                    "type": "trigger",
                    "data": { "label": "Start", "command": "/start" },
                    "position": { "x": 100.0, "y": 50.0 }
                },
                {
                    "id": "action_1",
                    "type": "action",
                    "data": { "message": "Welcome!" },
                    "position": { "x": 100.0, "y": 150.0 }
                }
            ],
            "edges": [
                { "id": "e1", "source": "trigger_1", "target": "action_1" }
            ]
        }))
        .unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.nodes[0].kind, NodeKind::Trigger);
        assert_eq!(graph.nodes[0].data.command.as_deref(), Some("/start"));
        assert_eq!(graph.nodes[1].data.message.as_deref(), Some("Welcome!"));
    }

    #[test]
    fn test_flow_graph_unknown_node_type_rejected() {
        let result = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "n1", "type": "teleport", "data": {} }
            ],
            "edges": []
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_flow_graph_rejects_empty_nodes() {
        let graph = FlowGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
        };

        match graph.validate() {
            Err(CoreError::ValidationError(msg)) => {
                assert!(msg.contains("at least one node"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_flow_graph_rejects_duplicate_node_ids() {
        let result = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "n1", "type": "trigger", "data": { "command": "/a" } },
                { "id": "n1", "type": "action", "data": { "message": "hi" } }
            ],
            "edges": []
        }));

        match result {
            Err(CoreError::ValidationError(msg)) => {
                assert!(msg.contains("Duplicate node ID"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_flow_graph_rejects_dangling_edge() {
        let result = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "n1", "type": "trigger", "data": { "command": "/a" } }
            ],
            "edges": [
                { "id": "e1", "source": "n1", "target": "missing" }
            ]
        }));

        match result {
            Err(CoreError::ValidationError(msg)) => {
                assert!(msg.contains("non-existent target node"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_successors_follow_edge_declaration_order() {
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "a", "type": "trigger", "data": { "command": "/a" } },
                { "id": "b", "type": "action", "data": { "message": "first" } },
                { "id": "c", "type": "action", "data": { "message": "second" } }
            ],
            "edges": [
                { "id": "e1", "source": "a", "target": "b" },
                { "id": "e2", "source": "a", "target": "c" }
            ]
        }))
        .unwrap();

        let targets: Vec<&str> = graph.successors("a").map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["b", "c"]);
        assert_eq!(graph.successors("b").count(), 0);
    }

    #[test]
    fn test_edge_handles_roundtrip() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e1",
            "source": "logic_1",
            "target": "action_1",
            "sourceHandle": "true"
        }))
        .unwrap();

        assert_eq!(edge.source_handle.as_deref(), Some("true"));
        assert_eq!(edge.target_handle, None);

        let serialized = serde_json::to_value(&edge).unwrap();
        assert_eq!(serialized["sourceHandle"], "true");
        assert!(serialized.get("targetHandle").is_none());
    }
}
