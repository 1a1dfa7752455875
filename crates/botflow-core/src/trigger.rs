//! Trigger matching
//!
//! Pure selection of the Trigger-kind nodes whose condition matches an
//! inbound event. Matching is case-insensitive and results are returned in
//! the graph's node declaration order, not ranked.

use crate::domain::event::InboundEvent;
use crate::domain::flow_graph::{FlowGraph, Node, NodeKind};

/// Select the trigger nodes matching an inbound event
pub fn match_triggers<'a>(event: &InboundEvent, graph: &'a FlowGraph) -> Vec<&'a Node> {
    graph
        .nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Trigger && matches_trigger(node, &event.text))
        .collect()
}

/// Check whether a single trigger node matches the event text
///
/// A command parameter only applies to text that begins with `/`; a command
/// node whose text does not start with `/` can still match on its keyword
/// parameter, if present.
fn matches_trigger(node: &Node, text: &str) -> bool {
    let data = &node.data;

    if let Some(command) = &data.command {
        if text.starts_with('/') {
            return text.to_lowercase() == command.to_lowercase();
        }
    }

    if let Some(keyword) = &data.keyword {
        return text.to_lowercase().contains(&keyword.to_lowercase());
    }

    false
}
