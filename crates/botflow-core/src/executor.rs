//! Flow traversal and node execution
//!
//! One [`FlowExecutor`] exists per deployed bot instance. Each inbound event
//! gets its own [`ExecutionContext`] and its own traversal per matched
//! trigger; traversals never share state and are discarded when they finish.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info_span, warn, Instrument};

use crate::domain::event::{InboundEvent, InteractionRecord};
use crate::domain::flow_graph::{Edge, FlowGraph, Node, NodeKind};
use crate::domain::ports::{InteractionLogger, MessageSender};
use crate::trigger;
use crate::CoreError;

/// Upper bound on traversal depth
///
/// The visited set already stops back-edges; the depth bound is the backstop
/// against degenerate graphs (e.g. very long chains) so a single traversal
/// cannot run unbounded.
pub const MAX_TRAVERSAL_DEPTH: usize = 64;

/// Reply sent when no trigger node matches an inbound event
pub const FALLBACK_MESSAGE: &str = "I didn't understand that. Try typing /start to begin.";

/// Reply sent when a node side effect fails and the traversal path halts
pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

/// Per-traversal transient state
///
/// Scoped to one inbound event's traversal and discarded afterward; variable
/// writes are never persisted or shared across events.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Chat the originating message arrived in
    pub chat_id: i64,

    /// User who sent the originating message
    pub user_id: i64,

    /// Text of the originating message
    pub text: String,

    variables: HashMap<String, String>,
}

impl ExecutionContext {
    /// Create a fresh context for one inbound event
    pub fn new(event: &InboundEvent) -> Self {
        Self {
            chat_id: event.chat_id,
            user_id: event.user_id,
            text: event.text.clone(),
            variables: HashMap::new(),
        }
    }

    /// Write a variable into the context
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Read a variable from the context
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Resolve a name in a condition expression
    ///
    /// `text` is a builtin bound to the originating message; everything else
    /// resolves against the variable store.
    fn lookup(&self, name: &str) -> Option<&str> {
        if name == "text" {
            Some(&self.text)
        } else {
            self.variable(name)
        }
    }
}

/// Result of executing one node, used to select successor edges
enum NodeOutcome {
    /// Follow every outgoing edge
    Continue,
    /// Follow only edges whose source handle matches the branch value
    Branch(bool),
}

/// Executes flow traversals for one deployed bot
pub struct FlowExecutor {
    /// Bot this executor belongs to
    bot_id: String,

    /// The bot's flow graph, immutable for this executor's lifetime
    graph: Arc<FlowGraph>,

    /// Outbound message port
    sender: Arc<dyn MessageSender>,

    /// Best-effort interaction logger
    logger: Arc<dyn InteractionLogger>,
}

impl FlowExecutor {
    /// Create a new executor for a deployed bot
    pub fn new(
        bot_id: impl Into<String>,
        graph: Arc<FlowGraph>,
        sender: Arc<dyn MessageSender>,
        logger: Arc<dyn InteractionLogger>,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            graph,
            sender,
            logger,
        }
    }

    /// Process one inbound event end to end
    ///
    /// Matches triggers, runs one traversal per match, and records the
    /// interaction. A failure on one triggered path halts only that path;
    /// other matched triggers still run.
    pub async fn process_event(&self, event: InboundEvent) {
        let span = info_span!(
            "process_event",
            bot_id = %self.bot_id,
            chat_id = event.chat_id,
            update_id = event.update_id,
        );
        async move {
            debug!(text = %event.text, "Processing inbound event");

            let matched = trigger::match_triggers(&event, &self.graph);
            if matched.is_empty() {
                debug!("No trigger matched, sending fallback message");
                if let Err(err) = self.sender.send_message(event.chat_id, FALLBACK_MESSAGE).await {
                    warn!(?err, "Failed to send fallback message");
                }
                return;
            }

            for trigger_node in matched {
                self.run_traversal(trigger_node, &event).await;
            }

            self.logger
                .log_interaction(InteractionRecord::message_received(&self.bot_id, &event))
                .await;
        }
        .instrument(span)
        .await
    }

    /// Run one traversal from a matched trigger node
    ///
    /// Any failure halts this path and sends a single generic failure
    /// message to the user, best-effort.
    async fn run_traversal(&self, trigger_node: &Node, event: &InboundEvent) {
        let mut context = ExecutionContext::new(event);
        let mut visited = HashSet::new();

        if let Err(err) = self
            .execute_node(trigger_node, &mut context, &mut visited, 0)
            .await
        {
            error!(?err, node_id = %trigger_node.id, "Traversal halted");
            if let Err(send_err) = self.sender.send_message(event.chat_id, FAILURE_MESSAGE).await {
                warn!(?send_err, "Failed to send failure message");
            }
        }
    }

    /// Execute a node and recurse into its selected successors
    fn execute_node<'a>(
        &'a self,
        node: &'a Node,
        context: &'a mut ExecutionContext,
        visited: &'a mut HashSet<String>,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send + 'a>> {
        Box::pin(async move {
            if depth >= MAX_TRAVERSAL_DEPTH {
                return Err(CoreError::DepthLimitExceeded(node.id.clone()));
            }

            if !visited.insert(node.id.clone()) {
                debug!(node_id = %node.id, "Node already visited on this traversal, stopping");
                return Ok(());
            }

            let outcome = self.dispatch(node, context).await?;

            let next_ids: Vec<&str> = self
                .graph
                .successors(&node.id)
                .filter(|edge| edge_selected(&outcome, edge))
                .map(|edge| edge.target.as_str())
                .collect();

            for next_id in next_ids {
                // Endpoints were checked at load time
                if let Some(next) = self.graph.node(next_id) {
                    self.execute_node(next, context, visited, depth + 1).await?;
                }
            }

            Ok(())
        })
    }

    /// Dispatch a node's side effect by kind
    async fn dispatch(
        &self,
        node: &Node,
        context: &mut ExecutionContext,
    ) -> Result<NodeOutcome, CoreError> {
        debug!(node_id = %node.id, kind = ?node.kind, "Executing node");

        match node.kind {
            // Entry point only; matching already happened
            NodeKind::Trigger => Ok(NodeOutcome::Continue),

            NodeKind::Action => {
                if let Some(message) = &node.data.message {
                    self.sender.send_message(context.chat_id, message).await?;
                }
                Ok(NodeOutcome::Continue)
            }

            NodeKind::Logic => {
                if let Some(delay) = node.data.delay {
                    // Suspends only this traversal's task, never a shared worker
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }

                if let (Some(variable), Some(value)) = (&node.data.variable, &node.data.value) {
                    context.set_variable(variable.clone(), value.clone());
                }

                if let Some(condition) = &node.data.condition {
                    let result = evaluate_condition(condition, context);
                    debug!(node_id = %node.id, condition = %condition, result, "Evaluated condition");
                    return Ok(NodeOutcome::Branch(result));
                }

                Ok(NodeOutcome::Continue)
            }

            NodeKind::Integration => {
                debug!(
                    node_id = %node.id,
                    label = node.data.label.as_deref().unwrap_or_default(),
                    "Integration node executed"
                );
                Ok(NodeOutcome::Continue)
            }
        }
    }
}

/// Check whether an edge should be followed given the node's outcome
fn edge_selected(outcome: &NodeOutcome, edge: &Edge) -> bool {
    match outcome {
        NodeOutcome::Continue => true,
        NodeOutcome::Branch(value) => {
            let handle = if *value { "true" } else { "false" };
            edge.source_handle.as_deref() == Some(handle)
        }
    }
}

/// Evaluate a condition expression against the execution context
///
/// Supported forms: `<name> == <literal>` (string equality against a context
/// variable, with `text` as a builtin) and a bare `<name>` testing variable
/// presence. Anything else evaluates to false.
fn evaluate_condition(expression: &str, context: &ExecutionContext) -> bool {
    let expression = expression.trim();

    if let Some((name, literal)) = expression.split_once("==") {
        let name = name.trim();
        let literal = literal.trim().trim_matches('"').trim_matches('\'');
        return context.lookup(name) == Some(literal);
    }

    if !expression.is_empty() && !expression.contains(char::is_whitespace) {
        return context.lookup(expression).is_some();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NoopInteractionLogger;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records sends; optionally fails any message containing a marker
    struct RecordingSender {
        sent: Mutex<Vec<(i64, String)>>,
        fail_containing: Option<String>,
    }

    impl RecordingSender {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail_containing: None,
            })
        }

        fn failing_on(marker: &str) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail_containing: Some(marker.to_string()),
            })
        }

        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), CoreError> {
            if let Some(marker) = &self.fail_containing {
                if text.contains(marker.as_str()) {
                    return Err(CoreError::SendError("injected failure".to_string()));
                }
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    struct RecordingLogger {
        records: Mutex<Vec<InteractionRecord>>,
    }

    impl RecordingLogger {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl InteractionLogger for RecordingLogger {
        async fn log_interaction(&self, record: InteractionRecord) {
            self.records.lock().unwrap().push(record);
        }
    }

    fn event(text: &str) -> InboundEvent {
        InboundEvent {
            chat_id: 100,
            user_id: 7,
            text: text.to_string(),
            update_id: 1,
        }
    }

    fn executor(graph: FlowGraph, sender: Arc<RecordingSender>) -> FlowExecutor {
        FlowExecutor::new(
            "bot_test",
            Arc::new(graph),
            sender,
            Arc::new(NoopInteractionLogger),
        )
    }

    fn welcome_graph() -> FlowGraph {
        FlowGraph::from_value(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "command": "/start" } },
                { "id": "a1", "type": "action", "data": { "message": "Welcome!" } }
            ],
            "edges": [
                { "id": "e1", "source": "t1", "target": "a1" }
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_command_trigger_sends_welcome() {
        let sender = RecordingSender::new();
        let executor = executor(welcome_graph(), sender.clone());

        executor.process_event(event("/start")).await;

        assert_eq!(sender.texts(), vec!["Welcome!".to_string()]);
    }

    #[tokio::test]
    async fn test_unmatched_event_sends_fallback_exactly_once() {
        let sender = RecordingSender::new();
        let executor = executor(welcome_graph(), sender.clone());

        executor.process_event(event("hello")).await;

        assert_eq!(sender.texts(), vec![FALLBACK_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_interaction_logged_after_matched_event() {
        let sender = RecordingSender::new();
        let logger = RecordingLogger::new();
        let executor = FlowExecutor::new(
            "bot_test",
            Arc::new(welcome_graph()),
            sender.clone(),
            logger.clone(),
        );

        executor.process_event(event("/start")).await;

        let records = logger.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bot_id, "bot_test");
        assert_eq!(records[0].interaction_type, "message_received");
        assert_eq!(records[0].message_text, "/start");
    }

    #[tokio::test]
    async fn test_cycle_guard_stops_back_edge() {
        let sender = RecordingSender::new();
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "command": "/loop" } },
                { "id": "a1", "type": "action", "data": { "message": "one" } },
                { "id": "a2", "type": "action", "data": { "message": "two" } }
            ],
            "edges": [
                { "id": "e1", "source": "t1", "target": "a1" },
                { "id": "e2", "source": "a1", "target": "a2" },
                { "id": "e3", "source": "a2", "target": "a1" }
            ]
        }))
        .unwrap();
        let executor = executor(graph, sender.clone());

        executor.process_event(event("/loop")).await;

        // Each node runs exactly once despite the back-edge
        assert_eq!(sender.texts(), vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn test_branch_follows_only_matching_handle() {
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "command": "/check" } },
                { "id": "l1", "type": "logic", "data": { "variable": "plan", "value": "pro" } },
                { "id": "l2", "type": "logic", "data": { "condition": "plan == pro" } },
                { "id": "a1", "type": "action", "data": { "message": "Pro plan" } },
                { "id": "a2", "type": "action", "data": { "message": "Basic plan" } }
            ],
            "edges": [
                { "id": "e1", "source": "t1", "target": "l1" },
                { "id": "e2", "source": "l1", "target": "l2" },
                { "id": "e3", "source": "l2", "target": "a1", "sourceHandle": "true" },
                { "id": "e4", "source": "l2", "target": "a2", "sourceHandle": "false" }
            ]
        }))
        .unwrap();
        let sender = RecordingSender::new();
        let executor = executor(graph, sender.clone());

        executor.process_event(event("/check")).await;

        assert_eq!(sender.texts(), vec!["Pro plan".to_string()]);
    }

    #[tokio::test]
    async fn test_branch_false_takes_other_edge() {
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "command": "/check" } },
                { "id": "l1", "type": "logic", "data": { "condition": "plan == pro" } },
                { "id": "a1", "type": "action", "data": { "message": "Pro plan" } },
                { "id": "a2", "type": "action", "data": { "message": "Basic plan" } }
            ],
            "edges": [
                { "id": "e1", "source": "t1", "target": "l1" },
                { "id": "e2", "source": "l1", "target": "a1", "sourceHandle": "true" },
                { "id": "e3", "source": "l1", "target": "a2", "sourceHandle": "false" }
            ]
        }))
        .unwrap();
        let sender = RecordingSender::new();
        let executor = executor(graph, sender.clone());

        executor.process_event(event("/check")).await;

        assert_eq!(sender.texts(), vec!["Basic plan".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_path_halts_but_other_trigger_runs() {
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "keyword": "ping" } },
                { "id": "a1", "type": "action", "data": { "message": "boom" } },
                { "id": "a2", "type": "action", "data": { "message": "never reached" } },
                { "id": "t2", "type": "trigger", "data": { "keyword": "ping" } },
                { "id": "a3", "type": "action", "data": { "message": "pong" } }
            ],
            "edges": [
                { "id": "e1", "source": "t1", "target": "a1" },
                { "id": "e2", "source": "a1", "target": "a2" },
                { "id": "e3", "source": "t2", "target": "a3" }
            ]
        }))
        .unwrap();
        let sender = RecordingSender::failing_on("boom");
        let executor = executor(graph, sender.clone());

        executor.process_event(event("ping")).await;

        // First path halts with one failure message; second path still runs
        assert_eq!(
            sender.texts(),
            vec![FAILURE_MESSAGE.to_string(), "pong".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_node_suspends_then_continues() {
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "command": "/wait" } },
                { "id": "l1", "type": "logic", "data": { "delay": 30 } },
                { "id": "a1", "type": "action", "data": { "message": "done waiting" } }
            ],
            "edges": [
                { "id": "e1", "source": "t1", "target": "l1" },
                { "id": "e2", "source": "l1", "target": "a1" }
            ]
        }))
        .unwrap();
        let sender = RecordingSender::new();
        let executor = executor(graph, sender.clone());

        let started = tokio::time::Instant::now();
        executor.process_event(event("/wait")).await;

        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(sender.texts(), vec!["done waiting".to_string()]);
    }

    #[tokio::test]
    async fn test_depth_limit_halts_runaway_chain() {
        // A straight chain longer than the depth bound
        let mut nodes = vec![json!({
            "id": "t0", "type": "trigger", "data": { "command": "/go" }
        })];
        let mut edges = Vec::new();
        let chain_len = MAX_TRAVERSAL_DEPTH + 10;
        for i in 1..=chain_len {
            nodes.push(json!({
                "id": format!("a{}", i),
                "type": "action",
                "data": { "message": format!("step {}", i) }
            }));
            let source = if i == 1 { "t0".to_string() } else { format!("a{}", i - 1) };
            edges.push(json!({
                "id": format!("e{}", i),
                "source": source,
                "target": format!("a{}", i)
            }));
        }
        let graph =
            FlowGraph::from_value(json!({ "nodes": nodes, "edges": edges })).unwrap();
        let sender = RecordingSender::new();
        let executor = executor(graph, sender.clone());

        executor.process_event(event("/go")).await;

        let texts = sender.texts();
        // Depth bound cuts the chain short and the user gets one failure message
        assert_eq!(texts.len(), MAX_TRAVERSAL_DEPTH);
        assert_eq!(texts.last().unwrap(), FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_integration_node_is_a_no_op_passthrough() {
        let graph = FlowGraph::from_value(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "command": "/go" } },
                { "id": "i1", "type": "integration", "data": { "label": "CRM sync" } },
                { "id": "a1", "type": "action", "data": { "message": "after integration" } }
            ],
            "edges": [
                { "id": "e1", "source": "t1", "target": "i1" },
                { "id": "e2", "source": "i1", "target": "a1" }
            ]
        }))
        .unwrap();
        let sender = RecordingSender::new();
        let executor = executor(graph, sender.clone());

        executor.process_event(event("/go")).await;

        assert_eq!(sender.texts(), vec!["after integration".to_string()]);
    }

    #[test]
    fn test_evaluate_condition_forms() {
        let mut context = ExecutionContext::new(&event("hello there"));
        context.set_variable("plan", "pro");

        assert!(evaluate_condition("plan == pro", &context));
        assert!(evaluate_condition("plan == \"pro\"", &context));
        assert!(!evaluate_condition("plan == basic", &context));
        assert!(evaluate_condition("text == hello there", &context));
        assert!(evaluate_condition("plan", &context));
        assert!(!evaluate_condition("missing", &context));
        assert!(!evaluate_condition("", &context));
        assert!(!evaluate_condition("not a condition", &context));
    }
}
