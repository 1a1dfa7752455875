//!
//! Botflow Core - Flow execution engine for the Botflow platform
//!
//! This crate defines the flow graph model, trigger matching, and the
//! traversal executor. It performs no network or storage I/O of its own;
//! infrastructure crates supply the [`MessageSender`] and
//! [`InteractionLogger`] ports.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - graph model, events, and port traits
pub mod domain;

/// Error types
pub mod error;

/// Flow traversal executor
pub mod executor;

/// Trigger matching
pub mod trigger;

// Re-export key types
pub use error::CoreError;

pub use domain::event::{InboundEvent, InteractionRecord};
pub use domain::flow_graph::{Edge, FlowGraph, Node, NodeData, NodeKind};
pub use domain::ports::{InteractionLogger, MessageSender, NoopInteractionLogger};

pub use executor::{
    ExecutionContext, FlowExecutor, FAILURE_MESSAGE, FALLBACK_MESSAGE, MAX_TRAVERSAL_DEPTH,
};
pub use trigger::match_triggers;
