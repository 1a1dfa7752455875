//! Domain model for the Botflow runtime

/// Inbound event and interaction record types
pub mod event;

/// Flow graph model
pub mod flow_graph;

/// Port traits implemented by infrastructure
pub mod ports;
