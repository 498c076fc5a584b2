//! pipeflow - periodic DAG workflow engine for script pipelines
//!
//! A project describes a workflow as a directed graph of tasks, each
//! invoking an external script. The engine validates the graph (structure
//! and acyclicity), then runs it repeatedly on a fixed-period trigger,
//! walking tasks in dependency order with concurrent fan-out.

pub mod error;
pub mod executor;
pub mod graph;
pub mod logging;
pub mod models;
pub mod parser;
pub mod runner;
pub mod scheduler;
pub mod store;
pub mod validator;
