#![warn(missing_docs)]

//! `script-graph` exposes traced and scripted computation graphs to a conversion engine
//! through a framework-agnostic [`Decoder`].
//!
//! A framework adapter implements the [`NativeNode`] and [`NativeValue`] capability traits;
//! the decoder answers structural queries (operation kind, inputs, outputs, shapes, element
//! types, constant payloads) and walks nested regions through a visitor. The [`traced`]
//! module provides such an adapter over a JSON graph dump, and [`walk`] drives a complete
//! traversal the way a conversion engine would.
//!
//! ```
//! use script_graph::traced::TracedGraph;
//! use script_graph::Decoder;
//!
//! let graph = TracedGraph::from_json(r#"{
//!     "values": [{"id": 0, "type": {"tensor": {"dtype": "torch.float32", "sizes": [2]}}},
//!                {"id": 1, "type": {"tensor": {"dtype": "torch.float32", "sizes": [2]}}}],
//!     "inputs": [0],
//!     "outputs": [1],
//!     "nodes": [{"kind": "aten::relu", "inputs": [0], "outputs": [1]}]
//! }"#).unwrap();
//!
//! let decoder = Decoder::new(graph.root());
//! let mut kinds = Vec::new();
//! decoder
//!     .visit_region(0, |node| {
//!         kinds.push(node.operation_kind().to_string());
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(kinds, ["aten::relu"]);
//! ```

mod constant;
mod decoder;
mod error;

pub mod ir;
pub mod native;
pub mod traced;
pub mod type_table;
pub mod walk;

/// Decoder configuration.
pub mod config;

/// Console logger for the command line tool.
pub mod logger;

pub use constant::CONSTANT_KIND;
pub use decoder::*;
pub use error::*;
pub use native::{Literal, NativeNode, NativeValue, ValueType};
pub use type_table::TypeTable;
