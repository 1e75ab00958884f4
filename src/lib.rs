//! Officine: a compile-time node-graph compiler
//!
//! **Officine turns a declarative application composition into a wired
//! execution graph for a runtime builder.**
//!
//! The composition names sections, managed objects, teams, governance,
//! administration and suppliers; one compile pass resolves every
//! cross-reference, auto-wires dependencies and responsibilities, loads the
//! derived type descriptors, and emits ordered bind calls into a
//! [`RuntimeSink`]. The runtime never re-validates — anything it receives
//! has already survived the pass.
//!
//! # Core Principles
//!
//! - **Issues, not exceptions**: a configuration problem halts the
//!   offending node, never the pass. One pass reports every problem at
//!   once.
//! - **All-or-nothing emission**: the sink is withheld unless the pass
//!   finishes with zero issues.
//! - **Declaration order is program order**: siblings, auto-wire targets
//!   and emitted bind calls all follow the order the composition declares.
//! - **Registries over scanning**: sources and types are resolved through
//!   name-keyed tables populated at startup.
//!
//! # Architecture
//!
//! ## The Compile Graph
//!
//! Every configured element is a [`Node`](nodes::node::Node) in one
//! arena-backed tree rooted at the OfficeFloor. Nodes advance through
//! Create → Initialise → Source → AutoWire → LoadTypes → Build; links
//! between them are typed roles — single-valued slots keep the first
//! write, ordering sets keep insertion order.
//!
//! ## Auto-Wiring
//!
//! An [`AutoWire`] is a `(qualifier, type)` key. Scoped
//! [`AutoWirer`]s match requirements against offered targets in
//! registration order, office scopes shadowing the OfficeFloor scope, with
//! lazy targets materialised only when selected.
//!
//! ## Phases and Caches
//!
//! The per-pass [`CompileContext`] memoizes every derived type descriptor
//! so a descriptor is computed at most once per pass, however many nodes
//! consult it.
//!
//! # Example
//!
//! ```no_run
//! use officine::{Compiler, RecordingSink};
//!
//! let compiler = Compiler::stock();
//! let mut sink = RecordingSink::default();
//! let report = compiler.compile_str(
//!     r#"
//!     [[managed_object_sources]]
//!     name = "DB"
//!     source = "value"
//!     [managed_object_sources.properties]
//!     type = "example.Connection"
//!
//!     [[managed_objects]]
//!     name = "CONNECTION"
//!     source = "DB"
//!     type = "example.Connection"
//!     "#,
//!     &mut sink,
//! )?;
//! assert!(report.built);
//! # Ok::<(), officine::CompileError>(())
//! ```

pub mod compiler;
pub mod core;
pub mod emit;
pub mod model;
pub mod nodes;

pub use compiler::{CompileReport, Compiler};
pub use crate::core::autowire::{AutoWire, AutoWireLink, AutoWirer, MatchDirection, TypeRegistry};
pub use crate::core::compile_context::{CompileContext, MBeanRegistration};
pub use crate::core::error::CompileError;
pub use crate::core::issues::{IssueCollector, NodeIssue};
pub use crate::core::sources::{Property, SourceFailure, SourceRegistry};
pub use emit::{RecordingSink, RuntimeSink, SourceBinding};
pub use model::CompositionModel;
pub use nodes::graph::CompileGraph;
pub use nodes::kinds::NodeKind;
pub use nodes::links::LinkRole;
pub use nodes::node::{NodeId, NodePhase};
