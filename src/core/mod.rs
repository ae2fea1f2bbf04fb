//! core
//!
//! Core domain types and the template grammar for Stackalias.
//!
//! # Modules
//!
//! - [`types`] - Strong types: AliasName, StageName
//! - [`template`] - Template, Resource, Output, and the reference grammar
//! - [`walker`] - Schema-free reference traversal over property trees
//! - [`naming`] - Every name convention in one place
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Traversal is iterative, so deeply nested trees cannot overflow the stack
//! - All operations are deterministic

pub mod naming;
pub mod template;
pub mod types;
pub mod walker;
