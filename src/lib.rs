//! Stackalias - alias-aware CloudFormation template partitioning
//!
//! Stackalias splits one compiled infrastructure template into two cooperating
//! templates: a long-lived *base* template owning shared infrastructure, and a
//! per-alias template owning infrastructure whose identity or configuration is
//! specific to a named deployment alias. It relocates resources, renames them
//! where aliases would otherwise collide, and rewrites every structural
//! reference and dependency so neither template is left with a dangling
//! pointer.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Domain types, the template grammar, reference traversal, and
//!   naming conventions
//! - [`stage`] - Per-endpoint stage configuration resolution and the alias
//!   stage resource builder
//! - [`engine`] - Orchestrates the partition pass: validate -> exposure ->
//!   exports -> guard -> deployment -> stage -> methods -> authorizers ->
//!   permissions
//!
//! # Correctness Invariants
//!
//! 1. All configuration is validated before any template is mutated
//! 2. After partitioning, no surviving reference or dependency names a
//!    resource by its pre-rename identifier
//! 3. Emitted stage settings never carry an option at its declared default
//! 4. The pass is deterministic: same inputs, same outputs

pub mod core;
pub mod engine;
pub mod stage;
