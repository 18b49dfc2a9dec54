//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains (where it needs them):
//! - domain/     - Pure data types
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Algorithms and storage

pub mod call_graph;
pub mod export;
pub mod pag;
pub mod points_to;
pub mod scc;
