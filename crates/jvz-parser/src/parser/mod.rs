//! Parser module: node model, arena and the recursive-descent parser.

pub mod base;
pub mod flags;
pub mod node;
mod node_access;
mod node_arena;
pub mod parse_rules;
mod state;
mod state_declarations;
mod state_expressions;
mod state_statements;
mod state_types;

pub use base::{NodeIndex, NodeList};
pub use flags::{ModifierFlags, NodeFlags};
pub use node::*;
pub use state::{ParseResult, ParserState, parse};
