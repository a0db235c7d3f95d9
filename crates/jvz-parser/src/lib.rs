//! Java parser and syntax tree types for the jvz front end.
//!
//! - `parser::ParserState` - recursive-descent parser with error recovery
//! - `parser::NodeArena` - per-file arena owning every syntax node
//! - `parser::NodeData` - closed set of node variants

pub mod parser;

pub use parser::node;

pub use parser::{
    ModifierFlags, Node, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList, ParseResult,
    ParserState, parse,
};

#[cfg(test)]
#[path = "../tests/state_declaration_tests.rs"]
mod state_declaration_tests;
#[cfg(test)]
#[path = "../tests/state_statement_tests.rs"]
mod state_statement_tests;
#[cfg(test)]
#[path = "../tests/state_expression_tests.rs"]
mod state_expression_tests;
#[cfg(test)]
#[path = "../tests/recovery_tests.rs"]
mod recovery_tests;
