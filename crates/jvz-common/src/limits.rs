//! Centralized limits and thresholds for the jvz front end.
//!
//! Recursive algorithms over syntax trees and type hierarchies are bounded
//! here so that pathological inputs degrade into diagnostics instead of
//! overflowing the stack or looping forever.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth for recursive-descent parsing.
///
/// Each nested expression, statement or type passes through several parser
/// frames. When this depth is exceeded the parser reports a "nesting too
/// deep" diagnostic and skips the construct.
///
/// # Java example
///
/// ```java
/// int x = ((((((((((((((((((((1 /* ... thousands of levels ... */))))))))))));
/// ```
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 400;

/// Maximum depth for supertype walks (member lookup, subtyping).
///
/// Cyclic inheritance (`class A extends B {}`, `class B extends A {}`) is a
/// compile error in Java but is valid input to a front end that must not hang.
pub const MAX_SUPERTYPE_DEPTH: u32 = 64;

/// Maximum depth for nested type signature decoding in class files.
pub const MAX_SIGNATURE_DEPTH: u32 = 64;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of scopes walked when resolving a simple name.
pub const MAX_SCOPE_WALK_ITERATIONS: u32 = 10_000;

/// Maximum number of tokens skipped by a single recovery before the parser
/// gives up on finding a synchronizing token and returns to its caller.
pub const MAX_RESYNC_SKIP: u32 = 100_000;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Upper bound on nodes preallocated for one compilation unit.
pub const MAX_NODE_PREALLOC: usize = 1_000_000;

/// Largest class file entry read from an archive or class directory.
pub const MAX_CLASS_FILE_BYTES: u64 = 64 * 1024 * 1024;
