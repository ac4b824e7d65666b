//! Schema operations and waiting on their asynchronous outcome.
//!
//! Creating, updating or deleting a table returns before the store has finished the work. The
//! [`wait`] module polls the table or index status until it reaches the expected value.

/// Table definitions and table-level operations.
pub mod table;

/// Polling until a table or index reaches a status.
pub mod wait;
