//! Shared infrastructure utilities for the Banker's workspace.
//!
//! These live outside the domain-pure `banker-types` and `banker-core`
//! crates because they touch the filesystem:
//!
//! - **`state_file`**: Crash-safe state persistence (temp + rename)

pub mod state_file;

pub use state_file::{
    SyncPolicy, WriteOptions, read_state_file, recover_backup, write_state_file,
};
