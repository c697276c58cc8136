//! Remote synchronization boundary.
//!
//! # Responsibility
//! - Define the asynchronous CRUD contract to the authoritative note store.
//! - Provide an in-process simulated remote with latency and failure
//!   injection.
//!
//! # Invariants
//! - Every remote failure surfaces as `RemoteError { status, message }`.
//! - Adapters never mutate the local collection; the store owns it.

pub mod remote;
pub mod simulated;
