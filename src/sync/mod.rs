//! Local/remote economy reconciliation.

pub mod reconciler;

pub use reconciler::{sync_once, SyncReconciler, SyncResult};
