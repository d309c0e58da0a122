pub mod dashboard;
pub mod ledger;
pub mod metrics;
pub mod nutrition;
pub mod reconciler;
pub mod registry;
pub mod session;
pub mod timer;
