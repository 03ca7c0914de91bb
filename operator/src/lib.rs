pub mod akuity;
pub mod bridge;
pub mod compare;
pub mod config;
pub mod convergence;
pub mod crd;
pub mod error;
pub mod event;
pub mod external;
pub mod finalizer;
pub mod late_init;
pub mod manifest;
pub mod metrics;
pub mod normalize;
pub mod reconcile;

#[cfg(test)]
mod fixtures;
