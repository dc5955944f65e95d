// Resilience audit core: data model, scoring, wizard state machine and the
// per-user state container, plus the HTTP handlers that drive them.

pub mod catalog;
pub mod handlers;
pub mod models;
pub mod report;
pub mod scoring;
pub mod session;
pub mod store;
pub mod wizard;
