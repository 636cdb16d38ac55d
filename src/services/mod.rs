/// Health probes and the admin announce endpoint
pub mod api;
/// The periodic notification scheduler
pub mod notifier;
