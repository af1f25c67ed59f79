//! Infrastructure layer - External service implementations

pub mod dispatcher;
pub mod downstream;
pub mod logging;

pub use dispatcher::WorkflowDispatcher;
pub use downstream::{build_downstream_apis, HttpOrdersApi, HttpRegistrationApi};
