pub mod context;
pub mod error;
pub mod orchestrator;
pub mod queue;
pub mod requester;
pub mod resolver;
pub mod sequential;
pub mod signal;
pub mod sink;
pub mod source;
