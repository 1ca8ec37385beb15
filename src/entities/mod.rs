//! Label models and the read-through lookup workflow.

pub mod label;
