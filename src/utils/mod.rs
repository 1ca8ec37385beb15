//! Internal helpers shared by the label source.

pub(crate) mod query;
