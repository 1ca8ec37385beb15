//! Output renderers for CLI commands.

pub(crate) mod json;
pub(crate) mod markdown;
