//! Transform adapters from upstream API shapes into gateway-facing models.

pub(crate) mod label;
