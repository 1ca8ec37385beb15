#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod server;

mod render;
mod sources;
mod transform;
mod utils;

pub use sources::http_client;
pub use sources::openfda::OpenFdaClient;
