//! CLI command implementations.

mod config;
mod tls;
mod token;

pub use config::{run_config, ConfigArgs};
pub use tls::{run_tls, TlsArgs};
pub use token::{render_token, run_token, TokenArgs};
