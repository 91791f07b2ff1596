#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the SASV API server.
//!
//! Reads an optional TOML config from `SASV_CONFIG`, applies environment
//! overrides and serves until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use sasv_session::{Session, SessionConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config_path = std::env::var_os("SASV_CONFIG").map(PathBuf::from);
    let config = SessionConfig::load(config_path.as_deref()).map_err(std::io::Error::other)?;

    sasv_server::run_server(Arc::new(Session::new(config))).await
}
