#![allow(dead_code)]

use myproduct_kernel::config::load_settings;
use myproduct_server::Server;
use myproduct_testing::ContextRoot;
use myproduct_testing::anyhow::{Context, Result};

pub const FIXTURE_SETTINGS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/server.toml");

/// Boots the server from the fixture settings without binding a socket.
#[derive(Debug)]
pub struct ServerApp;

impl ContextRoot for ServerApp {
    const NAME: &'static str = "server";
    type Context = Server;

    async fn boot() -> Result<Self::Context> {
        let settings = load_settings(Some(FIXTURE_SETTINGS)).context("fixture settings")?;
        Server::builder().settings(settings).build().await
    }
}

pub type IntegrationTest = myproduct_testing::FullContext<ServerApp>;
