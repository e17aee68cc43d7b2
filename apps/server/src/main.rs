use myproduct_kernel::domain::constants::DEFAULT_SETTINGS_FILE;
use myproduct_server::{Server, startup};

#[myproduct_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let booted = startup(DEFAULT_SETTINGS_FILE)?;
    let _log = booted.logger;

    Server::builder().config(booted.config).build().await?.run().await
}
