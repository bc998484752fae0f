#![allow(dead_code)]

use alloy_node_bindings::{
    Anvil,
    AnvilInstance,
};
use evm_semantics::{
    Harness,
    RpcProvider,
};

/// Installs a fmt subscriber when `TEST_TRACE` is set, e.g. `TEST_TRACE=debug`.
pub fn init_tracing() {
    use tracing_subscriber::{
        filter::filter_fn,
        prelude::*,
    };

    let Ok(value) = std::env::var("TEST_TRACE") else {
        return;
    };
    let level = match value.as_str() {
        "true" | "debug" | "on" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => return,
    };

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(filter_fn(move |metadata| metadata.level() <= &level))
        .try_init();
}

/// Harness talking to a freshly spawned anvil. The instance must outlive the harness.
pub async fn anvil_harness() -> (Harness<RpcProvider>, AnvilInstance) {
    let anvil = Anvil::new().spawn();
    let provider = RpcProvider::connect(&anvil.endpoint()).await.unwrap();
    let harness = Harness::with_fixtures(provider).unwrap();
    (harness, anvil)
}
