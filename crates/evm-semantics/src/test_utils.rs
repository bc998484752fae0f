//! Helpers shared by unit and integration tests.

use crate::{
    config::ChainConfig,
    fixtures::SEMANTIC_TESTS,
    harness::Harness,
    primitives::Address,
    provider::{
        CallProvider,
        LocalProvider,
    },
};

/// Harness over a fresh local chain with the fixtures registered.
pub fn local_harness() -> Harness<LocalProvider> {
    local_harness_with(ChainConfig::default())
}

pub fn local_harness_with(config: ChainConfig) -> Harness<LocalProvider> {
    Harness::with_fixtures(LocalProvider::new(config)).unwrap()
}

/// Deploys `SemanticTests` and returns its address.
pub async fn deploy_semantic_tests<P: CallProvider>(harness: &Harness<P>) -> Address {
    harness.deploy(SEMANTIC_TESTS).await.unwrap()
}
