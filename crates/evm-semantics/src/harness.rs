use crate::{
    artifact::ContractArtifact,
    error::{
        ArtifactError,
        CallError,
        HarnessError,
    },
    fixtures,
    primitives::{
        Address,
        Bytes,
        DynSolValue,
    },
    provider::CallProvider,
    request::CallRequest,
    revert::{
        ErrorRegistry,
        RevertError,
    },
};

use std::collections::BTreeMap;

use tracing::{
    debug,
    instrument,
};

/// Submits requests through a [`CallProvider`] and decodes failures against the errors of every
/// registered artifact.
#[derive(Debug)]
pub struct Harness<P> {
    provider: P,
    registry: ErrorRegistry,
    artifacts: BTreeMap<String, ContractArtifact>,
}

impl<P: CallProvider> Harness<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            registry: ErrorRegistry::builtin(),
            artifacts: BTreeMap::new(),
        }
    }

    /// Harness with every fixture contract registered.
    pub fn with_fixtures(provider: P) -> Result<Self, HarnessError> {
        Self::with_artifacts(provider, fixtures::all()?)
    }

    /// Harness with each of `artifacts` registered.
    pub fn with_artifacts(
        provider: P,
        artifacts: impl IntoIterator<Item = ContractArtifact>,
    ) -> Result<Self, HarnessError> {
        let mut harness = Self::new(provider);
        for artifact in artifacts {
            harness.register(artifact)?;
        }
        Ok(harness)
    }

    /// Registers `artifact` under its name, along with the errors of its ABI.
    ///
    /// Registering a name again replaces the artifact. Error definitions are never removed.
    pub fn register(&mut self, artifact: ContractArtifact) -> Result<(), HarnessError> {
        let added = self
            .registry
            .register_abi(&artifact.abi)
            .map_err(ArtifactError::from)?;
        debug!(target: "harness", name = %artifact.name, errors = added, "Registered artifact");
        self.artifacts.insert(artifact.name.clone(), artifact);
        Ok(())
    }

    pub fn artifact(&self, name: &str) -> Result<&ContractArtifact, HarnessError> {
        self.artifacts
            .get(name)
            .ok_or_else(|| HarnessError::UnknownArtifact(name.to_string()))
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &ContractArtifact> {
        self.artifacts.values()
    }

    pub fn registry(&self) -> &ErrorRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Deployment request of the artifact registered as `name`, without constructor arguments.
    pub fn deploy_transaction(&self, name: &str) -> Result<CallRequest, HarnessError> {
        Ok(self.artifact(name)?.deploy_transaction(&[])?)
    }

    /// Request calling `function` of the `contract` artifact deployed at `address`.
    pub fn function_call(
        &self,
        address: Address,
        contract: &str,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<CallRequest, HarnessError> {
        let data = self.artifact(contract)?.encode_call(function, args)?;
        Ok(CallRequest::call(address, data))
    }

    /// Simulates `request`. Revert data is decoded with every registered error.
    pub async fn call(&self, request: CallRequest) -> Result<Bytes, CallError> {
        self.provider
            .call(request)
            .await
            .map_err(|err| err.redecode(&self.registry))
    }

    /// Simulates `request`, which must revert with data matching a known error.
    #[instrument(level = "debug", skip_all, target = "harness")]
    pub async fn expect_revert(&self, request: CallRequest) -> Result<RevertError, HarnessError> {
        match self.call(request).await {
            Ok(output) => Err(HarnessError::NoRevert { output }),
            Err(CallError::Revert {
                revert: Some(revert),
                ..
            }) => {
                debug!(target: "harness", %revert, "Call reverted");
                Ok(revert)
            }
            Err(CallError::Revert { revert: None, data }) => {
                Err(HarnessError::UndecodedRevert { data })
            }
            Err(err) => Err(HarnessError::UnexpectedFailure(err)),
        }
    }

    /// Deploys the artifact registered as `name`.
    pub async fn deploy(&self, name: &str) -> Result<Address, HarnessError> {
        let request = self.deploy_transaction(name)?;
        let address = self
            .provider
            .deploy(request)
            .await
            .map_err(|err| err.redecode(&self.registry))?;
        Ok(address)
    }

    /// Calls `function` and decodes its return values.
    pub async fn view(
        &self,
        address: Address,
        contract: &str,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, HarnessError> {
        let request = self.function_call(address, contract, function, args)?;
        let output = self.call(request).await?;
        Ok(self.artifact(contract)?.decode_output(function, &output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FixtureError,
        fixtures::{
            CREATE_FAIL_CUSTOM,
            CREATE_FAIL_REQUIRE,
            ERROR_MESSAGE,
            ERROR_NUM,
            SEMANTIC_TESTS,
        },
        primitives::{
            JsonAbi,
            U256,
            bytes,
        },
        provider::LocalProvider,
    };
    use alloy_json_abi::Param;

    fn harness() -> Harness<LocalProvider> {
        Harness::with_fixtures(LocalProvider::default()).unwrap()
    }

    #[tokio::test]
    async fn test_custom_error_needs_registration() {
        let harness = harness();
        let request = harness.deploy_transaction(CREATE_FAIL_CUSTOM).unwrap();

        // The provider alone only knows the builtin errors.
        let err = harness.provider().call(request.clone()).await.unwrap_err();
        assert!(matches!(err, CallError::Revert { revert: None, .. }));

        let revert = harness.expect_revert(request).await.unwrap();
        assert_eq!(revert.name, "CustomError");
        assert_eq!(revert.arg(0), Some(&DynSolValue::FixedBytes(ERROR_NUM, 32)));
    }

    #[tokio::test]
    async fn test_string_error() {
        let harness = harness();
        let request = harness.deploy_transaction(CREATE_FAIL_REQUIRE).unwrap();
        let revert = harness.expect_revert(request).await.unwrap();
        assert!(revert.is_string_error());
        assert_eq!(revert.arg_string(0).unwrap(), ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_expect_revert_on_success() {
        let harness = harness();
        let request = harness.deploy_transaction(SEMANTIC_TESTS).unwrap();
        let err = harness.expect_revert(request).await.unwrap_err();
        assert!(matches!(err, HarnessError::NoRevert { .. }));
    }

    #[tokio::test]
    async fn test_expect_revert_undecoded() {
        let harness = harness();
        let err = harness
            .expect_revert(CallRequest::create(bytes!("5f5ffd")))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::UndecodedRevert { data } if data.is_empty()));
    }

    #[tokio::test]
    async fn test_deploy_failure_is_decoded() {
        let harness = harness();
        let err = harness.deploy(CREATE_FAIL_CUSTOM).await.unwrap_err();
        let HarnessError::Call(err) = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(err.revert().unwrap().name, "CustomError");
    }

    #[test]
    fn test_with_artifacts_keeps_abi_error() {
        let mut abi = JsonAbi::new();
        abi.errors.insert(
            "Odd".to_string(),
            vec![alloy_json_abi::Error {
                name: "Odd".to_string(),
                inputs: vec![Param {
                    ty: "uint7".to_string(),
                    name: "value".to_string(),
                    components: vec![],
                    internal_type: None,
                }],
            }],
        );
        let artifact = ContractArtifact::new("Odd", abi, bytes!("00"));

        let err = Harness::with_artifacts(LocalProvider::default(), [artifact]).unwrap_err();
        assert!(matches!(err, HarnessError::Artifact(ArtifactError::Abi(_))));
    }

    #[test]
    fn test_fixture_error_converts() {
        let err = HarnessError::from(FixtureError::Assembly {
            name: "Broken",
            reason: "too long".to_string(),
        });
        assert!(matches!(
            err,
            HarnessError::Fixture(FixtureError::Assembly { name: "Broken", .. })
        ));
    }

    #[tokio::test]
    async fn test_view() {
        let harness = harness();
        let address = harness.deploy(SEMANTIC_TESTS).await.unwrap();
        let values = harness
            .view(
                address,
                SEMANTIC_TESTS,
                "testViewLength",
                &[DynSolValue::Uint(U256::from(64), 256)],
            )
            .await
            .unwrap();
        assert_eq!(values, vec![DynSolValue::Bytes(vec![0; 64])]);

        let err = harness
            .view(address, "Missing", "testViewLength", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::UnknownArtifact(name) if name == "Missing"));
    }
}
