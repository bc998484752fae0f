//! Revert reporting scenarios.
//!
//! Each [`Scenario`] submits one fixture request and checks the failure the node reports. Some
//! scenarios are disabled: they describe behavior nodes do not reliably exhibit. They are listed
//! with the reason and only run on request.

use crate::{
    error::{
        HarnessError,
        ScenarioError,
    },
    fixtures::{
        CREATE_FAIL_CUSTOM,
        CREATE_FAIL_REQUIRE,
        ERROR_MESSAGE,
        ERROR_NUM,
        SEMANTIC_TESTS,
    },
    harness::Harness,
    primitives::{
        Address,
        DynSolValue,
        U256,
        hex,
    },
    provider::CallProvider,
    request::CallRequest,
    revert::RevertError,
};

use serde::Serialize;

use tracing::{
    debug,
    info,
    instrument,
    warn,
};

/// Largest `testViewLength` argument a view call returned in full on the reference node.
pub const RETURN_LENGTH_LIMIT: usize = 1_211_104;

/// Return lengths above this are not probed when searching for the limit.
const MAX_PROBED_LENGTH: usize = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    /// Deploying `CreateFailCustom` reverts with `CustomError(ERROR_NUM)`.
    ConstructorCustomError,
    /// Deploying `CreateFailRequire` reverts with `Error(ERROR_MESSAGE)`.
    ConstructorStringError,
    /// `testViewLength(len)` returns `len` bytes, `testViewLength(len + 1)` runs out of gas.
    ViewReturnLength { len: usize },
    /// `testViewRevert()` reverts with `Error(ERROR_MESSAGE)`.
    ViewStringError,
    /// `testCustomViewRevert()` reverts with `CustomError(ERROR_NUM)`.
    ViewCustomError,
}

impl ScenarioKind {
    /// Whether the scenario calls the deployed `SemanticTests` contract.
    pub fn needs_semantic_tests(&self) -> bool {
        matches!(
            self,
            ScenarioKind::ViewReturnLength { .. }
                | ScenarioKind::ViewStringError
                | ScenarioKind::ViewCustomError
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: &'static str,
    pub kind: ScenarioKind,
    /// Why the scenario does not run by default.
    pub disabled_reason: Option<&'static str>,
}

/// What a scenario observed. Repeated runs must observe the same thing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    Reverted {
        revert: RevertError,
    },
    ReturnLength {
        returned: usize,
        /// Message of the error reported one byte above the limit.
        overflow: String,
    },
}

/// Every scenario, in execution order.
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "constructor custom error",
            kind: ScenarioKind::ConstructorCustomError,
            disabled_reason: None,
        },
        Scenario {
            name: "constructor require error",
            kind: ScenarioKind::ConstructorStringError,
            disabled_reason: None,
        },
        Scenario {
            name: "view call return length",
            kind: ScenarioKind::ViewReturnLength {
                len: RETURN_LENGTH_LIMIT,
            },
            disabled_reason: Some("the limit depends on the node's call gas cap"),
        },
        Scenario {
            name: "view call require error",
            kind: ScenarioKind::ViewStringError,
            disabled_reason: Some("nodes disagree on revert data of view calls"),
        },
        Scenario {
            name: "view call custom error",
            kind: ScenarioKind::ViewCustomError,
            disabled_reason: Some("nodes disagree on revert data of view calls"),
        },
    ]
}

impl Scenario {
    pub fn enabled(&self) -> bool {
        self.disabled_reason.is_none()
    }

    /// Runs the scenario `repeat` times, at least once. Every run must pass and observe the
    /// same result as the first.
    ///
    /// `semantic_tests` is the address of the deployed `SemanticTests` fixture, required by the
    /// view call scenarios.
    #[instrument(level = "debug", skip_all, target = "scenarios", fields(scenario = self.name))]
    pub async fn run<P: CallProvider>(
        &self,
        harness: &Harness<P>,
        semantic_tests: Option<Address>,
        repeat: usize,
    ) -> Result<Observation, ScenarioError> {
        let first = self.run_once(harness, semantic_tests).await?;
        for attempt in 1..repeat.max(1) {
            let observation = self.run_once(harness, semantic_tests).await?;
            if observation != first {
                warn!(
                    target: "scenarios",
                    scenario = self.name,
                    attempt,
                    ?observation,
                    "Observation changed"
                );
                return Err(ScenarioError::NotIdempotent {
                    scenario: self.name,
                    attempt,
                });
            }
        }
        Ok(first)
    }

    async fn run_once<P: CallProvider>(
        &self,
        harness: &Harness<P>,
        semantic_tests: Option<Address>,
    ) -> Result<Observation, ScenarioError> {
        let target = || {
            semantic_tests.ok_or_else(|| {
                ScenarioError::Harness(HarnessError::UnknownArtifact(SEMANTIC_TESTS.to_string()))
            })
        };

        match self.kind {
            ScenarioKind::ConstructorCustomError => {
                let request = harness.deploy_transaction(CREATE_FAIL_CUSTOM)?;
                let revert = harness.expect_revert(request).await?;
                self.check_custom_error(revert)
            }
            ScenarioKind::ConstructorStringError => {
                let request = harness.deploy_transaction(CREATE_FAIL_REQUIRE)?;
                let revert = harness.expect_revert(request).await?;
                self.check_string_error(revert)
            }
            ScenarioKind::ViewStringError => {
                let request =
                    harness.function_call(target()?, SEMANTIC_TESTS, "testViewRevert", &[])?;
                let revert = harness.expect_revert(request).await?;
                self.check_string_error(revert)
            }
            ScenarioKind::ViewCustomError => {
                let request =
                    harness.function_call(target()?, SEMANTIC_TESTS, "testCustomViewRevert", &[])?;
                let revert = harness.expect_revert(request).await?;
                self.check_custom_error(revert)
            }
            ScenarioKind::ViewReturnLength { len } => {
                self.check_return_length(harness, target()?, len).await
            }
        }
    }

    fn check_custom_error(&self, revert: RevertError) -> Result<Observation, ScenarioError> {
        self.expect("error name", "CustomError", &revert.name)?;
        self.expect(
            "error argument",
            &hex::encode_prefixed(ERROR_NUM),
            &revert.arg_string(0).unwrap_or_default(),
        )?;
        Ok(Observation::Reverted { revert })
    }

    fn check_string_error(&self, revert: RevertError) -> Result<Observation, ScenarioError> {
        self.expect("error name", "Error", &revert.name)?;
        self.expect(
            "error argument",
            ERROR_MESSAGE,
            &revert.arg_string(0).unwrap_or_default(),
        )?;
        Ok(Observation::Reverted { revert })
    }

    async fn check_return_length<P: CallProvider>(
        &self,
        harness: &Harness<P>,
        address: Address,
        len: usize,
    ) -> Result<Observation, ScenarioError> {
        let values = harness
            .view(address, SEMANTIC_TESTS, "testViewLength", &[length_arg(len)])
            .await?;
        let returned = match values.as_slice() {
            [DynSolValue::Bytes(bytes)] => bytes.len(),
            other => {
                return Err(self.mismatch("return value", "bytes", &format!("{other:?}")));
            }
        };
        self.expect("return length", &len.to_string(), &returned.to_string())?;

        let request = harness.function_call(
            address,
            SEMANTIC_TESTS,
            "testViewLength",
            &[length_arg(len + 1)],
        )?;
        let overflow = match harness.call(request).await {
            Err(err) if err.is_out_of_gas() => err.message(),
            Err(err) => return Err(self.mismatch("overflow error", "out of gas", &err.to_string())),
            Ok(output) => {
                return Err(self.mismatch(
                    "overflow error",
                    "out of gas",
                    &format!("success with {} bytes", output.len()),
                ));
            }
        };

        Ok(Observation::ReturnLength { returned, overflow })
    }

    fn expect(
        &self,
        field: &'static str,
        expected: &str,
        actual: &str,
    ) -> Result<(), ScenarioError> {
        if expected != actual {
            return Err(self.mismatch(field, expected, actual));
        }
        Ok(())
    }

    fn mismatch(&self, field: &'static str, expected: &str, actual: &str) -> ScenarioError {
        ScenarioError::Mismatch {
            scenario: self.name,
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

fn length_arg(len: usize) -> DynSolValue {
    DynSolValue::Uint(U256::from(len), 256)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub status: ScenarioStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<Observation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub chain_id: u64,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios
            .iter()
            .filter(|report| report.status == status)
            .count()
    }

    /// No scenario failed.
    pub fn is_success(&self) -> bool {
        self.count(ScenarioStatus::Failed) == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SuiteOptions {
    /// Times each scenario is run.
    pub repeat: usize,
    /// Run disabled scenarios as well.
    pub include_disabled: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            repeat: 2,
            include_disabled: false,
        }
    }
}

/// Runs every scenario against `harness`.
///
/// `SemanticTests` is deployed first when a selected scenario needs it. Scenario failures are
/// reported, only failing to reach the node or to deploy is an error.
pub async fn run_suite<P: CallProvider>(
    harness: &Harness<P>,
    options: SuiteOptions,
) -> Result<SuiteReport, ScenarioError> {
    let chain_id = harness
        .provider()
        .chain_id()
        .await
        .map_err(HarnessError::from)?;
    let scenarios = all();
    let selected = |scenario: &Scenario| options.include_disabled || scenario.enabled();

    let semantic_tests = if scenarios
        .iter()
        .any(|scenario| selected(scenario) && scenario.kind.needs_semantic_tests())
    {
        let address = harness.deploy(SEMANTIC_TESTS).await?;
        debug!(target: "scenarios", %address, "Deployed SemanticTests");
        Some(address)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        if !selected(&scenario) {
            reports.push(ScenarioReport {
                name: scenario.name,
                status: ScenarioStatus::Skipped,
                observation: None,
                error: None,
                disabled_reason: scenario.disabled_reason,
            });
            continue;
        }

        let report = match scenario.run(harness, semantic_tests, options.repeat).await {
            Ok(observation) => {
                info!(target: "scenarios", scenario = scenario.name, "Scenario passed");
                ScenarioReport {
                    name: scenario.name,
                    status: ScenarioStatus::Passed,
                    observation: Some(observation),
                    error: None,
                    disabled_reason: scenario.disabled_reason,
                }
            }
            Err(err) => {
                warn!(target: "scenarios", scenario = scenario.name, %err, "Scenario failed");
                ScenarioReport {
                    name: scenario.name,
                    status: ScenarioStatus::Failed,
                    observation: None,
                    error: Some(err.to_string()),
                    disabled_reason: scenario.disabled_reason,
                }
            }
        };
        reports.push(report);
    }

    Ok(SuiteReport {
        chain_id,
        scenarios: reports,
    })
}

/// Largest `testViewLength` argument the node returns in full, searched by bisection.
///
/// Lengths are probed with `gas_limit`, or the node default when `None`. Returns `None` when not
/// even an empty result fits. Any failure other than running out of gas is an error.
#[instrument(level = "debug", skip_all, target = "scenarios")]
pub async fn find_return_length_limit<P: CallProvider>(
    harness: &Harness<P>,
    semantic_tests: Address,
    gas_limit: Option<u64>,
) -> Result<Option<usize>, HarnessError> {
    let fits = |len: usize| {
        async move {
            let mut request: CallRequest = harness.function_call(
                semantic_tests,
                SEMANTIC_TESTS,
                "testViewLength",
                &[length_arg(len)],
            )?;
            if let Some(gas_limit) = gas_limit {
                request = request.with_gas_limit(gas_limit);
            }
            match harness.call(request).await {
                Ok(_) => Ok(true),
                Err(err) if err.is_out_of_gas() => Ok(false),
                Err(err) => Err(HarnessError::Call(err)),
            }
        }
    };

    if !fits(0).await? {
        return Ok(None);
    }

    let (mut lo, mut hi) = (0, 1);
    while fits(hi).await? {
        lo = hi;
        hi *= 2;
        if hi > MAX_PROBED_LENGTH {
            return Ok(Some(lo));
        }
    }

    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid).await? {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    debug!(target: "scenarios", limit = lo, "Found return length limit");
    Ok(Some(lo))
}
