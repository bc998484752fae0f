//! Fixture contracts with controlled failure modes.
//!
//! * `CreateFailCustom` reverts in its constructor with `CustomError(ERROR_NUM)`.
//! * `CreateFailRequire` reverts in its constructor with `Error("ThisIsAnError")`.
//! * `SemanticTests` deploys and exposes view functions which return arbitrarily long data or
//!   revert with either error.
//!
//! The bytecode is assembled in process, no compiler is needed.

mod assembler;

use crate::{
    artifact::ContractArtifact,
    error::FixtureError,
    primitives::{
        B256,
        Bytes,
        JsonAbi,
        Selector,
        b256,
    },
};

use alloy_sol_types::{
    Revert,
    SolCall,
    SolError,
    sol,
};

use evm_glue::{
    assembly::Asm::Op,
    opcodes::Opcode::{
        PUSH0,
        REVERT,
    },
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    error CustomError(bytes32 value);

    interface ISemanticTests {
        function testViewLength(uint256 len) external view returns (bytes memory);
        function testViewRevert() external view;
        function testCustomViewRevert() external view;
    }
}

/// Argument of every `CustomError` raised by the fixtures.
pub const ERROR_NUM: B256 =
    b256!("1023456789abcdef1023456789abcdef1023456789abcdef1023456789abcdef");

/// Reason of every `Error(string)` raised by the fixtures.
pub const ERROR_MESSAGE: &str = "ThisIsAnError";

pub const CREATE_FAIL_CUSTOM: &str = "CreateFailCustom";
pub const CREATE_FAIL_REQUIRE: &str = "CreateFailRequire";
pub const SEMANTIC_TESTS: &str = "SemanticTests";

const CUSTOM_ERROR_ABI: &str = "error CustomError(bytes32 value)";

/// Revert data of `CustomError(ERROR_NUM)`.
pub fn custom_error_payload() -> Bytes {
    CustomError { value: ERROR_NUM }.abi_encode().into()
}

/// Revert data of `Error(ERROR_MESSAGE)`.
pub fn string_error_payload() -> Bytes {
    Revert::from(ERROR_MESSAGE).abi_encode().into()
}

fn parse_abi(signatures: &[&str]) -> Result<JsonAbi, FixtureError> {
    JsonAbi::parse(signatures.iter().copied()).map_err(|err| FixtureError::Abi(err.to_string()))
}

/// Contract whose constructor reverts with `CustomError(ERROR_NUM)`.
pub fn create_fail_custom() -> Result<ContractArtifact, FixtureError> {
    let bytecode = assembler::assemble(
        CREATE_FAIL_CUSTOM,
        &assembler::revert_with(&custom_error_payload()),
    )?;
    let abi = parse_abi(&["constructor()", CUSTOM_ERROR_ABI])?;
    Ok(ContractArtifact::new(CREATE_FAIL_CUSTOM, abi, bytecode))
}

/// Contract whose constructor reverts with `Error(ERROR_MESSAGE)`.
pub fn create_fail_require() -> Result<ContractArtifact, FixtureError> {
    let bytecode = assembler::assemble(
        CREATE_FAIL_REQUIRE,
        &assembler::revert_with(&string_error_payload()),
    )?;
    let abi = parse_abi(&["constructor()"])?;
    Ok(ContractArtifact::new(CREATE_FAIL_REQUIRE, abi, bytecode))
}

/// Contract with view functions returning long data or reverting.
pub fn semantic_tests() -> Result<ContractArtifact, FixtureError> {
    let entries = vec![
        (
            Selector::from(ISemanticTests::testViewLengthCall::SELECTOR),
            assembler::return_zeroed_bytes(),
        ),
        (
            Selector::from(ISemanticTests::testViewRevertCall::SELECTOR),
            assembler::revert_with(&string_error_payload()),
        ),
        (
            Selector::from(ISemanticTests::testCustomViewRevertCall::SELECTOR),
            assembler::revert_with(&custom_error_payload()),
        ),
    ];
    let runtime = assembler::dispatcher(SEMANTIC_TESTS, &entries, vec![
        Op(PUSH0),
        Op(PUSH0),
        Op(REVERT),
    ])?;
    let bytecode = assembler::deployer(SEMANTIC_TESTS, &runtime)?;

    let abi = parse_abi(&[
        "constructor()",
        CUSTOM_ERROR_ABI,
        "function testViewLength(uint256 len) view returns (bytes)",
        "function testViewRevert() view",
        "function testCustomViewRevert() view",
    ])?;
    Ok(ContractArtifact::new(SEMANTIC_TESTS, abi, bytecode))
}

/// All fixture contracts.
pub fn all() -> Result<Vec<ContractArtifact>, FixtureError> {
    Ok(vec![
        create_fail_custom()?,
        create_fail_require()?,
        semantic_tests()?,
    ])
}
