//! Bytecode building blocks for the fixture contracts.

use crate::{
    error::FixtureError,
    primitives::Selector,
};

use Asm::*;
use evm_glue::{
    assembler::assemble_minimized,
    assembly::Asm,
    opcodes::Opcode::*,
};

pub(super) fn assemble(name: &'static str, asm: &[Asm]) -> Result<Vec<u8>, FixtureError> {
    let (_, bytecode) = assemble_minimized(asm, true).map_err(|err| {
        FixtureError::Assembly {
            name,
            reason: format!("{err:?}"),
        }
    })?;
    Ok(bytecode)
}

fn push2(name: &'static str, value: usize) -> Result<Asm, FixtureError> {
    let value = u16::try_from(value).map_err(|_| {
        FixtureError::Assembly {
            name,
            reason: format!("{value} does not fit in two bytes"),
        }
    })?;
    Ok(Op(PUSH2(value.to_be_bytes())))
}

/// Stores `payload` in memory and reverts with it.
pub(super) fn revert_with(payload: &[u8]) -> Vec<Asm> {
    let mut asm = Vec::new();
    for (i, chunk) in payload.chunks(32).enumerate() {
        let mut word = [0u8; 32];
        word[..chunk.len()].copy_from_slice(chunk);
        asm.push(Op(PUSH32(word)));
        asm.push(Op(PUSH2(((i * 32) as u16).to_be_bytes())));
        asm.push(Op(MSTORE));
    }
    asm.push(Op(PUSH2((payload.len() as u16).to_be_bytes())));
    asm.push(Op(PUSH0));
    asm.push(Op(REVERT));
    asm
}

/// Returns `bytes(new bytes(len))`, `len` being the first calldata argument.
pub(super) fn return_zeroed_bytes() -> Vec<Asm> {
    vec![
        // len
        Op(PUSH1([4])),
        Op(CALLDATALOAD),
        // offset word
        Op(PUSH1([0x20])),
        Op(PUSH0),
        Op(MSTORE),
        // length word
        Op(DUP1),
        Op(PUSH1([0x20])),
        Op(MSTORE),
        // 0x40 + len rounded up to a word
        Op(PUSH1([31])),
        Op(ADD),
        Op(PUSH1([5])),
        Op(SHR),
        Op(PUSH1([5])),
        Op(SHL),
        Op(PUSH1([0x40])),
        Op(ADD),
        Op(PUSH0),
        Op(RETURN),
    ]
}

/// Creation code returning `runtime`.
pub(super) fn deployer(name: &'static str, runtime: &[u8]) -> Result<Vec<u8>, FixtureError> {
    let prefix = |offset: usize| -> Result<Vec<Asm>, FixtureError> {
        Ok(vec![
            push2(name, runtime.len())?,
            push2(name, offset)?,
            Op(PUSH0),
            Op(CODECOPY),
            push2(name, runtime.len())?,
            Op(PUSH0),
            Op(RETURN),
        ])
    };

    let prefix_len = assemble(name, &prefix(0)?)?.len();
    let mut code = assemble(name, &prefix(prefix_len)?)?;
    if code.len() != prefix_len {
        return Err(FixtureError::Assembly {
            name,
            reason: "deployer prefix changed size".to_string(),
        });
    }
    code.extend_from_slice(runtime);
    Ok(code)
}

/// Runtime dispatching on the function selector.
///
/// Each body starts with the selector still on the stack. Calldata matching no entry runs
/// `fallback`.
pub(super) fn dispatcher(
    name: &'static str,
    entries: &[(Selector, Vec<Asm>)],
    fallback: Vec<Asm>,
) -> Result<Vec<u8>, FixtureError> {
    let header = |destinations: &[usize]| -> Result<Vec<Asm>, FixtureError> {
        let mut asm = vec![Op(PUSH0), Op(CALLDATALOAD), Op(PUSH1([0xe0])), Op(SHR)];
        for ((selector, _), destination) in entries.iter().zip(destinations) {
            asm.push(Op(DUP1));
            asm.push(Op(PUSH4(selector.0)));
            asm.push(Op(EQ));
            asm.push(push2(name, *destination)?);
            asm.push(Op(JUMPI));
        }
        asm.extend(fallback.iter().cloned());
        Ok(asm)
    };

    let bodies = entries
        .iter()
        .map(|(_, body)| {
            let mut asm = vec![Op(JUMPDEST), Op(POP)];
            asm.extend(body.iter().cloned());
            assemble(name, &asm)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let header_len = assemble(name, &header(&vec![0; entries.len()])?)?.len();
    let destinations: Vec<usize> = bodies
        .iter()
        .scan(header_len, |offset, body| {
            let destination = *offset;
            *offset += body.len();
            Some(destination)
        })
        .collect();

    let mut code = assemble(name, &header(&destinations)?)?;
    if code.len() != header_len {
        return Err(FixtureError::Assembly {
            name,
            reason: "dispatcher header changed size".to_string(),
        });
    }
    for body in bodies {
        code.extend(body);
    }
    Ok(code)
}
