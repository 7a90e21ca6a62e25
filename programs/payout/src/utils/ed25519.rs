//! Delegated-signature verification through the Ed25519 native program.
//!
//! The beneficiary's transaction carries an Ed25519 program instruction
//! right before the withdrawal. The runtime fails the transaction if that
//! signature is invalid, so the program only has to confirm the instruction
//! signs the expected message with the administrator key.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};
use bytemuck::{Pod, Zeroable};

use crate::engine::SignatureVerifier;

/// Native Ed25519 signature-verification program.
pub mod ed25519_program {
    use anchor_lang::prelude::*;

    declare_id!("Ed25519SigVerify111111111111111111111111111");
}

/// Length of `num_signatures` + padding.
pub const ED25519_HEADER_LEN: usize = 2;
/// Instruction index meaning "data lives in this instruction".
pub const SELF_INSTRUCTION_INDEX: u16 = u16::MAX;

/// Per-signature offsets record of the Ed25519 program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Ed25519SignatureOffsets {
    pub signature_offset: u16,
    pub signature_instruction_index: u16,
    pub public_key_offset: u16,
    pub public_key_instruction_index: u16,
    pub message_data_offset: u16,
    pub message_data_size: u16,
    pub message_instruction_index: u16,
}

impl Ed25519SignatureOffsets {
    pub const LEN: usize = core::mem::size_of::<Ed25519SignatureOffsets>();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedPayload<'a> {
    pub public_key: &'a [u8],
    pub signature: &'a [u8],
    pub message: &'a [u8],
}

/// Parses Ed25519 instruction data holding exactly one signature whose key,
/// signature and message all live in the same instruction.
pub fn parse_single_signature(data: &[u8]) -> Option<SignedPayload<'_>> {
    if data.len() < ED25519_HEADER_LEN + Ed25519SignatureOffsets::LEN || data[0] != 1 {
        return None;
    }
    let offsets: Ed25519SignatureOffsets = bytemuck::try_pod_read_unaligned(
        &data[ED25519_HEADER_LEN..ED25519_HEADER_LEN + Ed25519SignatureOffsets::LEN],
    )
    .ok()?;

    let foreign = [
        offsets.signature_instruction_index,
        offsets.public_key_instruction_index,
        offsets.message_instruction_index,
    ]
    .iter()
    .any(|&index| index != SELF_INSTRUCTION_INDEX);
    if foreign {
        return None;
    }

    Some(SignedPayload {
        public_key: field(data, offsets.public_key_offset, 32)?,
        signature: field(data, offsets.signature_offset, 64)?,
        message: field(data, offsets.message_data_offset, offsets.message_data_size as usize)?,
    })
}

fn field(data: &[u8], offset: u16, len: usize) -> Option<&[u8]> {
    let start = offset as usize;
    data.get(start..start.checked_add(len)?)
}

/// True when `ix` is an Ed25519 program instruction over exactly
/// `(public_key, signature, message)`.
pub fn ed25519_instruction_matches(
    ix: &Instruction,
    message: &[u8],
    public_key: &Pubkey,
    signature: &[u8; 64],
) -> bool {
    if ix.program_id != ed25519_program::ID || !ix.accounts.is_empty() {
        return false;
    }
    match parse_single_signature(&ix.data) {
        Some(payload) => {
            payload.public_key == public_key.as_ref()
                && payload.signature == &signature[..]
                && payload.message == message
        }
        None => false,
    }
}

/// [`SignatureVerifier`] reading the instruction that precedes the current
/// one from the instructions sysvar.
pub struct Ed25519Introspection<'a, 'info> {
    instructions: &'a AccountInfo<'info>,
}

impl<'a, 'info> Ed25519Introspection<'a, 'info> {
    pub fn new(instructions: &'a AccountInfo<'info>) -> Self {
        Self { instructions }
    }
}

impl SignatureVerifier for Ed25519Introspection<'_, '_> {
    fn verify(&self, message: &[u8], public_key: &Pubkey, signature: &[u8; 64]) -> bool {
        let Ok(current) = load_current_index_checked(self.instructions) else {
            return false;
        };
        let Some(previous) = current.checked_sub(1) else {
            return false;
        };
        match load_instruction_at_checked(previous as usize, self.instructions) {
            Ok(ix) => ed25519_instruction_matches(&ix, message, public_key, signature),
            Err(_) => false,
        }
    }
}
