//! Runtime-free payout core.
//!
//! Instruction handlers adapt accounts to the three capabilities below and
//! delegate every ledger decision to this module, so the TEA rules can be
//! exercised on the host without a validator.

use anchor_lang::prelude::Pubkey;

use crate::error::PayoutError;

pub mod authorization;
pub mod batch;
pub mod withdrawal;

pub use authorization::*;
pub use batch::*;
pub use withdrawal::*;

/// Durable beneficiary -> total earned amount mapping.
pub trait TeaLedger {
    /// Stored TEA, zero when the beneficiary has no entry.
    fn tea(&self, beneficiary: &Pubkey) -> u64;

    /// Unconditional overwrite. Callers validate before writing.
    fn set_tea(&mut self, beneficiary: &Pubkey, tea: u64) -> Result<(), PayoutError>;
}

/// Outgoing transfers from the pooled balance.
pub trait TokenTransfer {
    /// Pooled balance still available to this instruction.
    fn available(&self) -> u64;

    fn transfer(&mut self, to: &Pubkey, amount: u64) -> Result<(), PayoutError>;
}

/// Detached signature check against a public key.
pub trait SignatureVerifier {
    fn verify(&self, message: &[u8], public_key: &Pubkey, signature: &[u8; 64]) -> bool;
}
