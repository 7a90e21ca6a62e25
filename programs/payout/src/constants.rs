//! Program-wide constants.

/// Seed of the single payout configuration PDA.
pub const CONFIG_SEED: &[u8] = b"payout_config";

/// Seed of the pooled token vault PDA (`[VAULT_SEED, payout_config]`).
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed of per-beneficiary ledger entries (`[TEA_SEED, beneficiary]`).
pub const TEA_SEED: &[u8] = b"tea";

/// Max items processed per batch instruction.
pub const MAX_BATCH_SIZE: usize = 16;

/// Canonical withdrawal message: beneficiary (32) || tea (8, LE).
pub const WITHDRAWAL_MESSAGE_LEN: usize = 32 + 8;
