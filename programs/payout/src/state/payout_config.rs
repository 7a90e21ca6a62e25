use anchor_lang::prelude::*;

/// Single payout configuration PDA (owner registry).
#[account]
pub struct PayoutConfig {
    /// Administrator key: transaction witness and delegated-signature key.
    pub admin: Pubkey,
    /// Token mint paid out from the vault.
    pub mint: Pubkey,
    /// Bump of the vault token account PDA.
    pub vault_bump: u8,
    /// Bump of this PDA; the vault authority signs with it.
    pub bump: u8,
}

impl PayoutConfig {
    pub const SIZE: usize =
        32 + // admin
        32 + // mint
        1 +  // vault_bump
        1;   // bump
}
