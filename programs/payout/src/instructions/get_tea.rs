use anchor_lang::prelude::*;

use crate::constants::TEA_SEED;
use crate::state::read_tea;

/// Stored TEA of `beneficiary`; 0 when no entry exists yet.
pub fn get_tea(ctx: Context<GetTea>, beneficiary: Pubkey) -> Result<u64> {
    read_tea(&ctx.accounts.tea_entry.to_account_info(), &beneficiary)
}

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct GetTea<'info> {
    /// CHECK: seed-constrained ledger entry PDA; may not exist yet.
    #[account(seeds = [TEA_SEED, beneficiary.as_ref()], bump)]
    pub tea_entry: UncheckedAccount<'info>,
}
