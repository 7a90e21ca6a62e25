use anchor_lang::prelude::*;

use crate::constants::{CONFIG_SEED, MAX_BATCH_SIZE};
use crate::engine;
use crate::error::PayoutError;
use crate::state::{EntryLedger, PayoutConfig};

/// Pre-creates ledger entries (TEA 0) so later payouts do not pay rent.
/// Existing entries are left as they are. Remaining accounts: one ledger
/// entry per beneficiary, in input order.
pub fn register_beneficiaries<'info>(
    ctx: Context<'_, '_, 'info, 'info, RegisterBeneficiaries<'info>>,
    beneficiaries: Vec<Pubkey>,
) -> Result<()> {
    engine::require_owner_witness(&ctx.accounts.payout_config.admin, &ctx.accounts.admin.key())?;
    require!(beneficiaries.len() <= MAX_BATCH_SIZE, PayoutError::BatchTooLarge);
    require!(
        ctx.remaining_accounts.len() == beneficiaries.len(),
        PayoutError::LengthMismatch
    );
    require!(
        beneficiaries.iter().all(|b| *b != Pubkey::default()),
        PayoutError::InvalidPubkey
    );

    let pairs: Vec<(Pubkey, &'info AccountInfo<'info>)> = beneficiaries
        .iter()
        .copied()
        .zip(ctx.remaining_accounts.iter())
        .collect();
    let mut ledger = EntryLedger::load(
        &pairs,
        &ctx.accounts.admin.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
    )?;
    let created = ledger.create_missing()?;

    for beneficiary in created {
        emit!(BeneficiaryRegistered { beneficiary });
    }

    Ok(())
}

#[derive(Accounts)]
pub struct RegisterBeneficiaries<'info> {
    #[account(seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct BeneficiaryRegistered {
    pub beneficiary: Pubkey,
}
