use anchor_lang::prelude::*;

use super::set_tea::TeaUpdatedWithoutPayment;
use crate::constants::{CONFIG_SEED, MAX_BATCH_SIZE};
use crate::engine;
use crate::error::PayoutError;
use crate::state::{EntryLedger, PayoutConfig};

/// Bulk `set_tea`. Remaining accounts: one ledger entry per beneficiary, in
/// input order. Items with a stale `old_tea` or no increase are skipped.
pub fn set_teas<'info>(
    ctx: Context<'_, '_, 'info, 'info, SetTeas<'info>>,
    beneficiaries: Vec<Pubkey>,
    old_teas: Vec<u64>,
    new_teas: Vec<u64>,
) -> Result<()> {
    engine::require_owner_witness(&ctx.accounts.payout_config.admin, &ctx.accounts.admin.key())?;
    require!(
        beneficiaries.len() == old_teas.len() && beneficiaries.len() == new_teas.len(),
        PayoutError::LengthMismatch
    );
    require!(beneficiaries.len() <= MAX_BATCH_SIZE, PayoutError::BatchTooLarge);
    require!(
        ctx.remaining_accounts.len() == beneficiaries.len(),
        PayoutError::LengthMismatch
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

    let applied = engine::override_teas(&mut ledger, &beneficiaries, &old_teas, &new_teas)?;
    ledger.persist()?;

    msg!("set_teas: {} of {} applied", applied.len(), beneficiaries.len());
    for done in applied {
        emit!(TeaUpdatedWithoutPayment {
            beneficiary: done.beneficiary,
            old_tea: done.old_tea,
            new_tea: done.new_tea,
        });
    }

    Ok(())
}

#[derive(Accounts)]
pub struct SetTeas<'info> {
    #[account(seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}
