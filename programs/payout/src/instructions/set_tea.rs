use anchor_lang::prelude::*;

use crate::constants::{CONFIG_SEED, TEA_SEED};
use crate::engine;
use crate::state::{PayoutConfig, TeaEntry};

/// Raises the stored TEA of `beneficiary` from `old_tea` to `new_tea`
/// without paying anything.
pub fn set_tea(ctx: Context<SetTea>, beneficiary: Pubkey, old_tea: u64, new_tea: u64) -> Result<()> {
    engine::require_owner_witness(&ctx.accounts.payout_config.admin, &ctx.accounts.admin.key())?;

    let entry = &mut ctx.accounts.tea_entry;
    entry.bind(&beneficiary, ctx.bumps.tea_entry)?;
    let done = engine::override_tea(&mut **entry, &beneficiary, old_tea, new_tea)?;

    emit!(TeaUpdatedWithoutPayment {
        beneficiary,
        old_tea: done.old_tea,
        new_tea: done.new_tea,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct SetTea<'info> {
    #[account(seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,

    #[account(
        init_if_needed,
        payer = admin,
        space = TeaEntry::SPACE,
        seeds = [TEA_SEED, beneficiary.as_ref()],
        bump
    )]
    pub tea_entry: Account<'info, TeaEntry>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct TeaUpdatedWithoutPayment {
    pub beneficiary: Pubkey,
    pub old_tea: u64,
    pub new_tea: u64,
}
