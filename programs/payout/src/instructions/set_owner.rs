use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::engine;
use crate::error::PayoutError;
use crate::state::PayoutConfig;

/// Hands administration to `new_owner`. Both keys sign, so the new key is
/// known to be controlled. Signatures issued by the old key stop verifying.
pub fn set_owner(ctx: Context<SetOwner>, new_owner: Pubkey) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.new_admin.key(),
        new_owner,
        PayoutError::InvalidPubkey
    );

    let cfg = &mut ctx.accounts.payout_config;
    engine::authorize_owner_change(&cfg.admin, &ctx.accounts.admin.key(), &new_owner)?;

    let old_admin = cfg.admin;
    cfg.admin = new_owner;

    msg!("Owner changed: {} -> {}", old_admin, new_owner);
    emit!(OwnerChanged {
        old_admin,
        new_admin: new_owner,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetOwner<'info> {
    #[account(mut, seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,

    pub admin: Signer<'info>,

    pub new_admin: Signer<'info>,
}

#[event]
pub struct OwnerChanged {
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
}
