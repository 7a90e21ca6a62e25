use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::state::PayoutConfig;

pub fn get_owner(ctx: Context<GetOwner>) -> Result<Pubkey> {
    Ok(ctx.accounts.payout_config.admin)
}

#[derive(Accounts)]
pub struct GetOwner<'info> {
    #[account(seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,
}
