use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{CONFIG_SEED, VAULT_SEED};
use crate::error::PayoutError;
use crate::state::PayoutConfig;

/// Funds the pooled vault from any token account. Plain SPL transfers into
/// the vault work as well; this path only adds the notification.
pub fn fund(ctx: Context<Fund>, amount: u64) -> Result<()> {
    require!(amount > 0, PayoutError::InvalidAmount);

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funder_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        amount,
    )?;

    ctx.accounts.vault.reload()?;

    emit!(FundsReceived {
        from: ctx.accounts.funder.key(),
        amount,
        vault_balance: ctx.accounts.vault.amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Fund<'info> {
    #[account(seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,

    #[account(
        mut,
        seeds = [VAULT_SEED, payout_config.key().as_ref()],
        bump = payout_config.vault_bump,
        constraint = vault.mint == payout_config.mint @ PayoutError::InvalidTokenMint,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = funder_token_account.mint == payout_config.mint @ PayoutError::InvalidTokenMint,
    )]
    pub funder_token_account: Account<'info, TokenAccount>,

    pub funder: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[event]
pub struct FundsReceived {
    pub from: Pubkey,
    pub amount: u64,
    pub vault_balance: u64,
}
