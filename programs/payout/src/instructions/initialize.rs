use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{CONFIG_SEED, VAULT_SEED};
use crate::state::PayoutConfig;

/// Creates the config and the vault. The signer becomes the administrator.
pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
    let cfg = &mut ctx.accounts.payout_config;
    cfg.admin = ctx.accounts.admin.key();
    cfg.mint = ctx.accounts.mint.key();
    cfg.vault_bump = ctx.bumps.vault;
    cfg.bump = ctx.bumps.payout_config;

    msg!("Payout initialized; admin {}", cfg.admin);
    emit!(PayoutInitialized {
        admin: cfg.admin,
        mint: cfg.mint,
        vault: ctx.accounts.vault.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + PayoutConfig::SIZE,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub payout_config: Account<'info, PayoutConfig>,

    #[account(
        init,
        payer = admin,
        token::mint = mint,
        token::authority = payout_config,
        seeds = [VAULT_SEED, payout_config.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, TokenAccount>,

    pub mint: Account<'info, Mint>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[event]
pub struct PayoutInitialized {
    pub admin: Pubkey,
    pub mint: Pubkey,
    pub vault: Pubkey,
}
