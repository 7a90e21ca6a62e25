use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;
use anchor_spl::token::{Token, TokenAccount};

use super::withdraw::settle_and_emit;
use crate::constants::{CONFIG_SEED, TEA_SEED, VAULT_SEED};
use crate::engine;
use crate::error::PayoutError;
use crate::state::{PayoutConfig, TeaEntry};
use crate::utils::Ed25519Introspection;

/// Delegated withdrawal: anyone may submit it, provided the instruction
/// right before it is an Ed25519 program check of the administrator's
/// signature over `beneficiary || claimed_tea`.
pub fn withdraw_with_signature(
    ctx: Context<WithdrawWithSignature>,
    beneficiary: Pubkey,
    claimed_tea: u64,
    signature: [u8; 64],
) -> Result<()> {
    let instructions = ctx.accounts.instructions_sysvar.to_account_info();
    let verifier = Ed25519Introspection::new(&instructions);
    engine::verify_delegated(
        &verifier,
        &ctx.accounts.payout_config.admin,
        &beneficiary,
        claimed_tea,
        &signature,
    )?;

    let accounts = &mut *ctx.accounts;
    settle_and_emit(
        &accounts.payout_config,
        &accounts.vault,
        &accounts.recipient_token_account,
        &accounts.token_program,
        &mut accounts.tea_entry,
        ctx.bumps.tea_entry,
        beneficiary,
        claimed_tea,
    )?;

    Ok(())
}

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct WithdrawWithSignature<'info> {
    #[account(seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,

    #[account(
        init_if_needed,
        payer = fee_payer,
        space = TeaEntry::SPACE,
        seeds = [TEA_SEED, beneficiary.as_ref()],
        bump
    )]
    pub tea_entry: Account<'info, TeaEntry>,

    #[account(
        mut,
        seeds = [VAULT_SEED, payout_config.key().as_ref()],
        bump = payout_config.vault_bump,
        constraint = vault.mint == payout_config.mint @ PayoutError::InvalidTokenMint,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = recipient_token_account.mint == payout_config.mint @ PayoutError::InvalidTokenMint,
        constraint = recipient_token_account.owner == beneficiary @ PayoutError::InvalidRecipientAccount,
    )]
    pub recipient_token_account: Account<'info, TokenAccount>,

    /// Pays the fees and, on first payout, the ledger entry rent.
    #[account(mut)]
    pub fee_payer: Signer<'info>,

    /// CHECK: address-constrained to the instructions sysvar.
    #[account(address = sysvar_instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}
