use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, TEA_SEED, VAULT_SEED};
use crate::engine::{self, Settlement};
use crate::error::PayoutError;
use crate::state::{PayoutConfig, TeaEntry};
use crate::utils::VaultTransfer;

/// Administrator-witnessed payout of `claimed_tea - stored_tea` to
/// `beneficiary`.
pub fn withdraw(ctx: Context<Withdraw>, beneficiary: Pubkey, claimed_tea: u64) -> Result<()> {
    engine::require_owner_witness(&ctx.accounts.payout_config.admin, &ctx.accounts.admin.key())?;

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

/// Pays the delta out of the vault, then advances the entry. The entry is
/// written back by Anchor when the instruction exits successfully.
#[allow(clippy::too_many_arguments)]
pub(crate) fn settle_and_emit<'info>(
    payout_config: &Account<'info, PayoutConfig>,
    vault: &Account<'info, TokenAccount>,
    recipient_token_account: &Account<'info, TokenAccount>,
    token_program: &Program<'info, Token>,
    tea_entry: &mut Account<'info, TeaEntry>,
    tea_entry_bump: u8,
    beneficiary: Pubkey,
    claimed_tea: u64,
) -> Result<Settlement> {
    tea_entry.bind(&beneficiary, tea_entry_bump)?;

    let mut transfer = VaultTransfer::new(token_program.to_account_info(), vault, payout_config)
        .with_recipient(beneficiary, recipient_token_account.to_account_info());
    let settlement =
        engine::settle_withdrawal(&mut **tea_entry, &mut transfer, &beneficiary, claimed_tea)?;

    msg!(
        "Paid {} to {} (tea {} -> {})",
        settlement.amount,
        beneficiary,
        settlement.previous_tea,
        settlement.new_tea
    );
    emit!(Withdrawn {
        beneficiary,
        amount: settlement.amount,
        previous_tea: settlement.previous_tea,
        new_tea: settlement.new_tea,
    });

    Ok(settlement)
}

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct Withdraw<'info> {
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

    pub admin: Signer<'info>,

    #[account(mut)]
    pub fee_payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct Withdrawn {
    pub beneficiary: Pubkey,
    pub amount: u64,
    pub previous_tea: u64,
    pub new_tea: u64,
}
