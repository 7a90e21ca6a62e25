use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::{CONFIG_SEED, VAULT_SEED};
use crate::engine::{self, BatchRequest, FailurePolicy, PayoutEntry, PayoutFailure};
use crate::error::PayoutError;
use crate::state::{EntryLedger, PayoutConfig};
use crate::utils::VaultTransfer;

/// Pays each `claimed_teas[i] - stored_tea` to `beneficiaries[i]`.
///
/// Remaining accounts come in pairs, one per input item and in input order:
/// `(tea_entry, recipient_token_account)`.
pub fn batch_payout<'info>(
    ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
    beneficiaries: Vec<Pubkey>,
    claimed_teas: Vec<u64>,
    policy: FailurePolicy,
) -> Result<()> {
    let request = BatchRequest::from_parallel(&beneficiaries, &claimed_teas)?;
    execute(ctx, &beneficiaries, &request, policy)
}

/// Like [`batch_payout`] with `service_fee` kept back from every delta.
pub fn batch_payout_with_service_fee<'info>(
    ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
    beneficiaries: Vec<Pubkey>,
    claimed_teas: Vec<u64>,
    service_fee: u64,
    policy: FailurePolicy,
) -> Result<()> {
    let request = BatchRequest::with_service_fee(&beneficiaries, &claimed_teas, service_fee)?;
    execute(ctx, &beneficiaries, &request, policy)
}

/// Stores `teas[i]` but pays out against `teas_for_withdrawal[i]`.
pub fn batch_payout_with_teas<'info>(
    ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
    beneficiaries: Vec<Pubkey>,
    teas: Vec<u64>,
    teas_for_withdrawal: Vec<u64>,
    policy: FailurePolicy,
) -> Result<()> {
    let request = BatchRequest::with_payable_teas(&beneficiaries, &teas, &teas_for_withdrawal)?;
    execute(ctx, &beneficiaries, &request, policy)
}

/// Map form. Items are settled in beneficiary key order whatever the input
/// order; remaining accounts still follow the input order.
pub fn batch_payout_with_map<'info>(
    ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
    entries: Vec<PayoutEntry>,
    service_fee: u64,
    policy: FailurePolicy,
) -> Result<()> {
    let request = BatchRequest::from_entries(&entries, service_fee)?;
    let beneficiaries: Vec<Pubkey> = entries.iter().map(|e| e.beneficiary).collect();
    execute(ctx, &beneficiaries, &request, policy)
}

fn execute<'info>(
    ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
    beneficiaries: &[Pubkey],
    request: &BatchRequest,
    policy: FailurePolicy,
) -> Result<()> {
    let accounts = &ctx.accounts;
    engine::require_owner_witness(&accounts.payout_config.admin, &accounts.admin.key())?;
    require!(
        ctx.remaining_accounts.len() == beneficiaries.len() * 2,
        PayoutError::LengthMismatch
    );

    let remaining: &'info [AccountInfo<'info>] = ctx.remaining_accounts;
    let pairs: Vec<(Pubkey, &'info AccountInfo<'info>)> = beneficiaries
        .iter()
        .copied()
        .zip(remaining.chunks_exact(2).map(|pair| &pair[0]))
        .collect();
    let mut ledger = EntryLedger::load(
        &pairs,
        &accounts.admin.to_account_info(),
        &accounts.system_program.to_account_info(),
    )?;

    let mut transfer = VaultTransfer::new(
        accounts.token_program.to_account_info(),
        &accounts.vault,
        &accounts.payout_config,
    );
    for (beneficiary, pair) in beneficiaries.iter().zip(remaining.chunks_exact(2)) {
        transfer.add_recipient(*beneficiary, pair[1].clone());
    }

    let outcome = engine::run_batch(&mut ledger, &mut transfer, request, policy)?;
    ledger.persist()?;

    for skipped in &outcome.skipped {
        msg!("Payout to {} skipped: {:?}", skipped.beneficiary, skipped.reason);
        emit!(PayoutFailed {
            beneficiary: skipped.beneficiary,
            reason: skipped.reason,
        });
    }

    msg!(
        "Batch settled: {} paid, {} skipped, {} transferred",
        outcome.paid.len(),
        outcome.skipped.len(),
        outcome.total_transferred
    );
    emit!(BatchPayoutSettled {
        batch_digest: request.digest(),
        paid: outcome.paid.len() as u8,
        skipped: outcome.skipped.len() as u8,
        total_transferred: outcome.total_transferred,
        policy,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct BatchPayout<'info> {
    #[account(seeds = [CONFIG_SEED], bump = payout_config.bump)]
    pub payout_config: Account<'info, PayoutConfig>,

    #[account(
        mut,
        seeds = [VAULT_SEED, payout_config.key().as_ref()],
        bump = payout_config.vault_bump,
        constraint = vault.mint == payout_config.mint @ PayoutError::InvalidTokenMint,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Also pays rent for ledger entries created on the fly.
    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct PayoutFailed {
    pub beneficiary: Pubkey,
    pub reason: PayoutFailure,
}

#[event]
pub struct BatchPayoutSettled {
    pub batch_digest: [u8; 32],
    pub paid: u8,
    pub skipped: u8,
    pub total_transferred: u64,
    pub policy: FailurePolicy,
}
