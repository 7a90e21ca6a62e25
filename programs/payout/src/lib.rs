use anchor_lang::prelude::*;

declare_id!("8Ey8Ru3BwWMZZ8pTjumEU11ujwAABKuA8ue4T2VaCMuq");

pub mod constants;
pub mod engine;
pub mod error;
pub mod instructions;
pub mod state;
pub mod utils;

pub use engine::{FailurePolicy, PayoutEntry, PayoutFailure};
pub use instructions::*;

#[program]
pub mod payout {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::initialize(ctx)
    }

    pub fn fund(ctx: Context<Fund>, amount: u64) -> Result<()> {
        instructions::fund::fund(ctx, amount)
    }

    pub fn withdraw(ctx: Context<Withdraw>, beneficiary: Pubkey, claimed_tea: u64) -> Result<()> {
        instructions::withdraw::withdraw(ctx, beneficiary, claimed_tea)
    }

    pub fn withdraw_with_signature(
        ctx: Context<WithdrawWithSignature>,
        beneficiary: Pubkey,
        claimed_tea: u64,
        signature: [u8; 64],
    ) -> Result<()> {
        instructions::withdraw_with_signature::withdraw_with_signature(
            ctx,
            beneficiary,
            claimed_tea,
            signature,
        )
    }

    pub fn set_tea(ctx: Context<SetTea>, beneficiary: Pubkey, old_tea: u64, new_tea: u64) -> Result<()> {
        instructions::set_tea::set_tea(ctx, beneficiary, old_tea, new_tea)
    }

    pub fn set_teas<'info>(
        ctx: Context<'_, '_, 'info, 'info, SetTeas<'info>>,
        beneficiaries: Vec<Pubkey>,
        old_teas: Vec<u64>,
        new_teas: Vec<u64>,
    ) -> Result<()> {
        instructions::set_teas::set_teas(ctx, beneficiaries, old_teas, new_teas)
    }

    pub fn register_beneficiaries<'info>(
        ctx: Context<'_, '_, 'info, 'info, RegisterBeneficiaries<'info>>,
        beneficiaries: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::register_beneficiaries::register_beneficiaries(ctx, beneficiaries)
    }

    pub fn batch_payout<'info>(
        ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
        beneficiaries: Vec<Pubkey>,
        claimed_teas: Vec<u64>,
        policy: FailurePolicy,
    ) -> Result<()> {
        instructions::batch_payout::batch_payout(ctx, beneficiaries, claimed_teas, policy)
    }

    pub fn batch_payout_with_service_fee<'info>(
        ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
        beneficiaries: Vec<Pubkey>,
        claimed_teas: Vec<u64>,
        service_fee: u64,
        policy: FailurePolicy,
    ) -> Result<()> {
        instructions::batch_payout::batch_payout_with_service_fee(
            ctx,
            beneficiaries,
            claimed_teas,
            service_fee,
            policy,
        )
    }

    pub fn batch_payout_with_teas<'info>(
        ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
        beneficiaries: Vec<Pubkey>,
        teas: Vec<u64>,
        teas_for_withdrawal: Vec<u64>,
        policy: FailurePolicy,
    ) -> Result<()> {
        instructions::batch_payout::batch_payout_with_teas(
            ctx,
            beneficiaries,
            teas,
            teas_for_withdrawal,
            policy,
        )
    }

    pub fn batch_payout_with_map<'info>(
        ctx: Context<'_, '_, 'info, 'info, BatchPayout<'info>>,
        entries: Vec<PayoutEntry>,
        service_fee: u64,
        policy: FailurePolicy,
    ) -> Result<()> {
        instructions::batch_payout::batch_payout_with_map(ctx, entries, service_fee, policy)
    }

    pub fn set_owner(ctx: Context<SetOwner>, new_owner: Pubkey) -> Result<()> {
        instructions::set_owner::set_owner(ctx, new_owner)
    }

    pub fn get_owner(ctx: Context<GetOwner>) -> Result<Pubkey> {
        instructions::get_owner::get_owner(ctx)
    }

    pub fn get_tea(ctx: Context<GetTea>, beneficiary: Pubkey) -> Result<u64> {
        instructions::get_tea::get_tea(ctx, beneficiary)
    }
}
