//! Batch payouts over many beneficiaries in one instruction.

use std::collections::BTreeMap;

use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};

use super::withdrawal::{payable_delta, settle_payable, Settlement};
use super::{TeaLedger, TokenTransfer};
use crate::constants::MAX_BATCH_SIZE;
use crate::error::PayoutError;

/// How a batch treats an item that cannot be paid.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave the item's TEA unchanged, report it, continue.
    SkipOnFailure,
    /// Fail the whole instruction.
    AbortOnFailure,
}

/// Per-item reason reported under [`FailurePolicy::SkipOnFailure`].
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayoutFailure {
    AlreadyWithdrawn,
    TransferFailed,
}

impl PayoutFailure {
    fn from_error(err: PayoutError) -> Option<Self> {
        match err {
            PayoutError::AlreadyWithdrawn => Some(Self::AlreadyWithdrawn),
            PayoutError::TransferFailed => Some(Self::TransferFailed),
            _ => None,
        }
    }
}

/// Map-form instruction input.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayoutEntry {
    pub beneficiary: Pubkey,
    pub claimed_tea: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayoutItem {
    pub beneficiary: Pubkey,
    /// Stored on success.
    pub new_tea: u64,
    /// Delta basis: `payable_tea - stored` is transferred.
    pub payable_tea: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkippedPayout {
    pub beneficiary: Pubkey,
    pub reason: PayoutFailure,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub paid: Vec<Settlement>,
    pub skipped: Vec<SkippedPayout>,
    pub total_transferred: u64,
}

/// Validated, ordered batch input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchRequest {
    items: Vec<PayoutItem>,
}

impl BatchRequest {
    pub fn from_parallel(beneficiaries: &[Pubkey], claimed_teas: &[u64]) -> Result<Self, PayoutError> {
        Self::with_service_fee(beneficiaries, claimed_teas, 0)
    }

    /// The fee is taken off every transferred delta; the full claimed TEA is
    /// still stored, so the fee cannot be charged twice.
    pub fn with_service_fee(
        beneficiaries: &[Pubkey],
        claimed_teas: &[u64],
        service_fee: u64,
    ) -> Result<Self, PayoutError> {
        if beneficiaries.len() != claimed_teas.len() {
            return Err(PayoutError::LengthMismatch);
        }
        ensure_batch_size(beneficiaries.len())?;
        let items = beneficiaries
            .iter()
            .zip(claimed_teas)
            .map(|(beneficiary, &tea)| fee_item(*beneficiary, tea, service_fee))
            .collect();
        Ok(Self { items })
    }

    /// `teas` are stored, `teas_for_withdrawal` drive the transferred amount.
    pub fn with_payable_teas(
        beneficiaries: &[Pubkey],
        teas: &[u64],
        teas_for_withdrawal: &[u64],
    ) -> Result<Self, PayoutError> {
        if beneficiaries.len() != teas.len() || beneficiaries.len() != teas_for_withdrawal.len() {
            return Err(PayoutError::LengthMismatch);
        }
        ensure_batch_size(beneficiaries.len())?;
        let mut items = Vec::with_capacity(beneficiaries.len());
        for ((beneficiary, &new_tea), &payable_tea) in
            beneficiaries.iter().zip(teas).zip(teas_for_withdrawal)
        {
            if payable_tea > new_tea {
                return Err(PayoutError::InvalidPayoutAmounts);
            }
            items.push(PayoutItem {
                beneficiary: *beneficiary,
                new_tea,
                payable_tea,
            });
        }
        Ok(Self { items })
    }

    /// Map form from instruction input; a beneficiary may appear once.
    pub fn from_entries(entries: &[PayoutEntry], service_fee: u64) -> Result<Self, PayoutError> {
        ensure_batch_size(entries.len())?;
        let mut map = BTreeMap::new();
        for entry in entries {
            if map.insert(entry.beneficiary, entry.claimed_tea).is_some() {
                return Err(PayoutError::DuplicateBeneficiary);
            }
        }
        Ok(Self::from_map(&map, service_fee))
    }

    /// Items follow key order, so the outcome does not depend on how the
    /// caller ordered the map.
    pub fn from_map(map: &BTreeMap<Pubkey, u64>, service_fee: u64) -> Self {
        let items = map
            .iter()
            .map(|(beneficiary, &tea)| fee_item(*beneficiary, tea, service_fee))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[PayoutItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// BLAKE3 over `beneficiary || new_tea || payable_tea` of every item.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for item in &self.items {
            hasher.update(item.beneficiary.as_ref());
            hasher.update(&item.new_tea.to_le_bytes());
            hasher.update(&item.payable_tea.to_le_bytes());
        }
        *hasher.finalize().as_bytes()
    }
}

fn fee_item(beneficiary: Pubkey, tea: u64, service_fee: u64) -> PayoutItem {
    PayoutItem {
        beneficiary,
        new_tea: tea,
        payable_tea: tea.saturating_sub(service_fee),
    }
}

fn ensure_batch_size(len: usize) -> Result<(), PayoutError> {
    if len > MAX_BATCH_SIZE {
        return Err(PayoutError::BatchTooLarge);
    }
    Ok(())
}

/// Applies the withdrawal rules item by item, in request order, without
/// signature checks (batches are administrator-initiated).
pub fn run_batch<L, T>(
    ledger: &mut L,
    transfer: &mut T,
    request: &BatchRequest,
    policy: FailurePolicy,
) -> Result<BatchOutcome, PayoutError>
where
    L: TeaLedger + ?Sized,
    T: TokenTransfer + ?Sized,
{
    if policy == FailurePolicy::AbortOnFailure {
        plan(ledger, transfer, request)?;
    }

    let mut outcome = BatchOutcome::default();
    for item in request.items() {
        match settle_payable(ledger, transfer, &item.beneficiary, item.new_tea, item.payable_tea) {
            Ok(settlement) => {
                outcome.total_transferred = outcome
                    .total_transferred
                    .checked_add(settlement.amount)
                    .ok_or(PayoutError::MathOverflow)?;
                outcome.paid.push(settlement);
            }
            Err(err) => match (policy, PayoutFailure::from_error(err)) {
                (FailurePolicy::SkipOnFailure, Some(reason)) => outcome.skipped.push(SkippedPayout {
                    beneficiary: item.beneficiary,
                    reason,
                }),
                _ => return Err(err),
            },
        }
    }
    Ok(outcome)
}

/// Dry run for abort-on-failure: every delta must be positive against a
/// running view of the ledger and the total must fit the pooled balance,
/// checked before the first transfer.
fn plan<L, T>(ledger: &L, transfer: &T, request: &BatchRequest) -> Result<u64, PayoutError>
where
    L: TeaLedger + ?Sized,
    T: TokenTransfer + ?Sized,
{
    let mut view: BTreeMap<Pubkey, u64> = BTreeMap::new();
    let mut total: u64 = 0;
    for item in request.items() {
        let stored = view
            .get(&item.beneficiary)
            .copied()
            .unwrap_or_else(|| ledger.tea(&item.beneficiary));
        let delta = payable_delta(item.payable_tea, stored)?;
        total = total.checked_add(delta).ok_or(PayoutError::MathOverflow)?;
        view.insert(item.beneficiary, item.new_tea);
    }
    if total > transfer.available() {
        return Err(PayoutError::TransferFailed);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{MemoryLedger, MemoryVault};

    fn keys(n: usize) -> Vec<Pubkey> {
        (0..n).map(|_| Pubkey::new_unique()).collect()
    }

    #[test]
    fn skip_policy_pays_only_positive_deltas() {
        let ab = keys(2);
        let (a, b) = (ab[0], ab[1]);
        let mut ledger = MemoryLedger::with(&[(a, 100)]);
        let mut vault = MemoryVault::funded(1_000);

        let request = BatchRequest::from_parallel(&[a, b], &[100, 50]).unwrap();
        let outcome =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();

        assert_eq!(
            outcome.skipped,
            vec![SkippedPayout {
                beneficiary: a,
                reason: PayoutFailure::AlreadyWithdrawn
            }]
        );
        assert_eq!(outcome.paid.len(), 1);
        assert_eq!(outcome.paid[0].beneficiary, b);
        assert_eq!(outcome.total_transferred, 50);
        assert_eq!(ledger.tea(&a), 100);
        assert_eq!(ledger.tea(&b), 50);
        assert_eq!(vault.received_by(&a), 0);
        assert_eq!(vault.received_by(&b), 50);
    }

    #[test]
    fn abort_policy_changes_nothing_on_a_spent_item() {
        let ab = keys(2);
        let (a, b) = (ab[0], ab[1]);
        let mut ledger = MemoryLedger::with(&[(a, 100)]);
        let mut vault = MemoryVault::funded(1_000);

        let request = BatchRequest::from_parallel(&[b, a], &[50, 100]).unwrap();
        let err = run_batch(&mut ledger, &mut vault, &request, FailurePolicy::AbortOnFailure)
            .unwrap_err();

        assert!(matches!(err, PayoutError::AlreadyWithdrawn));
        assert_eq!(ledger.tea(&b), 0);
        assert_eq!(vault.balance, 1_000);
    }

    #[test]
    fn abort_policy_checks_total_against_balance_up_front() {
        let ab = keys(2);
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(120);

        let request = BatchRequest::from_parallel(&ab, &[100, 50]).unwrap();
        let err = run_batch(&mut ledger, &mut vault, &request, FailurePolicy::AbortOnFailure)
            .unwrap_err();

        assert!(matches!(err, PayoutError::TransferFailed));
        assert!(vault.received.is_empty());
        assert!(ledger.entries.is_empty());
    }

    #[test]
    fn skip_policy_keeps_going_when_funds_run_out() {
        let abc = keys(3);
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(120);

        let request = BatchRequest::from_parallel(&abc, &[100, 50, 20]).unwrap();
        let outcome =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].beneficiary, abc[1]);
        assert_eq!(outcome.skipped[0].reason, PayoutFailure::TransferFailed);
        assert_eq!(ledger.tea(&abc[1]), 0);
        assert_eq!(ledger.tea(&abc[2]), 20);
        assert_eq!(vault.balance, 0);
    }

    #[test]
    fn rejected_recipient_is_skipped() {
        let ab = keys(2);
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(1_000);
        vault.rejecting.insert(ab[0]);

        let request = BatchRequest::from_parallel(&ab, &[10, 10]).unwrap();
        let outcome =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();
        assert_eq!(outcome.skipped[0].reason, PayoutFailure::TransferFailed);
        assert_eq!(ledger.tea(&ab[0]), 0);
        assert_eq!(ledger.tea(&ab[1]), 10);
    }

    #[test]
    fn balance_decreases_by_sum_of_paid_deltas() {
        let abcd = keys(4);
        let mut ledger = MemoryLedger::with(&[(abcd[0], 40), (abcd[1], 500)]);
        let mut vault = MemoryVault::funded(10_000);

        let request = BatchRequest::from_parallel(&abcd, &[100, 400, 7, 0]).unwrap();
        let outcome =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();

        let paid: u64 = outcome.paid.iter().map(|s| s.amount).sum();
        assert_eq!(paid, 60 + 7);
        assert_eq!(outcome.total_transferred, paid);
        assert_eq!(vault.balance, 10_000 - paid);
        assert_eq!(outcome.skipped.len(), 2);
    }

    #[test]
    fn repeated_beneficiary_sees_its_own_update() {
        let a = Pubkey::new_unique();
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(1_000);

        let request = BatchRequest::from_parallel(&[a, a, a], &[30, 30, 45]).unwrap();
        let outcome =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();
        assert_eq!(outcome.total_transferred, 45);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(ledger.tea(&a), 45);

        // The dry run tracks the same running view.
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(1_000);
        let err = run_batch(&mut ledger, &mut vault, &request, FailurePolicy::AbortOnFailure)
            .unwrap_err();
        assert!(matches!(err, PayoutError::AlreadyWithdrawn));
    }

    #[test]
    fn service_fee_reduces_transfer_but_not_stored_tea() {
        let ab = keys(2);
        let mut ledger = MemoryLedger::with(&[(ab[0], 100)]);
        let mut vault = MemoryVault::funded(1_000);

        let request = BatchRequest::with_service_fee(&ab, &[300, 8], 10).unwrap();
        let outcome =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();

        assert_eq!(vault.received_by(&ab[0]), 190);
        assert_eq!(ledger.tea(&ab[0]), 300);
        // 8 - 10 leaves nothing to pay.
        assert_eq!(outcome.skipped[0].beneficiary, ab[1]);
        assert_eq!(ledger.tea(&ab[1]), 0);

        // A second run with the same claim charges nothing more.
        let again =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();
        assert_eq!(again.total_transferred, 0);
        assert_eq!(vault.balance, 810);
    }

    #[test]
    fn dual_amounts_store_one_and_pay_the_other() {
        let a = Pubkey::new_unique();
        let mut ledger = MemoryLedger::with(&[(a, 50)]);
        let mut vault = MemoryVault::funded(1_000);

        let request = BatchRequest::with_payable_teas(&[a], &[200], &[180]).unwrap();
        run_batch(&mut ledger, &mut vault, &request, FailurePolicy::AbortOnFailure).unwrap();
        assert_eq!(vault.received_by(&a), 130);
        assert_eq!(ledger.tea(&a), 200);

        let err = BatchRequest::with_payable_teas(&[a], &[200], &[201]).unwrap_err();
        assert!(matches!(err, PayoutError::InvalidPayoutAmounts));
    }

    #[test]
    fn length_mismatch_fails_before_processing() {
        let ab = keys(2);
        let err = BatchRequest::from_parallel(&ab, &[1]).unwrap_err();
        assert!(matches!(err, PayoutError::LengthMismatch));
        let err = BatchRequest::with_service_fee(&ab[..1], &[1, 2], 0).unwrap_err();
        assert!(matches!(err, PayoutError::LengthMismatch));
        let err = BatchRequest::with_payable_teas(&ab, &[1, 2], &[1]).unwrap_err();
        assert!(matches!(err, PayoutError::LengthMismatch));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let many = keys(MAX_BATCH_SIZE + 1);
        let teas = vec![1u64; many.len()];
        let err = BatchRequest::from_parallel(&many, &teas).unwrap_err();
        assert!(matches!(err, PayoutError::BatchTooLarge));
        assert!(BatchRequest::from_parallel(&many[1..], &teas[1..]).is_ok());
    }

    #[test]
    fn map_form_ignores_input_order() {
        let abc = keys(3);
        let forward: Vec<PayoutEntry> = abc
            .iter()
            .zip([10u64, 20, 30])
            .map(|(b, t)| PayoutEntry {
                beneficiary: *b,
                claimed_tea: t,
            })
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let r1 = BatchRequest::from_entries(&forward, 0).unwrap();
        let r2 = BatchRequest::from_entries(&backward, 0).unwrap();
        assert_eq!(r1, r2);
        assert_eq!(r1.digest(), r2.digest());

        let mut l1 = MemoryLedger::default();
        let mut v1 = MemoryVault::funded(100);
        let o1 = run_batch(&mut l1, &mut v1, &r1, FailurePolicy::SkipOnFailure).unwrap();
        assert_eq!(o1.total_transferred, 60);
        assert_eq!(l1.tea(&abc[2]), 30);
    }

    #[test]
    fn map_form_matches_parallel_semantics() {
        let ab = keys(2);
        let entries = [
            PayoutEntry {
                beneficiary: ab[0],
                claimed_tea: 100,
            },
            PayoutEntry {
                beneficiary: ab[1],
                claimed_tea: 50,
            },
        ];
        let mut ledger = MemoryLedger::with(&[(ab[0], 100)]);
        let mut vault = MemoryVault::funded(1_000);
        let request = BatchRequest::from_entries(&entries, 0).unwrap();
        let outcome =
            run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure).unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].beneficiary, ab[0]);
        assert_eq!(ledger.tea(&ab[1]), 50);
    }

    #[test]
    fn map_form_rejects_duplicates() {
        let a = Pubkey::new_unique();
        let entries = [
            PayoutEntry {
                beneficiary: a,
                claimed_tea: 1,
            },
            PayoutEntry {
                beneficiary: a,
                claimed_tea: 2,
            },
        ];
        let err = BatchRequest::from_entries(&entries, 0).unwrap_err();
        assert!(matches!(err, PayoutError::DuplicateBeneficiary));
    }

    #[test]
    fn digest_covers_amounts() {
        let a = Pubkey::new_unique();
        let r1 = BatchRequest::from_parallel(&[a], &[10]).unwrap();
        let r2 = BatchRequest::from_parallel(&[a], &[11]).unwrap();
        let r3 = BatchRequest::with_service_fee(&[a], &[10], 1).unwrap();
        assert_ne!(r1.digest(), r2.digest());
        assert_ne!(r1.digest(), r3.digest());
    }

    #[test]
    fn ledger_never_decreases_under_any_policy() {
        let abc = keys(3);
        let start = [(abc[0], 500), (abc[1], 20), (abc[2], 0)];
        let mut ledger = MemoryLedger::with(&start);
        let mut vault = MemoryVault::funded(50);

        let request = BatchRequest::from_parallel(&abc, &[10, 60, 40]).unwrap();
        let _ = run_batch(&mut ledger, &mut vault, &request, FailurePolicy::SkipOnFailure);
        let _ = run_batch(&mut ledger, &mut vault, &request, FailurePolicy::AbortOnFailure);

        for (who, before) in start {
            assert!(ledger.tea(&who) >= before);
        }
    }
}
