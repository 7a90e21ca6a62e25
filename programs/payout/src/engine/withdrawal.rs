//! Single-beneficiary payout and the administrative TEA override.

use anchor_lang::prelude::Pubkey;

use super::{TeaLedger, TokenTransfer};
use crate::error::PayoutError;

/// A committed payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub beneficiary: Pubkey,
    pub previous_tea: u64,
    pub new_tea: u64,
    pub amount: u64,
}

/// A TEA raised without payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeaOverride {
    pub beneficiary: Pubkey,
    pub old_tea: u64,
    pub new_tea: u64,
}

/// Amount still owed when `basis` is claimed against `stored`.
pub fn payable_delta(basis: u64, stored: u64) -> Result<u64, PayoutError> {
    match basis.checked_sub(stored) {
        Some(delta) if delta > 0 => Ok(delta),
        _ => Err(PayoutError::AlreadyWithdrawn),
    }
}

/// Pays `claimed_tea - stored` and raises the stored TEA to `claimed_tea`.
///
/// The ledger is written only after the transfer went through, so a rejected
/// transfer never advances the high-water mark.
pub fn settle_withdrawal<L, T>(
    ledger: &mut L,
    transfer: &mut T,
    beneficiary: &Pubkey,
    claimed_tea: u64,
) -> Result<Settlement, PayoutError>
where
    L: TeaLedger + ?Sized,
    T: TokenTransfer + ?Sized,
{
    settle_payable(ledger, transfer, beneficiary, claimed_tea, claimed_tea)
}

/// Shared by the withdrawal and batch paths: the delta is computed from
/// `payable_tea` while `new_tea` is what gets stored.
pub(crate) fn settle_payable<L, T>(
    ledger: &mut L,
    transfer: &mut T,
    beneficiary: &Pubkey,
    new_tea: u64,
    payable_tea: u64,
) -> Result<Settlement, PayoutError>
where
    L: TeaLedger + ?Sized,
    T: TokenTransfer + ?Sized,
{
    let previous_tea = ledger.tea(beneficiary);
    let amount = payable_delta(payable_tea, previous_tea)?;
    transfer.transfer(beneficiary, amount)?;
    ledger.set_tea(beneficiary, new_tea)?;
    Ok(Settlement {
        beneficiary: *beneficiary,
        previous_tea,
        new_tea,
        amount,
    })
}

/// Administrator-only TEA raise with no transfer.
///
/// Used to void an issued but unredeemed signature, or to retire an
/// identity after key loss.
pub fn override_tea<L: TeaLedger + ?Sized>(
    ledger: &mut L,
    beneficiary: &Pubkey,
    old_tea: u64,
    new_tea: u64,
) -> Result<TeaOverride, PayoutError> {
    let stored = ledger.tea(beneficiary);
    if old_tea != stored {
        return Err(PayoutError::StaleRead);
    }
    if new_tea <= stored {
        return Err(PayoutError::NotAnIncrease);
    }
    ledger.set_tea(beneficiary, new_tea)?;
    Ok(TeaOverride {
        beneficiary: *beneficiary,
        old_tea,
        new_tea,
    })
}

/// Bulk [`override_tea`]. Items with a stale `old_tea` or a non-increasing
/// `new_tea` are left untouched; only the length check aborts the call.
pub fn override_teas<L: TeaLedger + ?Sized>(
    ledger: &mut L,
    beneficiaries: &[Pubkey],
    old_teas: &[u64],
    new_teas: &[u64],
) -> Result<Vec<TeaOverride>, PayoutError> {
    if beneficiaries.len() != old_teas.len() || beneficiaries.len() != new_teas.len() {
        return Err(PayoutError::LengthMismatch);
    }
    let mut applied = Vec::with_capacity(beneficiaries.len());
    for ((beneficiary, &old_tea), &new_tea) in beneficiaries.iter().zip(old_teas).zip(new_teas) {
        match override_tea(ledger, beneficiary, old_tea, new_tea) {
            Ok(done) => applied.push(done),
            Err(PayoutError::StaleRead) | Err(PayoutError::NotAnIncrease) => continue,
            Err(other) => return Err(other),
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{sign, DigestVerifier, MemoryLedger, MemoryVault};
    use crate::engine::{verify_delegated, withdrawal_message, TeaLedger};

    #[test]
    fn delegated_withdrawal_pays_once() {
        let admin = Pubkey::new_unique();
        let x = Pubkey::new_unique();
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(5_000);
        let sig = sign(&admin, &withdrawal_message(&x, 1_000));

        verify_delegated(&DigestVerifier, &admin, &x, 1_000, &sig).unwrap();
        let paid = settle_withdrawal(&mut ledger, &mut vault, &x, 1_000).unwrap();
        assert_eq!(paid.amount, 1_000);
        assert_eq!(paid.previous_tea, 0);
        assert_eq!(ledger.tea(&x), 1_000);
        assert_eq!(vault.received_by(&x), 1_000);

        // Same triple again: the signature still verifies, the ledger refuses.
        verify_delegated(&DigestVerifier, &admin, &x, 1_000, &sig).unwrap();
        let err = settle_withdrawal(&mut ledger, &mut vault, &x, 1_000).unwrap_err();
        assert!(matches!(err, PayoutError::AlreadyWithdrawn));
        assert_eq!(vault.balance, 4_000);
    }

    #[test]
    fn withdrawal_pays_only_the_increment() {
        let x = Pubkey::new_unique();
        let mut ledger = MemoryLedger::with(&[(x, 300)]);
        let mut vault = MemoryVault::funded(1_000);

        let paid = settle_withdrawal(&mut ledger, &mut vault, &x, 450).unwrap();
        assert_eq!(paid.amount, 150);
        assert_eq!(vault.balance, 850);
        assert_eq!(ledger.tea(&x), 450);
    }

    #[test]
    fn lower_claim_is_already_withdrawn() {
        let x = Pubkey::new_unique();
        let mut ledger = MemoryLedger::with(&[(x, 300)]);
        let mut vault = MemoryVault::funded(1_000);

        let err = settle_withdrawal(&mut ledger, &mut vault, &x, 200).unwrap_err();
        assert!(matches!(err, PayoutError::AlreadyWithdrawn));
        assert_eq!(ledger.tea(&x), 300);
        assert_eq!(vault.balance, 1_000);
    }

    #[test]
    fn failed_transfer_leaves_tea_untouched() {
        let x = Pubkey::new_unique();
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(10);

        let err = settle_withdrawal(&mut ledger, &mut vault, &x, 11).unwrap_err();
        assert!(matches!(err, PayoutError::TransferFailed));
        assert_eq!(ledger.tea(&x), 0);

        // Once funded the same claim succeeds in full.
        vault.balance = 11;
        let paid = settle_withdrawal(&mut ledger, &mut vault, &x, 11).unwrap();
        assert_eq!(paid.amount, 11);
    }

    #[test]
    fn override_requires_fresh_read_and_increase() {
        let x = Pubkey::new_unique();
        let mut ledger = MemoryLedger::with(&[(x, 100)]);

        let err = override_tea(&mut ledger, &x, 90, 200).unwrap_err();
        assert!(matches!(err, PayoutError::StaleRead));
        let err = override_tea(&mut ledger, &x, 100, 100).unwrap_err();
        assert!(matches!(err, PayoutError::NotAnIncrease));
        assert_eq!(ledger.tea(&x), 100);

        let done = override_tea(&mut ledger, &x, 100, 250).unwrap();
        assert_eq!(
            done,
            TeaOverride {
                beneficiary: x,
                old_tea: 100,
                new_tea: 250
            }
        );
        assert_eq!(ledger.tea(&x), 250);
    }

    #[test]
    fn override_voids_an_unredeemed_signature() {
        let admin = Pubkey::new_unique();
        let x = Pubkey::new_unique();
        let mut ledger = MemoryLedger::default();
        let mut vault = MemoryVault::funded(1_000);
        let sig = sign(&admin, &withdrawal_message(&x, 500));

        override_tea(&mut ledger, &x, 0, 500).unwrap();

        verify_delegated(&DigestVerifier, &admin, &x, 500, &sig).unwrap();
        let err = settle_withdrawal(&mut ledger, &mut vault, &x, 500).unwrap_err();
        assert!(matches!(err, PayoutError::AlreadyWithdrawn));
        assert_eq!(vault.balance, 1_000);
    }

    #[test]
    fn bulk_override_skips_mismatched_items() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let c = Pubkey::new_unique();
        let mut ledger = MemoryLedger::with(&[(a, 10), (b, 20)]);

        let applied =
            override_teas(&mut ledger, &[a, b, c], &[10, 999, 0], &[15, 30, 0]).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].beneficiary, a);
        assert_eq!(ledger.tea(&a), 15);
        assert_eq!(ledger.tea(&b), 20);
        assert_eq!(ledger.tea(&c), 0);
    }

    #[test]
    fn bulk_override_rejects_ragged_input() {
        let a = Pubkey::new_unique();
        let mut ledger = MemoryLedger::default();
        let err = override_teas(&mut ledger, &[a], &[0, 0], &[1]).unwrap_err();
        assert!(matches!(err, PayoutError::LengthMismatch));
        let err = override_teas(&mut ledger, &[a], &[0], &[]).unwrap_err();
        assert!(matches!(err, PayoutError::LengthMismatch));
        assert!(ledger.entries.is_empty());
    }
}
