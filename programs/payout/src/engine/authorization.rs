//! Administrator witness and delegated withdrawal authorization.

use anchor_lang::prelude::Pubkey;

use super::SignatureVerifier;
use crate::constants::WITHDRAWAL_MESSAGE_LEN;
use crate::error::PayoutError;

/// The instruction signer must be the stored administrator.
pub fn require_owner_witness(admin: &Pubkey, signer: &Pubkey) -> Result<(), PayoutError> {
    if admin != signer {
        return Err(PayoutError::NotAuthorized);
    }
    Ok(())
}

/// Administrator rotation: the current administrator must sign, and the
/// incoming key signs the same transaction (enforced by the account context).
pub fn authorize_owner_change(
    admin: &Pubkey,
    current_signer: &Pubkey,
    new_owner: &Pubkey,
) -> Result<(), PayoutError> {
    require_owner_witness(admin, current_signer)?;
    if *new_owner == Pubkey::default() {
        return Err(PayoutError::InvalidPubkey);
    }
    Ok(())
}

/// Canonical message signed off-chain by the administrator.
pub fn withdrawal_message(beneficiary: &Pubkey, tea: u64) -> [u8; WITHDRAWAL_MESSAGE_LEN] {
    let mut message = [0u8; WITHDRAWAL_MESSAGE_LEN];
    message[..32].copy_from_slice(beneficiary.as_ref());
    message[32..].copy_from_slice(&tea.to_le_bytes());
    message
}

/// Checks a pre-signed `(beneficiary, tea)` authorization against the
/// current administrator. Nothing is recorded: replay is stopped by the
/// ledger high-water mark, and a key rotation voids every older signature.
pub fn verify_delegated<V: SignatureVerifier + ?Sized>(
    verifier: &V,
    admin: &Pubkey,
    beneficiary: &Pubkey,
    tea: u64,
    signature: &[u8; 64],
) -> Result<(), PayoutError> {
    let message = withdrawal_message(beneficiary, tea);
    if !verifier.verify(&message, admin, signature) {
        return Err(PayoutError::InvalidSignature);
    }
    Ok(())
}
