use anchor_lang::prelude::*;

/// Custom error codes for the payout program.
#[error_code]
pub enum PayoutError {
    #[msg("Unauthorized: administrator signature required")]
    NotAuthorized,

    #[msg("Withdrawal authorization signature is not valid for the given parameters")]
    InvalidSignature,

    #[msg("These funds have already been withdrawn")]
    AlreadyWithdrawn,

    #[msg("Provided old tea does not match the stored tea")]
    StaleRead,

    #[msg("New tea must be greater than the stored tea")]
    NotAnIncrease,

    #[msg("Parameters must have the same length")]
    LengthMismatch,

    #[msg("Transfer was not successful")]
    TransferFailed,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Invalid public key")]
    InvalidPubkey,

    #[msg("Invalid amount (must be > 0)")]
    InvalidAmount,

    #[msg("Invalid token mint")]
    InvalidTokenMint,

    #[msg("Recipient token account is not owned by the beneficiary")]
    InvalidRecipientAccount,

    #[msg("Ledger entry does not belong to the beneficiary")]
    InvalidLedgerEntry,

    #[msg("Batch size too large")]
    BatchTooLarge,

    #[msg("Duplicate beneficiary in payout map")]
    DuplicateBeneficiary,

    #[msg("Payout basis must not exceed the tea to be stored")]
    InvalidPayoutAmounts,
}
