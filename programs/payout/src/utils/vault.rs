use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::constants::CONFIG_SEED;
use crate::engine::TokenTransfer;
use crate::error::PayoutError;
use crate::state::PayoutConfig;

/// [`TokenTransfer`] paying out of the vault PDA, signed by the config PDA.
///
/// A CPI failure would abort the whole transaction, so recipients are
/// checked first and a bad recipient or an empty vault is reported as
/// `TransferFailed`, which a skip-on-failure batch can step over. Anything
/// the token program itself rejects (a frozen vault, say) still aborts.
pub struct VaultTransfer<'info> {
    token_program: AccountInfo<'info>,
    vault: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    authority_bump: u8,
    mint: Pubkey,
    available: u64,
    recipients: Vec<(Pubkey, AccountInfo<'info>)>,
}

impl<'info> VaultTransfer<'info> {
    pub fn new(
        token_program: AccountInfo<'info>,
        vault: &Account<'info, TokenAccount>,
        config: &Account<'info, PayoutConfig>,
    ) -> Self {
        Self {
            token_program,
            vault: vault.to_account_info(),
            authority: config.to_account_info(),
            authority_bump: config.bump,
            mint: config.mint,
            available: vault.amount,
            recipients: Vec::new(),
        }
    }

    /// Registers the token account that pays out to `beneficiary`.
    pub fn with_recipient(mut self, beneficiary: Pubkey, token_account: AccountInfo<'info>) -> Self {
        self.add_recipient(beneficiary, token_account);
        self
    }

    pub fn add_recipient(&mut self, beneficiary: Pubkey, token_account: AccountInfo<'info>) {
        self.recipients.push((beneficiary, token_account));
    }

    fn recipient_for(&self, beneficiary: &Pubkey) -> Option<AccountInfo<'info>> {
        let (_, info) = self.recipients.iter().find(|(owner, _)| owner == beneficiary)?;
        if info.owner != &token::ID || !info.is_writable {
            return None;
        }
        let data = info.try_borrow_data().ok()?;
        let account = TokenAccount::try_deserialize(&mut &data[..]).ok()?;
        if account.mint != self.mint || account.owner != *beneficiary || account.is_frozen() {
            return None;
        }
        Some(info.clone())
    }
}

impl TokenTransfer for VaultTransfer<'_> {
    fn available(&self) -> u64 {
        self.available
    }

    fn transfer(&mut self, to: &Pubkey, amount: u64) -> std::result::Result<(), PayoutError> {
        if amount > self.available {
            return Err(PayoutError::TransferFailed);
        }
        let recipient = self.recipient_for(to).ok_or(PayoutError::TransferFailed)?;

        let signer_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &[self.authority_bump]]];
        token::transfer(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                Transfer {
                    from: self.vault.clone(),
                    to: recipient,
                    authority: self.authority.clone(),
                },
                signer_seeds,
            ),
            amount,
        )
        // Only reachable for errors raised before the program is invoked.
        .map_err(|_| PayoutError::TransferFailed)?;

        self.available -= amount;
        Ok(())
    }
}
