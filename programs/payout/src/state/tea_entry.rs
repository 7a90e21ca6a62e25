use anchor_lang::prelude::*;
use anchor_lang::AccountsExit;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

use crate::constants::TEA_SEED;
use crate::engine::TeaLedger;
use crate::error::PayoutError;

/// Ledger entry PDA: total earned amount already paid to one beneficiary.
/// Entries are never closed.
#[account]
pub struct TeaEntry {
    pub beneficiary: Pubkey,
    pub tea: u64,
    pub bump: u8,
}

impl TeaEntry {
    pub const SIZE: usize =
        32 + // beneficiary
        8 +  // tea
        1;   // bump

    /// Discriminator + data.
    pub const SPACE: usize = 8 + Self::SIZE;

    pub fn address(beneficiary: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[TEA_SEED, beneficiary.as_ref()], &crate::ID)
    }

    /// Claims a freshly `init_if_needed` entry for `beneficiary`.
    pub fn bind(&mut self, beneficiary: &Pubkey, bump: u8) -> std::result::Result<(), PayoutError> {
        if self.beneficiary == Pubkey::default() {
            self.beneficiary = *beneficiary;
            self.bump = bump;
        }
        if self.beneficiary != *beneficiary {
            return Err(PayoutError::InvalidLedgerEntry);
        }
        Ok(())
    }
}

impl TeaLedger for TeaEntry {
    fn tea(&self, beneficiary: &Pubkey) -> u64 {
        if self.beneficiary == *beneficiary {
            self.tea
        } else {
            0
        }
    }

    fn set_tea(&mut self, beneficiary: &Pubkey, tea: u64) -> std::result::Result<(), PayoutError> {
        if self.beneficiary != *beneficiary {
            return Err(PayoutError::InvalidLedgerEntry);
        }
        self.tea = tea;
        Ok(())
    }
}

/// Stored TEA behind `entry_info`; 0 while the entry does not exist.
pub fn read_tea(entry_info: &AccountInfo, beneficiary: &Pubkey) -> Result<u64> {
    if entry_info.owner != &crate::ID || entry_info.data_is_empty() {
        return Ok(0);
    }
    let data = entry_info.try_borrow_data()?;
    let entry = TeaEntry::try_deserialize(&mut &data[..])?;
    Ok(entry.tea(beneficiary))
}

/// Ledger over entries passed as remaining accounts. Missing entries are
/// created on their first write, so a skipped item costs no rent. Writes to
/// existing entries stay in memory until [`EntryLedger::persist`].
pub struct EntryLedger<'info> {
    entries: Vec<Account<'info, TeaEntry>>,
    pending: Vec<(Pubkey, &'info AccountInfo<'info>)>,
    payer: AccountInfo<'info>,
    system_program: AccountInfo<'info>,
}

impl<'info> EntryLedger<'info> {
    /// Checks every `(beneficiary, entry)` pair and loads the entries that
    /// exist. A beneficiary listed twice shares the first entry so that a
    /// single write wins on persist.
    pub fn load(
        pairs: &[(Pubkey, &'info AccountInfo<'info>)],
        payer: &AccountInfo<'info>,
        system_program: &AccountInfo<'info>,
    ) -> Result<Self> {
        let mut ledger = Self {
            entries: Vec::with_capacity(pairs.len()),
            pending: Vec::new(),
            payer: payer.clone(),
            system_program: system_program.clone(),
        };
        for &(beneficiary, info) in pairs {
            if ledger.knows(&beneficiary) {
                continue;
            }
            entry_bump(info, &beneficiary)?;
            if info.owner == &crate::ID {
                let entry = Account::<TeaEntry>::try_from(info)?;
                require_keys_eq!(entry.beneficiary, beneficiary, PayoutError::InvalidLedgerEntry);
                ledger.entries.push(entry);
            } else {
                ledger.pending.push((beneficiary, info));
            }
        }
        Ok(ledger)
    }

    /// Creates every entry still missing. Returns the beneficiaries created.
    pub fn create_missing(&mut self) -> Result<Vec<Pubkey>> {
        let pending = std::mem::take(&mut self.pending);
        let mut created = Vec::with_capacity(pending.len());
        for (beneficiary, info) in pending {
            self.create(beneficiary, info)?;
            created.push(beneficiary);
        }
        Ok(created)
    }

    pub fn persist(&self) -> Result<()> {
        for entry in &self.entries {
            entry.exit(&crate::ID)?;
        }
        Ok(())
    }

    fn knows(&self, beneficiary: &Pubkey) -> bool {
        self.entries.iter().any(|e| e.beneficiary == *beneficiary)
            || self.pending.iter().any(|(b, _)| b == beneficiary)
    }

    fn create(&mut self, beneficiary: Pubkey, info: &'info AccountInfo<'info>) -> Result<usize> {
        let (entry, _) = load_or_create_entry(info, &beneficiary, &self.payer, &self.system_program)?;
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }
}

impl TeaLedger for EntryLedger<'_> {
    fn tea(&self, beneficiary: &Pubkey) -> u64 {
        self.entries
            .iter()
            .find(|e| e.beneficiary == *beneficiary)
            .map(|e| e.tea)
            .unwrap_or(0)
    }

    fn set_tea(&mut self, beneficiary: &Pubkey, tea: u64) -> std::result::Result<(), PayoutError> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.beneficiary == *beneficiary) {
            entry.tea = tea;
            return Ok(());
        }
        let at = self
            .pending
            .iter()
            .position(|(b, _)| b == beneficiary)
            .ok_or(PayoutError::InvalidLedgerEntry)?;
        let (beneficiary, info) = self.pending.remove(at);
        let index = self.create(beneficiary, info).map_err(|err| {
            msg!("Creating ledger entry for {} failed: {}", beneficiary, err);
            PayoutError::InvalidLedgerEntry
        })?;
        self.entries[index].tea = tea;
        Ok(())
    }
}

/// Canonical bump of the entry PDA, once `entry_info` is known to be it.
fn entry_bump(entry_info: &AccountInfo, beneficiary: &Pubkey) -> Result<u8> {
    let (expected, bump) = TeaEntry::address(beneficiary);
    require_keys_eq!(entry_info.key(), expected, PayoutError::InvalidLedgerEntry);
    require!(entry_info.is_writable, PayoutError::InvalidLedgerEntry);
    Ok(bump)
}

/// Loads the ledger entry of `beneficiary` from `entry_info`, creating it
/// with TEA 0 (rent paid by `payer`) when it does not exist yet.
/// Returns the entry and whether it was created.
pub fn load_or_create_entry<'info>(
    entry_info: &'info AccountInfo<'info>,
    beneficiary: &Pubkey,
    payer: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
) -> Result<(Account<'info, TeaEntry>, bool)> {
    let bump = entry_bump(entry_info, beneficiary)?;

    if entry_info.owner == &crate::ID {
        let entry = Account::<TeaEntry>::try_from(entry_info)?;
        require_keys_eq!(entry.beneficiary, *beneficiary, PayoutError::InvalidLedgerEntry);
        return Ok((entry, false));
    }

    let signer_seeds: &[&[&[u8]]] = &[&[TEA_SEED, beneficiary.as_ref(), &[bump]]];
    let rent = Rent::get()?.minimum_balance(TeaEntry::SPACE);
    let current = entry_info.lamports();

    if current == 0 {
        system_program::create_account(
            CpiContext::new_with_signer(
                system_program.clone(),
                CreateAccount {
                    from: payer.clone(),
                    to: entry_info.clone(),
                },
                signer_seeds,
            ),
            rent,
            TeaEntry::SPACE as u64,
            &crate::ID,
        )?;
    } else {
        // Address was pre-funded; top up, then allocate and assign.
        let top_up = rent.saturating_sub(current);
        if top_up > 0 {
            system_program::transfer(
                CpiContext::new(
                    system_program.clone(),
                    Transfer {
                        from: payer.clone(),
                        to: entry_info.clone(),
                    },
                ),
                top_up,
            )?;
        }
        system_program::allocate(
            CpiContext::new_with_signer(
                system_program.clone(),
                Allocate {
                    account_to_allocate: entry_info.clone(),
                },
                signer_seeds,
            ),
            TeaEntry::SPACE as u64,
        )?;
        system_program::assign(
            CpiContext::new_with_signer(
                system_program.clone(),
                Assign {
                    account_to_assign: entry_info.clone(),
                },
                signer_seeds,
            ),
            &crate::ID,
        )?;
    }

    let entry = TeaEntry {
        beneficiary: *beneficiary,
        tea: 0,
        bump,
    };
    {
        let mut data = entry_info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        entry.try_serialize(&mut writer)?;
    }

    Ok((Account::<TeaEntry>::try_from(entry_info)?, true))
}
