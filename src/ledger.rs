//! Boundary to the fungible asset ledgers backing the two pooled assets.

use std::{cell::RefCell, collections::HashMap};

use anchor_lang::prelude::*;

use crate::ErrorCode;

/// A fungible asset ledger the pool moves funds through. Methods take `&self`
/// so an implementation can call back into the pool while a transfer is in
/// flight; the pool's lock rejects that.
pub trait AssetLedger {
    /// Identity of the asset this ledger tracks
    fn mint(&self) -> Pubkey;

    /// Move `amount` from `from` to `to` on `spender`'s allowance
    fn transfer_from(&self, spender: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> bool;

    /// Move `amount` owned by `owner` to `to`
    fn transfer(&self, owner: &Pubkey, to: &Pubkey, amount: u64) -> bool;

    fn balance_of(&self, owner: &Pubkey) -> u64;

    fn approve(&self, owner: &Pubkey, spender: &Pubkey, amount: u64) -> bool;
}

/// Balances and allowances held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    mint: Pubkey,
    balances: RefCell<HashMap<Pubkey, u64>>,
    allowances: RefCell<HashMap<(Pubkey, Pubkey), u64>>,
}

impl InMemoryLedger {
    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            ..Default::default()
        }
    }

    /// Create `amount` new units for `owner`
    pub fn mint_to(&self, owner: &Pubkey, amount: u64) -> bool {
        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry(*owner).or_default();
        match balance.checked_add(amount) {
            Some(updated) => {
                *balance = updated;
                true
            }
            None => false,
        }
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.allowances
            .borrow()
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn move_balance(&self, from: &Pubkey, to: &Pubkey, amount: u64) -> bool {
        let mut balances = self.balances.borrow_mut();
        let from_balance = balances.get(from).copied().unwrap_or(0);
        let Some(from_remaining) = from_balance.checked_sub(amount) else {
            return false;
        };
        if from == to {
            return true;
        }
        let to_balance = balances.get(to).copied().unwrap_or(0);
        let Some(to_updated) = to_balance.checked_add(amount) else {
            return false;
        };
        balances.insert(*from, from_remaining);
        balances.insert(*to, to_updated);
        true
    }
}

impl AssetLedger for InMemoryLedger {
    fn mint(&self) -> Pubkey {
        self.mint
    }

    fn transfer_from(&self, spender: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> bool {
        if spender == from {
            return self.move_balance(from, to, amount);
        }
        let allowance = self.allowance(from, spender);
        if allowance < amount || !self.move_balance(from, to, amount) {
            return false;
        }
        self.allowances
            .borrow_mut()
            .insert((*from, *spender), allowance - amount);
        true
    }

    fn transfer(&self, owner: &Pubkey, to: &Pubkey, amount: u64) -> bool {
        self.move_balance(owner, to, amount)
    }

    fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.balances.borrow().get(owner).copied().unwrap_or(0)
    }

    fn approve(&self, owner: &Pubkey, spender: &Pubkey, amount: u64) -> bool {
        self.allowances
            .borrow_mut()
            .insert((*owner, *spender), amount);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Inbound,
    Outbound,
}

struct JournalEntry<'a> {
    ledger: &'a dyn AssetLedger,
    counterparty: Pubkey,
    amount: u64,
    flow: Flow,
}

/// A transfer the ledger refused to reverse during rollback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stranded {
    pub mint: Pubkey,
    pub counterparty: Pubkey,
    pub amount: u64,
    pub flow: Flow,
}

/// Records the transfers of one pool operation. Unless `commit` is called,
/// dropping the journal replays compensating transfers in reverse order.
pub(crate) struct TransferJournal<'a> {
    pool: Pubkey,
    entries: Vec<JournalEntry<'a>>,
}

impl<'a> TransferJournal<'a> {
    pub(crate) fn new(pool: Pubkey) -> Self {
        Self {
            pool,
            entries: Vec::new(),
        }
    }

    /// Pull `amount` from `from` into the pool
    pub(crate) fn pull(
        &mut self,
        ledger: &'a dyn AssetLedger,
        from: &Pubkey,
        amount: u64,
    ) -> Result<()> {
        require!(
            ledger.transfer_from(&self.pool, from, &self.pool, amount),
            ErrorCode::TransferFailed
        );
        self.entries.push(JournalEntry {
            ledger,
            counterparty: *from,
            amount,
            flow: Flow::Inbound,
        });
        Ok(())
    }

    /// Push `amount` from the pool to `to`
    pub(crate) fn push(&mut self, ledger: &'a dyn AssetLedger, to: &Pubkey, amount: u64) -> Result<()> {
        require!(
            ledger.transfer(&self.pool, to, amount),
            ErrorCode::TransferFailed
        );
        self.entries.push(JournalEntry {
            ledger,
            counterparty: *to,
            amount,
            flow: Flow::Outbound,
        });
        Ok(())
    }

    pub(crate) fn commit(mut self) {
        self.entries.clear();
    }

    /// Roll back now and report what could not be undone.
    pub(crate) fn revert(mut self) -> Vec<Stranded> {
        self.rollback()
    }

    fn rollback(&mut self) -> Vec<Stranded> {
        let mut stranded = Vec::new();
        while let Some(entry) = self.entries.pop() {
            let restored = match entry.flow {
                Flow::Inbound => entry
                    .ledger
                    .transfer(&self.pool, &entry.counterparty, entry.amount),
                Flow::Outbound => entry.ledger.transfer_from(
                    &self.pool,
                    &entry.counterparty,
                    &self.pool,
                    entry.amount,
                ),
            };
            if !restored {
                msg!(
                    "rollback of {:?} transfer of {} {} for {} failed",
                    entry.flow,
                    entry.amount,
                    entry.ledger.mint(),
                    entry.counterparty
                );
                stranded.push(Stranded {
                    mint: entry.ledger.mint(),
                    counterparty: entry.counterparty,
                    amount: entry.amount,
                    flow: entry.flow,
                });
            }
        }
        stranded
    }
}

impl Drop for TransferJournal<'_> {
    fn drop(&mut self) {
        self.rollback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(owner: &Pubkey, amount: u64) -> InMemoryLedger {
        let ledger = InMemoryLedger::new(Pubkey::new_unique());
        assert!(ledger.mint_to(owner, amount));
        ledger
    }

    #[test]
    fn test_transfer_moves_balance() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let ledger = funded(&alice, 100);

        assert!(ledger.transfer(&alice, &bob, 40));
        assert_eq!(ledger.balance_of(&alice), 60);
        assert_eq!(ledger.balance_of(&bob), 40);
        assert!(!ledger.transfer(&alice, &bob, 61));
        assert_eq!(ledger.balance_of(&alice), 60);
    }

    #[test]
    fn test_transfer_from_uses_allowance() {
        let alice = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let ledger = funded(&alice, 100);

        assert!(!ledger.transfer_from(&pool, &alice, &pool, 10));
        assert!(ledger.approve(&alice, &pool, 30));
        assert!(ledger.transfer_from(&pool, &alice, &pool, 25));
        assert_eq!(ledger.allowance(&alice, &pool), 5);
        assert!(!ledger.transfer_from(&pool, &alice, &pool, 6));
        assert_eq!(ledger.balance_of(&pool), 25);
    }

    #[test]
    fn test_mint_to_overflow() {
        let alice = Pubkey::new_unique();
        let ledger = funded(&alice, u64::MAX);
        assert!(!ledger.mint_to(&alice, 1));
        assert_eq!(ledger.balance_of(&alice), u64::MAX);
    }

    #[test]
    fn test_journal_rolls_back_on_drop() {
        let alice = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let token_a = funded(&alice, 100);
        let token_b = funded(&pool, 100);
        token_a.approve(&alice, &pool, u64::MAX);
        token_b.approve(&alice, &pool, u64::MAX);

        {
            let mut journal = TransferJournal::new(pool);
            journal.pull(&token_a, &alice, 70).unwrap();
            journal.push(&token_b, &alice, 50).unwrap();
            assert_eq!(token_a.balance_of(&pool), 70);
            assert_eq!(token_b.balance_of(&alice), 50);
        }

        assert_eq!(token_a.balance_of(&alice), 100);
        assert_eq!(token_a.balance_of(&pool), 0);
        assert_eq!(token_b.balance_of(&alice), 0);
        assert_eq!(token_b.balance_of(&pool), 100);
    }

    #[test]
    fn test_journal_commit_keeps_transfers() {
        let alice = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let token_a = funded(&alice, 100);
        token_a.approve(&alice, &pool, 100);

        let mut journal = TransferJournal::new(pool);
        journal.pull(&token_a, &alice, 70).unwrap();
        journal.commit();

        assert_eq!(token_a.balance_of(&pool), 70);
    }

    #[test]
    fn test_journal_reports_failed_clawback() {
        let alice = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let token_a = funded(&pool, 100);
        let token_b = funded(&pool, 100);
        token_b.approve(&alice, &pool, u64::MAX);

        let mut journal = TransferJournal::new(pool);
        journal.push(&token_a, &alice, 60).unwrap();
        journal.push(&token_b, &alice, 40).unwrap();
        let stranded = journal.revert();

        // only token B was approved for the clawback
        assert_eq!(
            stranded,
            vec![Stranded {
                mint: token_a.mint(),
                counterparty: alice,
                amount: 60,
                flow: Flow::Outbound,
            }]
        );
        assert_eq!(token_a.balance_of(&alice), 60);
        assert_eq!(token_b.balance_of(&pool), 100);
    }

    #[test]
    fn test_journal_failed_transfer_is_not_recorded() {
        let alice = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let token_a = funded(&alice, 100);

        let mut journal = TransferJournal::new(pool);
        assert!(journal.pull(&token_a, &alice, 70).is_err());
        drop(journal);

        assert_eq!(token_a.balance_of(&alice), 100);
    }
}
