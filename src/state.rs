use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    AToB,
    BToA,
}

/// Reserve balances of the pool. Only this type writes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reserves {
    reserve_a: u64,
    reserve_b: u64,
}

impl Reserves {
    pub fn get(&self) -> (u64, u64) {
        (self.reserve_a, self.reserve_b)
    }

    pub fn is_empty(&self) -> bool {
        self.reserve_a == 0 && self.reserve_b == 0
    }

    /// x * y, exact for any pair of u64 reserves
    pub fn product(&self) -> u128 {
        self.reserve_a as u128 * self.reserve_b as u128
    }

    /// (reserve_in, reserve_out) for a trade in `direction`
    pub fn oriented(&self, direction: SwapDirection) -> (u64, u64) {
        match direction {
            SwapDirection::AToB => (self.reserve_a, self.reserve_b),
            SwapDirection::BToA => (self.reserve_b, self.reserve_a),
        }
    }

    pub(crate) fn credit(&mut self, amount_a: u64, amount_b: u64) -> Option<()> {
        let reserve_a = self.reserve_a.checked_add(amount_a)?;
        let reserve_b = self.reserve_b.checked_add(amount_b)?;
        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        Some(())
    }

    pub(crate) fn debit(&mut self, amount_a: u64, amount_b: u64) -> Option<()> {
        let reserve_a = self.reserve_a.checked_sub(amount_a)?;
        let reserve_b = self.reserve_b.checked_sub(amount_b)?;
        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        Some(())
    }

    pub(crate) fn apply_swap(
        &mut self,
        direction: SwapDirection,
        amount_in: u64,
        amount_out: u64,
    ) -> Option<()> {
        match direction {
            SwapDirection::AToB => {
                let reserve_a = self.reserve_a.checked_add(amount_in)?;
                let reserve_b = self.reserve_b.checked_sub(amount_out)?;
                self.reserve_a = reserve_a;
                self.reserve_b = reserve_b;
            }
            SwapDirection::BToA => {
                let reserve_b = self.reserve_b.checked_add(amount_in)?;
                let reserve_a = self.reserve_a.checked_sub(amount_out)?;
                self.reserve_a = reserve_a;
                self.reserve_b = reserve_b;
            }
        }
        Some(())
    }
}

/// Ownership shares. Balances always sum to `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareSupply {
    total: u64,
    balances: BTreeMap<Pubkey, u64>,
}

impl ShareSupply {
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Pubkey, &u64)> {
        self.balances.iter()
    }

    pub(crate) fn mint(&mut self, owner: &Pubkey, amount: u64) -> Result<()> {
        let total = self
            .total
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        let balance = self
            .balance_of(owner)
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.total = total;
        self.balances.insert(*owner, balance);
        Ok(())
    }

    pub(crate) fn burn(&mut self, owner: &Pubkey, amount: u64) -> Result<()> {
        let balance = self.balance_of(owner);
        require_gte!(balance, amount, ErrorCode::InsufficientShares);

        let remaining = balance - amount;
        self.total = self
            .total
            .checked_sub(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        if remaining == 0 {
            self.balances.remove(owner);
        } else {
            self.balances.insert(*owner, remaining);
        }
        Ok(())
    }
}

/// The pool aggregate every component operates on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolState {
    pub reserves: Reserves,
    pub shares: ShareSupply,
}

/// Serializable view of the pool, for persistence and inspection.
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub asset_a: Pubkey,
    pub asset_b: Pubkey,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub total_shares: u64,
    pub balances: Vec<(Pubkey, u64)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    #[test]
    fn test_reserves_debit_cannot_go_negative() {
        let mut reserves = Reserves::default();
        reserves.credit(100, 200).unwrap();
        assert_eq!(reserves.debit(101, 0), None);
        // failed debit leaves both sides untouched
        assert_eq!(reserves.get(), (100, 200));
        reserves.debit(100, 200).unwrap();
        assert!(reserves.is_empty());
    }

    #[test]
    fn test_reserves_credit_overflow() {
        let mut reserves = Reserves::default();
        reserves.credit(1, u64::MAX).unwrap();
        assert_eq!(reserves.credit(1, 1), None);
        assert_eq!(reserves.get(), (1, u64::MAX));
    }

    #[test]
    fn test_reserves_apply_swap() {
        let mut reserves = Reserves::default();
        reserves.credit(1_000, 2_000).unwrap();
        reserves.apply_swap(SwapDirection::AToB, 100, 181).unwrap();
        assert_eq!(reserves.get(), (1_100, 1_819));
        assert_eq!(reserves.oriented(SwapDirection::BToA), (1_819, 1_100));
        assert_eq!(reserves.apply_swap(SwapDirection::BToA, 1, 1_101), None);
    }

    #[test]
    fn test_share_mint_and_burn() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut shares = ShareSupply::default();

        shares.mint(&alice, 500).unwrap();
        shares.mint(&bob, 250).unwrap();
        assert_eq!(shares.total(), 750);

        shares.burn(&alice, 500).unwrap();
        assert_eq!(shares.balance_of(&alice), 0);
        assert_eq!(shares.total(), 250);
        assert_eq!(shares.holders().count(), 1);
    }

    #[test]
    fn test_share_burn_more_than_balance() {
        let alice = Pubkey::new_unique();
        let mut shares = ShareSupply::default();
        shares.mint(&alice, 10).unwrap();

        let err = shares.burn(&alice, 11).unwrap_err();
        assert_eq!(err, Error::from(ErrorCode::InsufficientShares));
        assert_eq!(shares.balance_of(&alice), 10);
    }
}
