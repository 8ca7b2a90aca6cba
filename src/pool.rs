//! The pool aggregate and its public entry points.
//!
//! Every mutating call takes the reentrancy lock, validates its arguments,
//! computes its effects on a staged copy of the state, settles transfers
//! through a `TransferJournal`, and only then commits. Any failure drops the
//! staged state and the journal rolls the transfers back. A transfer the
//! ledger refuses to reverse is booked into the committed state instead, so
//! reserves never claim funds the pool does not hold.

use std::{cell::RefCell, rc::Rc};

use anchor_lang::{error::Error, prelude::*};

use crate::{
    events::{LiquidityAdded, LiquidityRemoved, ReservesSynced, Swapped},
    guard::{check_invariant, require_positive, validate_asset, validate_caller, ReentrancyLock},
    ledger::{AssetLedger, Flow, TransferJournal},
    liquidity,
    state::{PoolSnapshot, PoolState, SwapDirection},
    swap, ErrorCode, LIQUIDITY_SINK,
};

pub struct Pool {
    address: Pubkey,
    asset_a: Rc<dyn AssetLedger>,
    asset_b: Rc<dyn AssetLedger>,
    state: RefCell<PoolState>,
    lock: ReentrancyLock,
}

impl Pool {
    /// Create an empty pool at `address` over two distinct, non-null assets.
    /// The pool must be approved by depositors and traders on both ledgers.
    pub fn new(
        address: Pubkey,
        asset_a: Rc<dyn AssetLedger>,
        asset_b: Rc<dyn AssetLedger>,
    ) -> Result<Self> {
        let (mint_a, mint_b) = (asset_a.mint(), asset_b.mint());
        validate_asset(&mint_a)?;
        validate_asset(&mint_b)?;
        require_keys_neq!(mint_a, mint_b, ErrorCode::InvalidToken);
        require_keys_neq!(address, LIQUIDITY_SINK, ErrorCode::InvalidCaller);

        msg!("pool {} created for {} / {}", address, mint_a, mint_b);

        Ok(Self {
            address,
            asset_a,
            asset_b,
            state: RefCell::new(PoolState::default()),
            lock: ReentrancyLock::default(),
        })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn asset_a(&self) -> Pubkey {
        self.asset_a.mint()
    }

    pub fn asset_b(&self) -> Pubkey {
        self.asset_b.mint()
    }

    /// Committed (reserve_a, reserve_b). Never reflects an in-flight call.
    pub fn get_reserves(&self) -> (u64, u64) {
        self.state.borrow().reserves.get()
    }

    pub fn total_shares(&self) -> u64 {
        self.state.borrow().shares.total()
    }

    pub fn share_balance_of(&self, owner: &Pubkey) -> u64 {
        self.state.borrow().shares.balance_of(owner)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state.borrow();
        let (reserve_a, reserve_b) = state.reserves.get();
        PoolSnapshot {
            asset_a: self.asset_a(),
            asset_b: self.asset_b(),
            reserve_a,
            reserve_b,
            total_shares: state.shares.total(),
            balances: state
                .shares
                .holders()
                .map(|(owner, balance)| (*owner, *balance))
                .collect(),
        }
    }

    /// Deposit both assets and receive ownership shares
    ///
    /// # Arguments
    /// * `provider` - Depositor, pays both amounts and receives the shares
    /// * `amount_a` - Amount of asset A to deposit
    /// * `amount_b` - Amount of asset B to deposit
    /// * `min_shares_out` - Fail with `SlippageExceeded` below this many shares
    ///
    /// # Returns
    /// The shares minted to `provider`
    pub fn add_liquidity(
        &self,
        provider: &Pubkey,
        amount_a: u64,
        amount_b: u64,
        min_shares_out: u64,
    ) -> Result<u64> {
        let _entry = self.lock.enter()?;
        validate_caller(provider, &self.address)?;
        require_positive(amount_a)?;
        require_positive(amount_b)?;

        let mut journal = TransferJournal::new(self.address);
        let mut staged = self.state.borrow().clone();
        let minted = journal
            .pull(self.asset_a.as_ref(), provider, amount_a)
            .and_then(|()| journal.pull(self.asset_b.as_ref(), provider, amount_b))
            .and_then(|()| {
                liquidity::mint_shares(&mut staged, provider, amount_a, amount_b, min_shares_out)
            });
        let shares_minted = match minted {
            Ok(shares) => shares,
            Err(error) => return Err(self.abort(journal, error)),
        };

        self.commit(journal, |state| *state = staged);
        emit!(LiquidityAdded {
            provider: *provider,
            amount_a,
            amount_b,
            shares_minted,
        });

        Ok(shares_minted)
    }

    /// Burn shares and receive the proportional part of both reserves
    ///
    /// # Arguments
    /// * `provider` - Share owner, receives both assets
    /// * `shares_in` - Shares to burn, must be positive
    /// * `min_a_out` - Minimum amount of asset A to receive
    /// * `min_b_out` - Minimum amount of asset B to receive
    ///
    /// # Returns
    /// A tuple (amount_a, amount_b) paid to `provider`
    pub fn remove_liquidity(
        &self,
        provider: &Pubkey,
        shares_in: u64,
        min_a_out: u64,
        min_b_out: u64,
    ) -> Result<(u64, u64)> {
        let _entry = self.lock.enter()?;
        validate_caller(provider, &self.address)?;

        let mut staged = self.state.borrow().clone();
        let (amount_a, amount_b) =
            liquidity::burn_shares(&mut staged, provider, shares_in, min_a_out, min_b_out)?;

        // a short pool balance would leave the first payout to be clawed back
        require_gte!(
            self.asset_a.balance_of(&self.address),
            amount_a,
            ErrorCode::TransferFailed
        );
        require_gte!(
            self.asset_b.balance_of(&self.address),
            amount_b,
            ErrorCode::TransferFailed
        );

        let mut journal = TransferJournal::new(self.address);
        let paid = journal
            .push(self.asset_a.as_ref(), provider, amount_a)
            .and_then(|()| journal.push(self.asset_b.as_ref(), provider, amount_b));
        if let Err(error) = paid {
            return Err(self.abort(journal, error));
        }

        self.commit(journal, |state| *state = staged);
        emit!(LiquidityRemoved {
            provider: *provider,
            amount_a,
            amount_b,
            shares_burned: shares_in,
        });

        Ok((amount_a, amount_b))
    }

    /// Sell `amount_in` of asset A for asset B
    pub fn swap_a_for_b(&self, trader: &Pubkey, amount_in: u64, min_amount_out: u64) -> Result<u64> {
        self.swap(trader, SwapDirection::AToB, amount_in, min_amount_out)
    }

    /// Sell `amount_in` of asset B for asset A
    pub fn swap_b_for_a(&self, trader: &Pubkey, amount_in: u64, min_amount_out: u64) -> Result<u64> {
        self.swap(trader, SwapDirection::BToA, amount_in, min_amount_out)
    }

    fn swap(
        &self,
        trader: &Pubkey,
        direction: SwapDirection,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<u64> {
        let _entry = self.lock.enter()?;
        validate_caller(trader, &self.address)?;
        require_positive(amount_in)?;

        let mut staged = self.state.borrow().reserves;
        let product_before = staged.product();
        let amount_out = swap::apply_swap(&mut staged, direction, amount_in, min_amount_out)?;
        check_invariant(product_before, staged.product())?;

        let (ledger_in, ledger_out) = self.ledgers(direction);
        let mut journal = TransferJournal::new(self.address);
        let settled = journal
            .pull(ledger_in, trader, amount_in)
            .and_then(|()| journal.push(ledger_out, trader, amount_out));
        if let Err(error) = settled {
            return Err(self.abort(journal, error));
        }

        self.commit(journal, |state| state.reserves = staged);
        emit!(Swapped {
            trader: *trader,
            input_asset: ledger_in.mint(),
            amount_in,
            amount_out,
        });

        Ok(amount_out)
    }

    fn ledgers(&self, direction: SwapDirection) -> (&dyn AssetLedger, &dyn AssetLedger) {
        match direction {
            SwapDirection::AToB => (self.asset_a.as_ref(), self.asset_b.as_ref()),
            SwapDirection::BToA => (self.asset_b.as_ref(), self.asset_a.as_ref()),
        }
    }

    fn commit(&self, journal: TransferJournal<'_>, update: impl FnOnce(&mut PoolState)) {
        journal.commit();
        self.store(update);
    }

    fn store(&self, update: impl FnOnce(&mut PoolState)) {
        let (reserve_a, reserve_b) = {
            let mut state = self.state.borrow_mut();
            update(&mut *state);
            state.reserves.get()
        };
        emit!(ReservesSynced {
            reserve_a,
            reserve_b,
        });
    }

    /// Roll back a failed call. Returns `error` when every transfer was
    /// undone. Otherwise the stranded transfers are booked: an unrefunded
    /// pull stays in the reserves, an unrecovered payout burns the shares it
    /// is worth and leaves the reserves, and the call fails with
    /// `SettlementFailed`.
    fn abort(&self, journal: TransferJournal<'_>, error: Error) -> Error {
        let stranded = journal.revert();
        if stranded.is_empty() {
            return error;
        }
        msg!("{} transfer(s) not reversed after: {}", stranded.len(), error);

        let mint_a = self.asset_a.mint();
        let mut staged = self.state.borrow().clone();
        for entry in &stranded {
            let (amount_a, amount_b) = if entry.mint == mint_a {
                (entry.amount, 0)
            } else {
                (0, entry.amount)
            };
            let booked = match entry.flow {
                Flow::Inbound => staged
                    .reserves
                    .credit(amount_a, amount_b)
                    .ok_or_else(|| Error::from(ErrorCode::MathOverflow)),
                Flow::Outbound => {
                    liquidity::burn_for_payout(&mut staged, &entry.counterparty, amount_a, amount_b)
                        .map(|_| ())
                }
            };
            if let Err(failure) = booked {
                msg!("could not book {:?} transfer of {}: {}", entry.flow, entry.amount, failure);
            }
        }
        self.store(|state| *state = staged);

        ErrorCode::SettlementFailed.into()
    }
}
