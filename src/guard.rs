//! Entry checks shared by every mutating pool operation.

use std::cell::Cell;

use anchor_lang::prelude::*;

use crate::{ErrorCode, LIQUIDITY_SINK};

/// Single-writer flag. A second entry while one is active fails with
/// `Locked` instead of waiting.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    entered: Cell<bool>,
}

impl ReentrancyLock {
    pub fn enter(&self) -> Result<EntryGuard<'_>> {
        require!(!self.entered.get(), ErrorCode::Locked);
        self.entered.set(true);
        Ok(EntryGuard { lock: self })
    }

    pub fn is_locked(&self) -> bool {
        self.entered.get()
    }
}

/// Releases the lock when dropped, on success and on every error path.
#[must_use]
pub struct EntryGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered.set(false);
    }
}

pub fn validate_asset(asset: &Pubkey) -> Result<()> {
    require_keys_neq!(*asset, Pubkey::default(), ErrorCode::InvalidToken);
    Ok(())
}

/// The sink owns the locked shares and `pool` holds the reserves, so nobody
/// may act under either identity.
pub fn validate_caller(caller: &Pubkey, pool: &Pubkey) -> Result<()> {
    require_keys_neq!(*caller, LIQUIDITY_SINK, ErrorCode::InvalidCaller);
    require_keys_neq!(*caller, *pool, ErrorCode::InvalidCaller);
    Ok(())
}

pub fn require_positive(amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InsufficientAmount);
    Ok(())
}

/// Reserve product must not shrink across a swap. A failure here is a bug in
/// the pricing path, never a user error.
pub fn check_invariant(product_before: u128, product_after: u128) -> Result<()> {
    if product_after < product_before {
        msg!(
            "invariant violated: k before {} after {}",
            product_before,
            product_after
        );
        return err!(ErrorCode::InvariantViolation);
    }
    Ok(())
}
