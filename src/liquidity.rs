//! Liquidity operations for the pool
//!
//! Share math for deposits and withdrawals, and the mint/burn bookkeeping
//! that applies it to a staged `PoolState`.

use anchor_lang::prelude::*;

use crate::{
    state::PoolState,
    utils::{ceil_div, floor_div, isqrt, to_u64},
    ErrorCode, LIQUIDITY_SINK, MINIMUM_LIQUIDITY,
};

/// Calculate the amount of LP tokens to mint for a deposit
///
/// # Arguments
/// * `token_a_amount` - Amount of token A being deposited
/// * `token_b_amount` - Amount of token B being deposited
/// * `total_lp_supply` - Current total supply of LP tokens
/// * `token_a_reserve` - Current reserve of token A in the pool
/// * `token_b_reserve` - Current reserve of token B in the pool
///
/// # Returns
/// The LP tokens owed to the depositor. On the first deposit this already
/// excludes the `MINIMUM_LIQUIDITY` locked in the sink; a first deposit with
/// `sqrt(a * b) < MINIMUM_LIQUIDITY` fails with `InsufficientAmount`.
pub fn deposit_lp(
    token_a_amount: u64,
    token_b_amount: u64,
    total_lp_supply: u64,
    token_a_reserve: u64,
    token_b_reserve: u64,
) -> Result<u64> {
    if total_lp_supply == 0 {
        // LP tokens = sqrt(token_a * token_b) - MINIMUM_LIQUIDITY
        let root = isqrt(token_a_amount as u128 * token_b_amount as u128);
        let root = to_u64(root).ok_or(ErrorCode::MathOverflow)?;
        let shares = root
            .checked_sub(MINIMUM_LIQUIDITY)
            .ok_or(ErrorCode::InsufficientAmount)?;
        return Ok(shares);
    }

    require!(
        token_a_reserve > 0 && token_b_reserve > 0,
        ErrorCode::InsufficientLiquidity
    );

    let token_a_lp = floor_div(
        token_a_amount as u128,
        total_lp_supply as u128,
        token_a_reserve as u128,
    )
    .ok_or(ErrorCode::MathOverflow)?;
    let token_b_lp = floor_div(
        token_b_amount as u128,
        total_lp_supply as u128,
        token_b_reserve as u128,
    )
    .ok_or(ErrorCode::MathOverflow)?;

    // the smaller side keeps the pool ratio, any excess of the other side is donated
    let shares = to_u64(token_a_lp.min(token_b_lp)).ok_or(ErrorCode::MathOverflow)?;
    Ok(shares)
}

/// Calculate the amount of tokens to return for a withdrawal
///
/// # Arguments
/// * `lp_tokens` - Amount of LP tokens being burned
/// * `total_lp_supply` - Current total supply of LP tokens
/// * `token_a_reserve` - Current reserve of token A in the pool
/// * `token_b_reserve` - Current reserve of token B in the pool
///
/// # Returns
/// A tuple (token_a_amount, token_b_amount), both rounded down
pub fn withdraw_lp(
    lp_tokens: u64,
    total_lp_supply: u64,
    token_a_reserve: u64,
    token_b_reserve: u64,
) -> Result<(u64, u64)> {
    require!(total_lp_supply > 0, ErrorCode::InsufficientLiquidity);
    require_gte!(total_lp_supply, lp_tokens, ErrorCode::InsufficientShares);

    // lp_tokens <= total_lp_supply, so both results fit back into u64
    let token_a_amount = floor_div(
        lp_tokens as u128,
        token_a_reserve as u128,
        total_lp_supply as u128,
    )
    .and_then(to_u64)
    .ok_or(ErrorCode::MathOverflow)?;
    let token_b_amount = floor_div(
        lp_tokens as u128,
        token_b_reserve as u128,
        total_lp_supply as u128,
    )
    .and_then(to_u64)
    .ok_or(ErrorCode::MathOverflow)?;

    Ok((token_a_amount, token_b_amount))
}

/// Mint shares for a deposit that has already been pulled into the pool.
/// Locks `MINIMUM_LIQUIDITY` in the sink when the pool is being seeded.
pub(crate) fn mint_shares(
    state: &mut PoolState,
    provider: &Pubkey,
    amount_a: u64,
    amount_b: u64,
    min_shares_out: u64,
) -> Result<u64> {
    require!(
        amount_a > 0 && amount_b > 0,
        ErrorCode::InsufficientAmount
    );

    let (reserve_a, reserve_b) = state.reserves.get();
    let total_shares = state.shares.total();
    let shares = deposit_lp(amount_a, amount_b, total_shares, reserve_a, reserve_b)?;

    require!(shares > 0, ErrorCode::InsufficientAmount);
    require_gte!(shares, min_shares_out, ErrorCode::SlippageExceeded);

    if total_shares == 0 {
        state.shares.mint(&LIQUIDITY_SINK, MINIMUM_LIQUIDITY)?;
    }
    state.shares.mint(provider, shares)?;
    state
        .reserves
        .credit(amount_a, amount_b)
        .ok_or(ErrorCode::MathOverflow)?;

    Ok(shares)
}

/// Burn `shares_in` from `provider` and release the matching reserves.
/// Returns the amounts the caller must be paid.
pub(crate) fn burn_shares(
    state: &mut PoolState,
    provider: &Pubkey,
    shares_in: u64,
    min_a_out: u64,
    min_b_out: u64,
) -> Result<(u64, u64)> {
    // zero shares is reported as a bad redeemable token, not a bad amount
    require!(shares_in > 0, ErrorCode::InvalidToken);

    let (reserve_a, reserve_b) = state.reserves.get();
    let (amount_a, amount_b) =
        withdraw_lp(shares_in, state.shares.total(), reserve_a, reserve_b)?;

    require_gte!(amount_a, min_a_out, ErrorCode::SlippageExceeded);
    require_gte!(amount_b, min_b_out, ErrorCode::SlippageExceeded);

    state.shares.burn(provider, shares_in)?;
    state
        .reserves
        .debit(amount_a, amount_b)
        .ok_or(ErrorCode::MathOverflow)?;

    Ok((amount_a, amount_b))
}

/// Book a payout that left the pool and could not be taken back. Burns the
/// shares the payout is worth, rounded up and capped at the provider's
/// balance, and debits the reserves by what was paid.
pub(crate) fn burn_for_payout(
    state: &mut PoolState,
    provider: &Pubkey,
    amount_a: u64,
    amount_b: u64,
) -> Result<u64> {
    let (reserve_a, reserve_b) = state.reserves.get();
    let total_shares = state.shares.total() as u128;

    let mut owed: u128 = 0;
    for (amount, reserve) in [(amount_a, reserve_a), (amount_b, reserve_b)] {
        if amount == 0 {
            continue;
        }
        let worth = ceil_div(amount as u128, total_shares, reserve as u128)
            .ok_or(ErrorCode::MathOverflow)?;
        owed = owed.checked_add(worth).ok_or(ErrorCode::MathOverflow)?;
    }

    let mut reserves = state.reserves;
    reserves
        .debit(amount_a, amount_b)
        .ok_or(ErrorCode::MathOverflow)?;

    let balance = state.shares.balance_of(provider);
    let shares = to_u64(owed).map_or(balance, |owed| owed.min(balance));
    state.shares.burn(provider, shares)?;
    state.reserves = reserves;

    Ok(shares)
}
