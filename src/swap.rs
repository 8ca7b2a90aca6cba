//! Swap operations for the pool
//!
//! Constant-product pricing with the fee taken on the input side.

use anchor_lang::prelude::*;

use crate::{
    state::{Reserves, SwapDirection},
    utils::{wide_to_u64, U256},
    ErrorCode, FEE_DENOMINATOR, FEE_NUMERATOR,
};

/// Calculate the output amount for a given input amount, fee taken on input
///
/// # Arguments
/// * `amount_in` - The amount of input tokens
/// * `reserve_in` - The reserve of input tokens in the pool
/// * `reserve_out` - The reserve of output tokens in the pool
///
/// # Returns
/// The output amount, rounded down. Always strictly below `reserve_out`.
pub fn get_amount_out(amount_in: u64, reserve_in: u64, reserve_out: u64) -> Result<u64> {
    require!(amount_in > 0, ErrorCode::InsufficientAmount);
    require!(
        reserve_in > 0 && reserve_out > 0,
        ErrorCode::InsufficientLiquidity
    );

    // amount_in * 997 * reserve_out can exceed u128
    let amount_in_with_fee = U256::from(amount_in) * U256::from(FEE_NUMERATOR);
    let numerator = amount_in_with_fee
        .checked_mul(U256::from(reserve_out))
        .ok_or(ErrorCode::MathOverflow)?;
    let denominator = (U256::from(reserve_in) * U256::from(FEE_DENOMINATOR))
        .checked_add(amount_in_with_fee)
        .ok_or(ErrorCode::MathOverflow)?;

    let amount_out = numerator
        .checked_div(denominator)
        .and_then(wide_to_u64)
        .ok_or(ErrorCode::MathOverflow)?;
    Ok(amount_out)
}

/// Smallest input that yields at least `amount_out`, rounded up
pub fn get_amount_in(amount_out: u64, reserve_in: u64, reserve_out: u64) -> Result<u64> {
    require!(amount_out > 0, ErrorCode::InsufficientAmount);
    require!(
        reserve_in > 0 && reserve_out > amount_out,
        ErrorCode::InsufficientLiquidity
    );

    let numerator = U256::from(reserve_in) * U256::from(amount_out) * U256::from(FEE_DENOMINATOR);
    let denominator = U256::from(reserve_out - amount_out) * U256::from(FEE_NUMERATOR);

    let amount_in = (numerator + denominator - U256::one()) / denominator;
    let amount_in = wide_to_u64(amount_in).ok_or(ErrorCode::MathOverflow)?;
    Ok(amount_in)
}

/// Amount of the other asset that matches `amount_a` at the current pool ratio
pub fn quote(amount_a: u64, reserve_a: u64, reserve_b: u64) -> Result<u64> {
    require!(amount_a > 0, ErrorCode::InsufficientAmount);
    require!(
        reserve_a > 0 && reserve_b > 0,
        ErrorCode::InsufficientLiquidity
    );

    let amount_b = (amount_a as u128 * reserve_b as u128) / reserve_a as u128;
    let amount_b = u64::try_from(amount_b).map_err(|_| ErrorCode::MathOverflow)?;
    Ok(amount_b)
}

/// Price a trade against `reserves` and move them. `reserves` is expected to
/// be a staged copy; the caller commits it once the transfers have settled.
pub(crate) fn apply_swap(
    reserves: &mut Reserves,
    direction: SwapDirection,
    amount_in: u64,
    min_amount_out: u64,
) -> Result<u64> {
    let (reserve_in, reserve_out) = reserves.oriented(direction);
    let amount_out = get_amount_out(amount_in, reserve_in, reserve_out)?;

    // input too small to move the price by a single unit
    require!(amount_out > 0, ErrorCode::InsufficientAmount);
    require_gte!(amount_out, min_amount_out, ErrorCode::SlippageExceeded);

    reserves
        .apply_swap(direction, amount_in, amount_out)
        .ok_or(ErrorCode::MathOverflow)?;

    Ok(amount_out)
}
