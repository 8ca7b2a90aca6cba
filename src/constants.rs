use anchor_lang::prelude::Pubkey;

/// Shares locked forever on the first deposit
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Swap fee numerator, 997 / 1000 = 0.3% fee kept by the pool
pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1_000;

/// Holder of the locked minimum liquidity. It is the null identity, so no
/// caller can ever act as it.
pub const LIQUIDITY_SINK: Pubkey = Pubkey::new_from_array([0; 32]);
