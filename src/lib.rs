/// DEX Pool Library
///
/// A two-asset constant-product liquidity pool: share accounting for
/// deposits and withdrawals, fee-bearing swaps, and a guarded pool aggregate
/// that settles every call all-or-nothing.
pub mod constants;
pub mod errors;
pub mod events;
pub mod guard;
pub mod ledger;
pub mod liquidity;
pub mod pool;
pub mod state;
pub mod swap;
pub mod utils;

// Re-export functions for convenience
pub use constants::{FEE_DENOMINATOR, FEE_NUMERATOR, LIQUIDITY_SINK, MINIMUM_LIQUIDITY};
pub use errors::ErrorCode;
pub use ledger::{AssetLedger, InMemoryLedger};
pub use liquidity::{deposit_lp, withdraw_lp};
pub use pool::Pool;
pub use state::{PoolSnapshot, SwapDirection};
pub use swap::{get_amount_in, get_amount_out, quote};
