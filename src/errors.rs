use anchor_lang::prelude::error_code;

#[error_code]
pub enum ErrorCode {
    #[msg("Invalid token")]
    InvalidToken,
    #[msg("Insufficient amount")]
    InsufficientAmount,
    #[msg("Insufficient liquidity")]
    InsufficientLiquidity,
    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[msg("Token transfer failed")]
    TransferFailed,
    #[msg("Pool is locked")]
    Locked,
    #[msg("Caller cannot be the null identity or the pool")]
    InvalidCaller,
    #[msg("Share balance too low")]
    InsufficientShares,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Constant product invariant violated")]
    InvariantViolation,
    #[msg("Transfer could not be reversed, settled amounts were booked")]
    SettlementFailed,
}
