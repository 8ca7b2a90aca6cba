use anchor_lang::prelude::*;

#[event]
pub struct LiquidityAdded {
    pub provider: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    pub shares_minted: u64,
}

#[event]
pub struct LiquidityRemoved {
    pub provider: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    pub shares_burned: u64,
}

#[event]
pub struct Swapped {
    pub trader: Pubkey,
    pub input_asset: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
}

/// Reserves after a committed operation
#[event]
pub struct ReservesSynced {
    pub reserve_a: u64,
    pub reserve_b: u64,
}
