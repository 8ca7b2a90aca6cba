use std::rc::Rc;

use anchor_lang::prelude::Pubkey;
use dex_pool::{get_amount_out, AssetLedger, InMemoryLedger, Pool};

fn main() -> anchor_lang::Result<()> {
    // Example usage of the pool with in-memory asset ledgers

    let pool_address = Pubkey::new_unique();
    let provider = Pubkey::new_unique();
    let trader = Pubkey::new_unique();

    let token_a = Rc::new(InMemoryLedger::new(Pubkey::new_unique()));
    let token_b = Rc::new(InMemoryLedger::new(Pubkey::new_unique()));
    for (ledger, user) in [(&token_a, provider), (&token_b, provider), (&token_a, trader)] {
        ledger.mint_to(&user, 10_000_000);
        ledger.approve(&user, &pool_address, u64::MAX);
    }

    let pool = Pool::new(pool_address, token_a.clone(), token_b.clone())?;

    // Example 1: Seed the pool
    let shares = pool.add_liquidity(&provider, 1_000_000, 2_000_000, 0)?;
    println!("Deposit: {} LP tokens minted for 1000000 token A and 2000000 token B", shares);

    // Example 2: Quote and execute a swap
    let (reserve_a, reserve_b) = pool.get_reserves();
    let expected = get_amount_out(100_000, reserve_a, reserve_b)?;
    let received = pool.swap_a_for_b(&trader, 100_000, expected)?;
    println!("Swap: 100000 token A -> {} token B (quoted {})", received, expected);

    // Example 3: Withdraw liquidity
    let (amount_a, amount_b) = pool.remove_liquidity(&provider, shares, 0, 0)?;
    println!("Withdraw: {} LP tokens -> {} token A and {} token B", shares, amount_a, amount_b);

    let (reserve_a, reserve_b) = pool.get_reserves();
    println!("Reserves left behind the locked minimum: {} / {}", reserve_a, reserve_b);
    Ok(())
}
