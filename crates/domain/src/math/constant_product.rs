use super::MathError;
use ethers_core::types::U256;

/// Basis-point denominator of pool fees.
pub const FEE_DENOMINATOR: u32 = 10_000;

/// Fee charged by SushiSwap / Uniswap V2 pairs, in basis points.
pub const V2_FEE_BPS: u32 = 30;

/// Calculates the output amount for a given input amount in a constant product pool (x * y = k).
///
/// formula: dy = y * dx / (x + dx)
/// taking fee into account: dy = y * (dx * (1 - fee)) / (x + (dx * (1 - fee)))
///
/// Mirrors the router's `getAmountOut` for a 30 bps fee. Live quotes must
/// still come from the router so that deposits match on-chain math exactly.
pub fn get_amount_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> Result<U256, MathError> {
    if amount_in.is_zero() {
        return Ok(U256::zero());
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(MathError::EmptyReserves);
    }

    let amount_in_with_fee = amount_in
        .checked_mul(U256::from(FEE_DENOMINATOR - fee_bps.min(FEE_DENOMINATOR)))
        .ok_or(MathError::Overflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or(MathError::Overflow)?;
    let denominator = reserve_in
        .checked_mul(U256::from(FEE_DENOMINATOR))
        .ok_or(MathError::Overflow)?
        .checked_add(amount_in_with_fee)
        .ok_or(MathError::Overflow)?;

    Ok(numerator / denominator)
}
