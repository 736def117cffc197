use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent};

/// Fixed-rate annuity payment for a fully amortizing loan.
///
/// Returns zero for a non-positive principal or a zero-month term. A zero
/// interest rate degrades to straight-line repayment.
pub fn monthly_payment(principal: Money, annual_rate_percent: Percent, term_years: u32) -> Money {
    if principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let total_months = term_years * 12;
    if total_months == 0 {
        return Decimal::ZERO;
    }

    let monthly_rate = annual_rate_percent / dec!(100) / dec!(12);
    if monthly_rate.is_zero() {
        return principal / Decimal::from(total_months);
    }

    let factor = compound_factor(monthly_rate, total_months);
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    principal * (monthly_rate * factor) / denominator
}

/// Outstanding balance after `payments_made` monthly payments, using the
/// closed form R = P * ((1+r)^n - (1+r)^p) / ((1+r)^n - 1).
pub fn remaining_balance(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
    payments_made: u32,
) -> Money {
    if principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let total_months = term_years * 12;
    if payments_made >= total_months {
        return Decimal::ZERO;
    }

    let monthly_rate = annual_rate_percent / dec!(100) / dec!(12);
    if monthly_rate.is_zero() {
        let payment = monthly_payment(principal, annual_rate_percent, term_years);
        let balance = principal - payment * Decimal::from(payments_made);
        return balance.max(Decimal::ZERO);
    }

    let factor_total = compound_factor(monthly_rate, total_months);
    let factor_paid = compound_factor(monthly_rate, payments_made);
    let denominator = factor_total - Decimal::ONE;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    principal * ((factor_total - factor_paid) / denominator)
}

// (1 + r)^n via iterative multiplication (avoids Decimal::powd drift)
pub(crate) fn compound_factor(rate: Decimal, periods: u32) -> Decimal {
    let one_plus = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor *= one_plus;
    }
    factor
}
