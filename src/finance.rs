//! General functions related to finance.
use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy, MoneyPerPower};

/// The number of representative weeks in a year
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// The horizon (years) over which variable spending is discounted
pub const AMORTISATION_YEARS: u32 = 30;

/// Calculates the capital recovery factor (CRF) for a given lifetime and discount rate.
///
/// The CRF is used to annualise capital costs over the lifetime of an asset.
pub fn capital_recovery_factor(lifetime: u32, discount_rate: Dimensionless) -> Dimensionless {
    if lifetime == 0 {
        return Dimensionless(0.0);
    }
    if discount_rate == Dimensionless(0.0) {
        return Dimensionless(1.0) / Dimensionless(lifetime as f64);
    }
    let factor = (Dimensionless(1.0) + discount_rate).powi(lifetime as i32);
    (discount_rate * factor) / (factor - Dimensionless(1.0))
}

/// Calculates the annual capital cost per unit of capacity
pub fn annual_capital_cost(
    capital_cost: MoneyPerPower,
    lifetime: u32,
    discount_rate: Dimensionless,
) -> MoneyPerPower {
    let crf = capital_recovery_factor(lifetime, discount_rate);
    capital_cost * crf
}

/// The weight given to one representative week of variable spending.
///
/// This is the number of weeks in a year, divided by the average annual discount factor over
/// `horizon` years, so it equals [`WEEKS_PER_YEAR`] when the discount rate is zero.
pub fn weekly_discount_factor(discount_rate: Dimensionless, horizon: u32) -> Dimensionless {
    if horizon == 0 {
        return Dimensionless(WEEKS_PER_YEAR);
    }

    let crf = capital_recovery_factor(horizon, discount_rate);
    Dimensionless(WEEKS_PER_YEAR) / (crf * Dimensionless(horizon as f64))
}

/// Levelised cost of supplying `energy`, or `None` if no energy was supplied
pub fn levelised_cost(cost: Money, energy: Energy) -> Option<MoneyPerEnergy> {
    (energy > Energy(0.0)).then(|| cost / energy)
}
