//! Rolling allocated profiles up into cost and emissions outcomes.
use crate::dataset::{ProfileDataset, ProfileSeries};
use crate::dispatch::attribute_excess;
use crate::finance::{
    AMORTISATION_YEARS, WEEKS_PER_YEAR, annual_capital_cost, levelised_cost,
    weekly_discount_factor,
};
use crate::parameters::ScenarioParameters;
use crate::source::{EnergySource, SourceMap};
use crate::units::{
    Dimensionless, Energy, Mass, MassPerEnergy, Money, MoneyPerEnergy, MoneyPerMass, MoneyPerPower,
    Power,
};
use serde::Serialize;
use strum::IntoEnumIterator;

/// Watts per megawatt
const W_PER_MW: f64 = 1e6;

/// Kilowatts per megawatt
const KW_PER_MW: f64 = 1e3;

/// Grams per kWh in one tonne per MWh
const G_PER_KWH_PER_T_PER_MWH: f64 = 1e3;

/// Cost and emission rates of a single source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRates {
    /// Annualised capital and fixed operating cost per MW of capacity
    pub fixed_cost: MoneyPerPower,
    /// Fuel and carbon cost per MWh generated
    pub variable_cost: MoneyPerEnergy,
    /// Emissions per MWh generated
    pub co2: MassPerEnergy,
}

/// The rates used to price allocated profiles
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    /// Rates for each source
    pub sources: SourceMap<SourceRates>,
    /// Weight given to one representative week of variable spending
    pub weekly_discount_factor: Dimensionless,
}

impl RateTable {
    /// Derive the rates implied by a set of scenario parameters
    pub fn new(parameters: &ScenarioParameters) -> Self {
        let discount_rate = Dimensionless(parameters.discount_rate);
        let carbon_price = MoneyPerMass(parameters.carbon_price);
        let sources = parameters.sources.map(|_, source| {
            let capital_cost = MoneyPerPower(source.build_cost * W_PER_MW);
            let operating_cost = MoneyPerPower(source.operating_cost * KW_PER_MW);
            let co2 = MassPerEnergy(source.co2_intensity / G_PER_KWH_PER_T_PER_MWH);

            SourceRates {
                fixed_cost: annual_capital_cost(capital_cost, source.plant_lifetime, discount_rate)
                    + operating_cost,
                variable_cost: MoneyPerEnergy(source.fuel_cost) + carbon_price * co2,
                co2,
            }
        });

        Self {
            sources,
            weekly_discount_factor: weekly_discount_factor(discount_rate, AMORTISATION_YEARS),
        }
    }
}

/// The outcome for a single source
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SourceOutcome {
    /// Peak generation, taken as the capacity which must be built
    pub capacity: Power,
    /// Energy generated over the period
    pub energy: Energy,
    /// Energy which went towards meeting demand over the period
    pub consumed: Energy,
    /// Annualised fixed cost of the capacity
    pub fixed_cost: Money,
    /// Discounted variable cost
    pub variable_cost: Money,
    /// Annual emissions
    pub co2: Mass,
}

impl SourceOutcome {
    /// Total cost of the source
    pub fn cost(&self) -> Money {
        self.fixed_cost + self.variable_cost
    }

    /// Cost per MWh consumed over a year, or `None` if nothing was consumed
    pub fn cost_per_energy(&self) -> Option<MoneyPerEnergy> {
        levelised_cost(self.cost(), self.consumed * Dimensionless(WEEKS_PER_YEAR))
    }
}

/// The outcome of a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    /// Outcome for each source
    pub breakdown: SourceMap<SourceOutcome>,
    /// Total cost
    pub cost: Money,
    /// Total annual emissions
    pub co2: Mass,
    /// Annual energy consumed
    pub energy: Energy,
    /// Annual energy generated, including excess
    pub generated: Energy,
    /// Annual unmet demand
    pub unmet_energy: Energy,
    /// Number of hours in which some demand was unmet
    pub unmet_hours: usize,
    /// Weight given to one representative week of variable spending
    pub weekly_discount_factor: Dimensionless,
}

impl ScenarioOutcome {
    /// Cost per discounted MWh consumed, or `None` if nothing was consumed
    pub fn levelised_cost(&self) -> Option<MoneyPerEnergy> {
        let consumed: Energy = self.breakdown.values().map(|outcome| outcome.consumed).sum();
        levelised_cost(self.cost, consumed * self.weekly_discount_factor)
    }

    /// Emissions per unit of energy consumed (g/kWh), or `None` if nothing was consumed
    pub fn co2_intensity(&self) -> Option<f64> {
        (self.energy > Energy(0.0))
            .then(|| (self.co2 / self.energy).value() * G_PER_KWH_PER_T_PER_MWH)
    }
}

/// The energy each source contributed to meeting demand.
///
/// Excess non-dispatchable generation is attributed to sources in proportion to their output in
/// each hour. All dispatched energy is counted as useful.
pub fn supplied_energy_breakdown(profiles: &ProfileDataset) -> SourceMap<Energy> {
    let demand = profiles.series(ProfileSeries::Demand);
    let mut supplied = SourceMap::<Energy>::default();
    for (hour, demand) in demand.iter().enumerate() {
        let generated = SourceMap::from_fn(|source| profiles.source(source)[hour]);
        let excess = attribute_excess(*demand, &generated);
        for source in EnergySource::iter() {
            supplied[source] += Energy(generated[source] - excess[source]);
        }
    }

    supplied
}

/// Summarise the cost and emissions of allocated profiles.
///
/// # Arguments
///
/// * `profiles` - Profiles as returned by [`allocate`](crate::dispatch::allocate)
/// * `rates` - The rates to price generation at
pub fn summarize(profiles: &ProfileDataset, rates: &RateTable) -> ScenarioOutcome {
    let weeks_per_year = Dimensionless(WEEKS_PER_YEAR);
    let supplied = supplied_energy_breakdown(profiles);
    let breakdown = SourceMap::from_fn(|source| {
        let series = profiles.source(source);
        let capacity = Power(series.iter().copied().fold(0.0, f64::max));
        let energy = Energy(series.iter().sum());
        let source_rates = &rates.sources[source];

        SourceOutcome {
            capacity,
            energy,
            consumed: supplied[source],
            fixed_cost: source_rates.fixed_cost * capacity,
            variable_cost: source_rates.variable_cost * energy * rates.weekly_discount_factor,
            co2: source_rates.co2 * energy * weeks_per_year,
        }
    });

    let unmet = profiles.series(ProfileSeries::Unmet);
    let consumed: Energy = breakdown.values().map(|outcome| outcome.consumed).sum();
    let generated: Energy = breakdown.values().map(|outcome| outcome.energy).sum();
    ScenarioOutcome {
        cost: breakdown.values().map(SourceOutcome::cost).sum(),
        co2: breakdown.values().map(|outcome| outcome.co2).sum(),
        energy: consumed * weeks_per_year,
        generated: generated * weeks_per_year,
        unmet_energy: Energy(unmet.iter().sum()) * weeks_per_year,
        unmet_hours: unmet.iter().filter(|value| **value > 0.0).count(),
        weekly_discount_factor: rates.weekly_discount_factor,
        breakdown,
    }
}
