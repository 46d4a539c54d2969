//! Addressing individual scenario parameters so they can be updated one at a time.
use crate::source::EnergySource;
use std::fmt;
use strum::EnumDiscriminants;

/// A parameter of a single energy source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDiscriminants)]
#[strum_discriminants(name(SourceFieldKind), derive(Hash))]
pub enum SourceField {
    /// Fraction of the source's generation shape built at the start of the horizon
    InitialFraction,
    /// Build fraction of the ramp point with the given index
    RampBuildFraction(usize),
    /// Year of the ramp point with the given index
    RampAtYear(usize),
    /// Construction time (years)
    BuildTime,
    /// Capital cost ($/W)
    BuildCost,
    /// Fixed operating cost ($/kW/year)
    OperatingCost,
    /// Fuel cost ($/MWh)
    FuelCost,
    /// Fractional cost reduction per doubling of installed capacity
    CostLearningRate,
    /// Lifecycle emissions (g/kWh)
    Co2Intensity,
    /// Plant lifetime (years)
    PlantLifetime,
    /// Maximum capacity factor
    MaxCapacityFactor,
    /// Round-trip efficiency of a storage source
    StorageRoundTripEfficiency,
    /// Hours of discharge at rated power of a storage source
    StorageHours,
}

impl SourceField {
    /// The kind of field, ignoring any ramp index
    pub fn kind(self) -> SourceFieldKind {
        self.into()
    }
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialFraction => write!(f, "initial_fraction"),
            Self::RampBuildFraction(i) => write!(f, "ramp{i}_build_fraction"),
            Self::RampAtYear(i) => write!(f, "ramp{i}_at_year"),
            Self::BuildTime => write!(f, "build_time"),
            Self::BuildCost => write!(f, "build_cost"),
            Self::OperatingCost => write!(f, "operating_cost"),
            Self::FuelCost => write!(f, "fuel_cost"),
            Self::CostLearningRate => write!(f, "cost_learning_rate"),
            Self::Co2Intensity => write!(f, "co2_intensity"),
            Self::PlantLifetime => write!(f, "plant_lifetime"),
            Self::MaxCapacityFactor => write!(f, "max_capacity_factor"),
            Self::StorageRoundTripEfficiency => write!(f, "storage_round_trip_efficiency"),
            Self::StorageHours => write!(f, "storage_hours"),
        }
    }
}

/// A path to a single adjustable value within
/// [`ScenarioParameters`](super::ScenarioParameters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterField {
    /// Discount rate applied to capital and variable costs
    DiscountRate,
    /// Annual demand growth rate
    DemandGrowthRate,
    /// Carbon price ($/t)
    CarbonPrice,
    /// A parameter of one energy source
    Source(EnergySource, SourceField),
}

impl ParameterField {
    /// The kind of source field addressed, if any
    pub fn source_field_kind(self) -> Option<SourceFieldKind> {
        match self {
            Self::Source(_, field) => Some(field.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiscountRate => write!(f, "discount_rate"),
            Self::DemandGrowthRate => write!(f, "demand_growth_rate"),
            Self::CarbonPrice => write!(f, "carbon_price"),
            Self::Source(source, field) => write!(f, "{source}.{field}"),
        }
    }
}

/// A single update to a scenario parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterEvent {
    /// The field to update
    pub field: ParameterField,
    /// The new value
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_display() {
        assert_eq!(ParameterField::CarbonPrice.to_string(), "carbon_price");
        assert_eq!(
            ParameterField::Source(EnergySource::NaturalGas, SourceField::RampAtYear(1)).to_string(),
            "ng.ramp1_at_year"
        );
    }

    #[test]
    fn test_field_kind() {
        let field = ParameterField::Source(EnergySource::Wind, SourceField::RampBuildFraction(1));
        assert_eq!(
            field.source_field_kind(),
            Some(SourceFieldKind::RampBuildFraction)
        );
        assert_eq!(ParameterField::DiscountRate.source_field_kind(), None);
    }
}
