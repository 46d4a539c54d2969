//! Defines [`ScenarioParameters`], the economic and technical assumptions of a scenario.
//!
//! Parameters are never mutated in place: [`ScenarioParameters::apply`] takes a field and a value
//! and returns the updated parameters, which makes every change an auditable event.
use crate::input::{input_err_msg, is_sorted_and_unique, read_toml};
use crate::source::{EnergySource, SourceMap};
use anyhow::{Context, Result, bail, ensure};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod field;
pub use field::{ParameterEvent, ParameterField, SourceField, SourceFieldKind};

const PARAMETERS_FILE_NAME: &str = "parameters.toml";

/// The lowest CO2 intensity (g/kWh). Negative values describe sources which capture carbon.
pub const MIN_CO2_INTENSITY: f64 = -10.0;

/// A point on a source's build-out schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    /// Fraction of the source's generation shape built by `at_year`
    pub build_fraction: f64,
    /// The year by which the build fraction is reached
    pub at_year: u32,
}

/// Parameters only meaningful for storage sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageParameters {
    /// Fraction of stored energy recovered on discharge
    pub round_trip_efficiency: f64,
    /// Hours of discharge at rated power
    pub hours: f64,
}

/// The parameters of a single energy source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceParameters {
    /// Fraction of the generation shape built at the start of the horizon
    pub initial_fraction: f64,
    /// Construction time (years)
    pub build_time: u32,
    /// Capital cost ($/W)
    pub build_cost: f64,
    /// Fixed operating cost ($/kW/year)
    pub operating_cost: f64,
    /// Fuel cost ($/MWh)
    pub fuel_cost: f64,
    /// Fractional cost reduction per doubling of installed capacity
    pub cost_learning_rate: f64,
    /// Installed capacity the learning rate is measured against
    pub cost_learning_base: f64,
    /// Lifecycle emissions (g/kWh)
    pub co2_intensity: f64,
    /// Plant lifetime (years)
    pub plant_lifetime: u32,
    /// Maximum capacity factor
    pub max_capacity_factor: f64,
    /// Position in the load-following order (0 means baseload)
    pub load_follow_priority: u32,
    /// Build-out schedule
    pub ramp: Vec<Ramp>,
    /// Storage behaviour, present only for storage sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageParameters>,
}

/// All parameters of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// Discount rate applied to capital and variable costs
    pub discount_rate: f64,
    /// Annual demand growth rate
    pub demand_growth_rate: f64,
    /// Carbon price ($/t)
    pub carbon_price: f64,
    /// First year of the planning horizon
    pub first_year: u32,
    /// Last year of the planning horizon
    pub last_year: u32,
    /// Per-source parameters
    pub sources: SourceMap<SourceParameters>,
}

/// Shorthand for a ramp with two points
fn ramp2(first: (f64, u32), second: (f64, u32)) -> Vec<Ramp> {
    vec![
        Ramp {
            build_fraction: first.0,
            at_year: first.1,
        },
        Ramp {
            build_fraction: second.0,
            at_year: second.1,
        },
    ]
}

impl SourceParameters {
    /// The built-in parameters for the given source
    pub fn default_for(source: EnergySource) -> Self {
        match source {
            EnergySource::Solar => Self {
                initial_fraction: 0.02,
                ramp: ramp2((0.2, 2030), (0.4, 2040)),
                build_time: 1,
                build_cost: 1.0,
                operating_cost: 10.5,
                fuel_cost: 0.0,
                cost_learning_rate: 0.15,
                cost_learning_base: 0.08,
                co2_intensity: 8.0,
                plant_lifetime: 30,
                max_capacity_factor: 0.98,
                load_follow_priority: 0,
                storage: None,
            },
            EnergySource::Wind => Self {
                initial_fraction: 0.04,
                ramp: ramp2((0.2, 2030), (0.5, 2040)),
                build_time: 1,
                build_cost: 1.3,
                operating_cost: 32.0,
                fuel_cost: 0.0,
                cost_learning_rate: 0.15,
                cost_learning_base: 0.05,
                co2_intensity: 5.0,
                plant_lifetime: 20,
                max_capacity_factor: 0.95,
                load_follow_priority: 0,
                storage: None,
            },
            EnergySource::Hydro => Self {
                initial_fraction: 0.08,
                ramp: ramp2((0.08, 2030), (0.08, 2040)),
                build_time: 4,
                build_cost: 2.95,
                operating_cost: 40.85,
                fuel_cost: 1.36,
                cost_learning_rate: 0.0,
                cost_learning_base: 0.0,
                co2_intensity: 31.0,
                plant_lifetime: 50,
                max_capacity_factor: 0.98,
                load_follow_priority: 0,
                storage: None,
            },
            EnergySource::Nuclear => Self {
                initial_fraction: 0.3,
                ramp: ramp2((0.3, 2030), (0.3, 2040)),
                build_time: 6,
                build_cost: 9.55,
                operating_cost: 120.0,
                fuel_cost: 12.0,
                cost_learning_rate: 0.1,
                cost_learning_base: 0.3,
                co2_intensity: 13.0,
                plant_lifetime: 40,
                max_capacity_factor: 0.91,
                load_follow_priority: 0,
                storage: None,
            },
            EnergySource::NaturalGas => Self {
                initial_fraction: 1.4,
                ramp: ramp2((1.85, 2030), (2.45, 2040)),
                build_time: 1,
                build_cost: 0.825,
                operating_cost: 13.125,
                fuel_cost: 36.2,
                cost_learning_rate: 0.05,
                cost_learning_base: 1.4,
                co2_intensity: 447.0,
                plant_lifetime: 20,
                max_capacity_factor: 0.95,
                load_follow_priority: 2,
                storage: None,
            },
            EnergySource::Coal => Self {
                initial_fraction: 0.02,
                ramp: ramp2((0.0, 2025), (0.0, 2040)),
                build_time: 5,
                build_cost: 4.625,
                operating_cost: 61.1,
                fuel_cost: 18.9,
                cost_learning_rate: 0.05,
                cost_learning_base: 1.0,
                co2_intensity: 927.0,
                plant_lifetime: 40,
                max_capacity_factor: 0.95,
                load_follow_priority: 3,
                storage: None,
            },
            EnergySource::Battery => Self {
                initial_fraction: 0.0,
                ramp: ramp2((0.0, 2030), (0.0, 2040)),
                build_time: 1,
                build_cost: 1.26,
                operating_cost: 26.8,
                fuel_cost: 0.0,
                cost_learning_rate: 0.15,
                cost_learning_base: 0.0,
                co2_intensity: 0.0,
                plant_lifetime: 20,
                max_capacity_factor: 0.98,
                load_follow_priority: 1,
                storage: Some(StorageParameters {
                    round_trip_efficiency: 0.8,
                    hours: 4.0,
                }),
            },
            EnergySource::Hydrogen => Self {
                initial_fraction: 0.0,
                ramp: ramp2((0.0, 2030), (0.0, 2040)),
                build_time: 2,
                build_cost: 2.08,
                operating_cost: 20.0,
                fuel_cost: 5.5,
                cost_learning_rate: 0.15,
                cost_learning_base: 0.0,
                co2_intensity: 4.0,
                plant_lifetime: 20,
                max_capacity_factor: 0.95,
                load_follow_priority: 1,
                storage: Some(StorageParameters {
                    round_trip_efficiency: 0.32,
                    hours: 720.0,
                }),
            },
        }
    }

    /// Read the value of a field
    pub fn get(&self, field: SourceField) -> Result<f64> {
        let value = match field {
            SourceField::InitialFraction => self.initial_fraction,
            SourceField::RampBuildFraction(i) => self.ramp_point(i)?.build_fraction,
            SourceField::RampAtYear(i) => self.ramp_point(i)?.at_year as f64,
            SourceField::BuildTime => self.build_time as f64,
            SourceField::BuildCost => self.build_cost,
            SourceField::OperatingCost => self.operating_cost,
            SourceField::FuelCost => self.fuel_cost,
            SourceField::CostLearningRate => self.cost_learning_rate,
            SourceField::Co2Intensity => self.co2_intensity,
            SourceField::PlantLifetime => self.plant_lifetime as f64,
            SourceField::MaxCapacityFactor => self.max_capacity_factor,
            SourceField::StorageRoundTripEfficiency => self.storage()?.round_trip_efficiency,
            SourceField::StorageHours => self.storage()?.hours,
        };

        Ok(value)
    }

    /// Overwrite the value of a field. Values for integer fields are rounded.
    fn set(&mut self, field: SourceField, value: f64) -> Result<()> {
        match field {
            SourceField::InitialFraction => self.initial_fraction = value,
            SourceField::RampBuildFraction(i) => self.ramp_point_mut(i)?.build_fraction = value,
            SourceField::RampAtYear(i) => self.ramp_point_mut(i)?.at_year = whole_number(value)?,
            SourceField::BuildTime => self.build_time = whole_number(value)?,
            SourceField::BuildCost => self.build_cost = value,
            SourceField::OperatingCost => self.operating_cost = value,
            SourceField::FuelCost => self.fuel_cost = value,
            SourceField::CostLearningRate => self.cost_learning_rate = value,
            SourceField::Co2Intensity => self.co2_intensity = value,
            SourceField::PlantLifetime => self.plant_lifetime = whole_number(value)?,
            SourceField::MaxCapacityFactor => self.max_capacity_factor = value,
            SourceField::StorageRoundTripEfficiency => {
                self.storage_mut()?.round_trip_efficiency = value;
            }
            SourceField::StorageHours => self.storage_mut()?.hours = value,
        }

        Ok(())
    }

    fn ramp_point(&self, index: usize) -> Result<&Ramp> {
        self.ramp
            .get(index)
            .with_context(|| format!("No ramp point with index {index}"))
    }

    fn ramp_point_mut(&mut self, index: usize) -> Result<&mut Ramp> {
        self.ramp
            .get_mut(index)
            .with_context(|| format!("No ramp point with index {index}"))
    }

    fn storage(&self) -> Result<&StorageParameters> {
        self.storage
            .as_ref()
            .context("Storage parameters are only defined for storage sources")
    }

    fn storage_mut(&mut self) -> Result<&mut StorageParameters> {
        self.storage
            .as_mut()
            .context("Storage parameters are only defined for storage sources")
    }

    /// Whether the ramp years are in strictly increasing order
    pub fn ramp_is_ordered(&self) -> bool {
        let years: Vec<u32> = self.ramp.iter().map(|ramp| ramp.at_year).collect();
        is_sorted_and_unique(&years)
    }

    /// Check that the parameters of the given source are valid
    fn validate(&self, source: EnergySource) -> Result<()> {
        ensure!(!self.ramp.is_empty(), "Ramp cannot be empty");
        ensure!(
            self.ramp_is_ordered(),
            "Ramp years must be strictly increasing"
        );
        for ramp in &self.ramp {
            check_non_negative("ramp build_fraction", ramp.build_fraction)?;
        }

        check_non_negative("initial_fraction", self.initial_fraction)?;
        check_non_negative("build_cost", self.build_cost)?;
        check_non_negative("operating_cost", self.operating_cost)?;
        check_non_negative("fuel_cost", self.fuel_cost)?;
        check_non_negative("cost_learning_base", self.cost_learning_base)?;
        ensure!(
            self.co2_intensity.is_finite() && self.co2_intensity >= MIN_CO2_INTENSITY,
            "co2_intensity must be a finite number greater than or equal to {MIN_CO2_INTENSITY}"
        );
        ensure!(
            self.cost_learning_rate.is_finite() && self.cost_learning_rate < 1.0,
            "cost_learning_rate must be a finite number less than one"
        );
        ensure!(self.plant_lifetime > 0, "plant_lifetime cannot be zero");
        ensure!(
            self.max_capacity_factor > 0.0 && self.max_capacity_factor <= 1.0,
            "max_capacity_factor must be greater than zero and at most one"
        );

        match (&self.storage, source.is_storage()) {
            (Some(storage), true) => {
                ensure!(
                    storage.round_trip_efficiency > 0.0 && storage.round_trip_efficiency < 1.0,
                    "storage round_trip_efficiency must be between zero and one"
                );
                ensure!(
                    storage.hours.is_finite() && storage.hours > 0.0,
                    "storage hours must be a finite number greater than zero"
                );
            }
            (None, true) => bail!("Storage parameters are required for storage sources"),
            (Some(_), false) => bail!("Storage parameters given for a non-storage source"),
            (None, false) => {}
        }

        Ok(())
    }
}

/// Check that a value is finite and not negative
fn check_non_negative(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Round a value to a non-negative integer
fn whole_number(value: f64) -> Result<u32> {
    let rounded = value.round();
    ensure!(
        (0.0..=f64::from(u32::MAX)).contains(&rounded),
        "{value} cannot be represented as a whole number of years"
    );

    Ok(rounded as u32)
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            discount_rate: 0.06,
            demand_growth_rate: 0.03,
            carbon_price: 0.0,
            first_year: 2020,
            last_year: 2040,
            sources: SourceMap::from_fn(SourceParameters::default_for),
        }
    }
}

impl ScenarioParameters {
    /// Read parameters from the model directory.
    ///
    /// If the model has no parameters file, the built-in defaults are used.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ScenarioParameters> {
        let file_path = model_dir.as_ref().join(PARAMETERS_FILE_NAME);
        if !file_path.is_file() {
            return Ok(ScenarioParameters::default());
        }

        let parameters: ScenarioParameters = read_toml(&file_path)?;
        parameters
            .validate()
            .with_context(|| input_err_msg(&file_path))?;

        Ok(parameters)
    }

    /// Check that the parameters are valid
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.discount_rate.is_finite() && self.discount_rate > -1.0,
            "discount_rate must be a finite number greater than -1"
        );
        ensure!(
            self.demand_growth_rate.is_finite(),
            "demand_growth_rate must be a finite number"
        );
        check_non_negative("carbon_price", self.carbon_price)?;
        ensure!(
            self.first_year < self.last_year,
            "first_year must be before last_year"
        );

        for (source, parameters) in self.sources.iter() {
            parameters
                .validate(source)
                .with_context(|| format!("Invalid parameters for energy source {source}"))?;
        }

        Ok(())
    }

    /// Read the value of a field
    pub fn get(&self, field: ParameterField) -> Result<f64> {
        match field {
            ParameterField::DiscountRate => Ok(self.discount_rate),
            ParameterField::DemandGrowthRate => Ok(self.demand_growth_rate),
            ParameterField::CarbonPrice => Ok(self.carbon_price),
            ParameterField::Source(source, field) => self.sources[source]
                .get(field)
                .with_context(|| format!("Cannot read {source}.{field}")),
        }
    }

    /// Return a copy of these parameters with a single field updated
    pub fn apply(&self, field: ParameterField, value: f64) -> Result<ScenarioParameters> {
        ensure!(value.is_finite(), "Value for {field} must be finite");

        let mut next = self.clone();
        match field {
            ParameterField::DiscountRate => next.discount_rate = value,
            ParameterField::DemandGrowthRate => next.demand_growth_rate = value,
            ParameterField::CarbonPrice => next.carbon_price = value,
            ParameterField::Source(source, source_field) => next.sources[source]
                .set(source_field, value)
                .with_context(|| format!("Cannot set {field}"))?,
        }
        debug!("Set {field} to {value}");

        Ok(next)
    }

    /// Apply a sequence of events in order
    pub fn replay<'a, I>(&self, events: I) -> Result<ScenarioParameters>
    where
        I: IntoIterator<Item = &'a ParameterEvent>,
    {
        events
            .into_iter()
            .try_fold(self.clone(), |parameters, event| {
                parameters.apply(event.field, event.value)
            })
    }
}
