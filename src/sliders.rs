//! The catalogue of adjustable parameters and the tick positions of their sliders.
//!
//! The order of [`catalogue`] is part of the state string format: changing it requires a new
//! [`FORMAT_VERSION`](crate::codec::FORMAT_VERSION).
use crate::codec::{TickLayout, VectorKind};
use crate::parameters::{
    MIN_CO2_INTENSITY, ParameterEvent, ParameterField, ScenarioParameters, SourceField,
    SourceFieldKind,
};
use crate::source::EnergySource;
use crate::tick::TickScale;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use strum::IntoEnumIterator;

/// The number of ramp points with sliders for each source
pub const RAMP_POINTS: usize = 2;

const RATE: TickScale = TickScale::Linear {
    slope: 1.0 / 200.0,
    offset: -0.1,
};
const CARBON_PRICE: TickScale = TickScale::Linear {
    slope: 2.0,
    offset: 0.0,
};
const INITIAL_FRACTION: TickScale = TickScale::Linear {
    slope: 1.0 / 50.0,
    offset: 0.0,
};
const BUILD_FRACTION: TickScale = TickScale::Linear {
    slope: 1.0 / 20.0,
    offset: 0.0,
};
const YEAR: TickScale = TickScale::Linear {
    slope: 1.0,
    offset: 2021.0,
};
const YEARS: TickScale = TickScale::Linear {
    slope: 1.0,
    offset: 1.0,
};
const BUILD_COST: TickScale = TickScale::Linear {
    slope: 1.0 / 10.0,
    offset: 0.0,
};
const OPERATING_COST: TickScale = TickScale::Linear {
    slope: 2.0,
    offset: 0.0,
};
const FUEL_COST: TickScale = TickScale::Linear {
    slope: 0.5,
    offset: 0.0,
};
const LEARNING_RATE: TickScale = TickScale::Linear {
    slope: 1.0 / 100.0,
    offset: -0.25,
};
const PERCENT: TickScale = TickScale::Linear {
    slope: 1.0 / 100.0,
    offset: 0.0,
};
const CO2_INTENSITY: TickScale = TickScale::PiecewiseLog {
    threshold: 20,
    slope: 1.0,
    offset: MIN_CO2_INTENSITY,
    decades_per_tick: 2.0 / 183.0,
};
const STORAGE_HOURS: TickScale = TickScale::PiecewiseLog {
    threshold: 9,
    slope: 1.0,
    offset: 1.0,
    decades_per_tick: 2.0 / 41.0,
};

/// Which part of a state string a slider belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderGroup {
    /// Economic and technical assumptions
    Assumption,
    /// The build-out plan of a source
    Plan,
}

/// A slider controlling a single parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    /// The parameter the slider controls
    pub field: ParameterField,
    /// The group the slider belongs to
    pub group: SliderGroup,
    /// The largest tick
    pub max_tick: u8,
    /// Mapping from ticks to parameter values
    pub scale: TickScale,
}

impl Slider {
    fn new(field: ParameterField, group: SliderGroup, max_tick: u8, scale: TickScale) -> Self {
        Self {
            field,
            group,
            max_tick,
            scale,
        }
    }

    /// A unique identifier for the slider
    pub fn id(&self) -> String {
        self.field.to_string()
    }

    /// The parameter value at the given tick
    pub fn value(&self, tick: u8) -> f64 {
        self.scale.to_value(tick)
    }

    /// The tick closest to the given parameter value
    pub fn nearest_tick(&self, value: f64) -> u8 {
        self.scale.nearest_tick(value, self.max_tick)
    }
}

/// Every slider, in state string order
pub fn catalogue() -> Vec<Slider> {
    use SliderGroup::{Assumption, Plan};

    let mut sliders = vec![
        Slider::new(ParameterField::DiscountRate, Assumption, 40, RATE),
        Slider::new(ParameterField::DemandGrowthRate, Assumption, 40, RATE),
        Slider::new(ParameterField::CarbonPrice, Assumption, 100, CARBON_PRICE),
    ];

    for source in EnergySource::iter() {
        let mut add = |field, group, max_tick, scale| {
            sliders.push(Slider::new(
                ParameterField::Source(source, field),
                group,
                max_tick,
                scale,
            ));
        };

        add(SourceField::InitialFraction, Assumption, 100, INITIAL_FRACTION);
        for i in 0..RAMP_POINTS {
            add(SourceField::RampBuildFraction(i), Plan, 100, BUILD_FRACTION);
            add(SourceField::RampAtYear(i), Plan, 19, YEAR);
        }
        add(SourceField::BuildTime, Assumption, 11, YEARS);
        add(SourceField::BuildCost, Assumption, 100, BUILD_COST);
        add(SourceField::OperatingCost, Assumption, 100, OPERATING_COST);
        add(SourceField::FuelCost, Assumption, 100, FUEL_COST);
        add(SourceField::CostLearningRate, Assumption, 50, LEARNING_RATE);
        add(SourceField::Co2Intensity, Assumption, 200, CO2_INTENSITY);
        add(SourceField::PlantLifetime, Assumption, 49, YEARS);
        add(SourceField::MaxCapacityFactor, Assumption, 100, PERCENT);
        if source.is_storage() {
            add(SourceField::StorageRoundTripEfficiency, Assumption, 100, PERCENT);
            add(SourceField::StorageHours, Assumption, 50, STORAGE_HOURS);
        }
    }

    sliders
}

/// The tick position of every slider in the catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct SliderBoard {
    sliders: Vec<Slider>,
    plan_slots: Vec<usize>,
    defaults: Vec<u8>,
    ticks: Vec<u8>,
}

impl SliderBoard {
    /// Create a board with sliders positioned as close as possible to the given parameters
    pub fn new(parameters: &ScenarioParameters) -> Result<Self> {
        let sliders = catalogue();
        let defaults: Vec<u8> = sliders
            .iter()
            .map(|slider| -> Result<u8> {
                let value = parameters
                    .get(slider.field)
                    .with_context(|| format!("No parameter for slider {}", slider.id()))?;
                Ok(slider.nearest_tick(value))
            })
            .try_collect()?;
        let plan_slots = sliders
            .iter()
            .positions(|slider| slider.group == SliderGroup::Plan)
            .collect();

        Ok(Self {
            sliders,
            plan_slots,
            ticks: defaults.clone(),
            defaults,
        })
    }

    /// The sliders on the board
    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    /// The current tick of every slider
    pub fn ticks(&self) -> &[u8] {
        &self.ticks
    }

    /// The default tick of every slider
    pub fn default_ticks(&self) -> &[u8] {
        &self.defaults
    }

    /// The current ticks of the plan sliders only
    pub fn plan_ticks(&self) -> Vec<u8> {
        self.plan_slots.iter().map(|slot| self.ticks[*slot]).collect()
    }

    /// The current ticks making up a vector of the given kind
    pub fn ticks_for(&self, kind: VectorKind) -> Vec<u8> {
        match kind {
            VectorKind::Plan => self.plan_ticks(),
            VectorKind::Full => self.ticks.clone(),
        }
    }

    /// Index into the catalogue of the given position in a vector of the given kind
    fn slot(&self, kind: VectorKind, index: usize) -> usize {
        match kind {
            VectorKind::Plan => self.plan_slots[index],
            VectorKind::Full => index,
        }
    }

    /// Move a single slider.
    ///
    /// # Returns
    ///
    /// The parameter update implied by the new position.
    pub fn set_tick(&mut self, index: usize, tick: u8) -> Result<ParameterEvent> {
        let slider = self
            .sliders
            .get(index)
            .with_context(|| format!("No slider with index {index}"))?;
        ensure!(
            tick <= slider.max_tick,
            "Tick {tick} is out of range for slider {} (maximum {})",
            slider.id(),
            slider.max_tick
        );

        self.ticks[index] = tick;
        Ok(ParameterEvent {
            field: slider.field,
            value: slider.value(tick),
        })
    }

    /// Move every slider back to its default position
    pub fn reset(&mut self) {
        self.ticks.clone_from(&self.defaults);
    }

    /// Whether any slider outside the plan group has moved from its default position
    pub fn any_assumption_changed(&self) -> bool {
        self.sliders
            .iter()
            .zip(self.ticks.iter().zip(&self.defaults))
            .any(|(slider, (tick, default))| {
                slider.group == SliderGroup::Assumption && tick != default
            })
    }

    /// The parameter updates implied by the current slider positions
    pub fn events(&self) -> impl Iterator<Item = ParameterEvent> + '_ {
        self.sliders
            .iter()
            .zip(&self.ticks)
            .map(|(slider, tick)| ParameterEvent {
                field: slider.field,
                value: slider.value(*tick),
            })
    }

    /// Apply the current slider positions to a set of parameters
    pub fn apply(&self, base: &ScenarioParameters) -> Result<ScenarioParameters> {
        let events = self.events().collect_vec();
        base.replay(&events)
    }

    /// Overwrite the ticks of the sliders making up a vector of the given kind.
    ///
    /// No sliders are moved unless every tick is in range.
    pub fn load(&mut self, kind: VectorKind, ticks: &[u8]) -> Result<()> {
        ensure!(
            ticks.len() == self.len(kind),
            "Expected {} ticks, but got {}",
            self.len(kind),
            ticks.len()
        );
        for (index, tick) in ticks.iter().enumerate() {
            let slider = &self.sliders[self.slot(kind, index)];
            ensure!(
                *tick <= slider.max_tick,
                "Tick {tick} is out of range for slider {} (maximum {})",
                slider.id(),
                slider.max_tick
            );
        }

        for (index, tick) in ticks.iter().enumerate() {
            let slot = self.slot(kind, index);
            self.ticks[slot] = *tick;
        }

        Ok(())
    }
}

impl TickLayout for SliderBoard {
    fn len(&self, kind: VectorKind) -> usize {
        match kind {
            VectorKind::Plan => self.plan_slots.len(),
            VectorKind::Full => self.sliders.len(),
        }
    }

    fn field_kind(&self, kind: VectorKind, index: usize) -> Option<SourceFieldKind> {
        self.sliders[self.slot(kind, index)].field.source_field_kind()
    }

    fn default_tick(&self, kind: VectorKind, index: usize) -> u8 {
        self.defaults[self.slot(kind, index)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::parameters;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};
    use std::collections::HashSet;

    /// Plan ticks of the built-in parameters
    const DEFAULT_PLAN_TICKS: [u8; 32] = [
        4, 9, 8, 19, 4, 9, 10, 19, 2, 9, 2, 19, 6, 9, 6, 19, 37, 9, 49, 19, 0, 4, 0, 19, 0, 9, 0,
        19, 0, 9, 0, 19,
    ];

    #[fixture]
    fn board(parameters: ScenarioParameters) -> SliderBoard {
        SliderBoard::new(&parameters).unwrap()
    }

    #[test]
    fn test_catalogue_layout() {
        let sliders = catalogue();
        assert_eq!(sliders.len(), 111);
        assert_eq!(
            sliders
                .iter()
                .filter(|slider| slider.group == SliderGroup::Plan)
                .count(),
            32
        );

        let ids: HashSet<_> = sliders.iter().map(Slider::id).collect();
        assert_eq!(ids.len(), sliders.len());
        assert_eq!(sliders[3].id(), "solar.initial_fraction");
        assert_eq!(sliders[4].id(), "solar.ramp0_build_fraction");
    }

    #[test]
    fn test_catalogue_round_trip() {
        for slider in catalogue() {
            slider.scale.check(slider.max_tick).unwrap();
            for tick in 0..=slider.max_tick {
                assert_eq!(
                    slider.nearest_tick(slider.value(tick)),
                    tick,
                    "slider {} does not round trip",
                    slider.id()
                );
            }
        }
    }

    #[rstest]
    fn test_default_plan_ticks(board: SliderBoard) {
        assert_eq!(board.plan_ticks(), DEFAULT_PLAN_TICKS);
        assert_eq!(board.len(VectorKind::Plan), 32);
        assert_eq!(board.len(VectorKind::Full), 111);
    }

    #[rstest]
    fn test_apply_defaults(board: SliderBoard, parameters: ScenarioParameters) {
        let snapped = board.apply(&parameters).unwrap();
        assert_approx_eq!(f64, snapped.discount_rate, 0.06, epsilon = 1e-12);
        assert_approx_eq!(f64, snapped.carbon_price, 0.0);
        let gas = &snapped.sources[EnergySource::NaturalGas];
        assert!((gas.co2_intensity - 447.0).abs() < 447.0 * 0.01);
        assert_eq!(gas.ramp[1].at_year, 2040);
        assert_approx_eq!(f64, gas.ramp[1].build_fraction, 2.45, epsilon = 1e-12);
        let hydrogen = snapped.sources[EnergySource::Hydrogen].storage.unwrap();
        assert!((hydrogen.hours - 720.0).abs() < 720.0 * 0.03);
    }

    #[rstest]
    fn test_set_tick(mut board: SliderBoard) {
        assert!(!board.any_assumption_changed());

        let event = board.set_tick(4, 10).unwrap();
        assert_eq!(
            event.field,
            ParameterField::Source(EnergySource::Solar, SourceField::RampBuildFraction(0))
        );
        assert_approx_eq!(f64, event.value, 0.5);
        assert!(!board.any_assumption_changed());

        board.set_tick(2, 25).unwrap();
        assert!(board.any_assumption_changed());
        let parameters = board.apply(&ScenarioParameters::default()).unwrap();
        assert_approx_eq!(f64, parameters.carbon_price, 50.0);

        board.reset();
        assert_eq!(board.ticks(), board.default_ticks());
    }

    #[rstest]
    fn test_set_tick_out_of_range(mut board: SliderBoard) {
        assert!(board.set_tick(5, 20).is_err());
        assert!(board.set_tick(111, 0).is_err());
        assert_eq!(board.ticks(), board.default_ticks());
    }

    #[rstest]
    fn test_load_plan(mut board: SliderBoard) {
        let mut ticks = DEFAULT_PLAN_TICKS;
        ticks[0] = 12;
        board.load(VectorKind::Plan, &ticks).unwrap();
        assert_eq!(board.ticks()[4], 12);
        assert_eq!(board.ticks()[..4], board.default_ticks()[..4]);
    }

    #[rstest]
    fn test_load_invalid(mut board: SliderBoard) {
        let mut ticks = DEFAULT_PLAN_TICKS;
        ticks[0] = 12;
        ticks[1] = 20;
        assert!(board.load(VectorKind::Plan, &ticks).is_err());
        assert!(board.load(VectorKind::Full, &ticks).is_err());
        assert_eq!(board.ticks(), board.default_ticks());
    }

    #[rstest]
    fn test_layout_field_kinds(board: SliderBoard) {
        assert_eq!(
            board.field_kind(VectorKind::Plan, 0),
            Some(SourceFieldKind::RampBuildFraction)
        );
        assert_eq!(board.field_kind(VectorKind::Full, 0), None);
        assert_eq!(
            board.field_kind(VectorKind::Full, 10),
            Some(SourceFieldKind::OperatingCost)
        );
        assert_eq!(board.default_tick(VectorKind::Plan, 18), 49);
    }
}
