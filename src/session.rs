//! The interactive state of a scenario: slider positions and the parameters they imply.
use crate::codec::{StateCodec, VectorKind};
use crate::parameters::ScenarioParameters;
use crate::sliders::SliderBoard;
use anyhow::Result;
use log::{info, warn};

/// Slider positions together with the parameters derived from them
#[derive(Debug, Clone)]
pub struct Session {
    /// The parameters the sliders start from
    defaults: ScenarioParameters,
    /// The defaults with every value moved to the nearest slider tick
    snapped: ScenarioParameters,
    board: SliderBoard,
    codec: StateCodec,
    parameters: ScenarioParameters,
    default_state: String,
}

impl Session {
    /// Start a session with every slider at the position closest to `defaults`
    pub fn new(defaults: ScenarioParameters) -> Result<Self> {
        let board = SliderBoard::new(&defaults)?;
        let snapped = board.apply(&defaults)?;
        let codec = StateCodec::default();
        let default_state = codec.encode(&board.plan_ticks());

        Ok(Self {
            parameters: snapped.clone(),
            defaults,
            snapped,
            board,
            codec,
            default_state,
        })
    }

    /// The current parameters
    pub fn parameters(&self) -> &ScenarioParameters {
        &self.parameters
    }

    /// The current slider positions
    pub fn board(&self) -> &SliderBoard {
        &self.board
    }

    /// Move a single slider and update the parameters it controls
    pub fn set_tick(&mut self, index: usize, tick: u8) -> Result<()> {
        let event = self.board.set_tick(index, tick)?;
        self.parameters = self.parameters.apply(event.field, event.value)?;

        Ok(())
    }

    /// Encode the slider positions.
    ///
    /// Only the plan sliders are included unless an assumption has been changed.
    pub fn encode_state(&self) -> String {
        let kind = if self.board.any_assumption_changed() {
            VectorKind::Full
        } else {
            VectorKind::Plan
        };

        self.codec.encode(&self.board.ticks_for(kind))
    }

    /// The state string to persist, which is empty if every slider is at its default
    pub fn state_string(&self) -> String {
        let state = self.encode_state();
        if state == self.default_state {
            String::new()
        } else {
            state
        }
    }

    /// Move every slider back to its default position
    pub fn reset(&mut self) {
        self.board.reset();
        self.parameters.clone_from(&self.snapped);
    }

    /// Restore slider positions from a state string.
    ///
    /// If the string cannot be restored, every slider is left at its default position.
    ///
    /// # Returns
    ///
    /// Whether the string was restored.
    pub fn restore(&mut self, state: &str) -> bool {
        self.reset();
        match self.try_restore(state) {
            Ok(()) => true,
            Err(err) => {
                warn!("Ignoring state string {state:?}: {err:#}");
                self.reset();
                false
            }
        }
    }

    fn try_restore(&mut self, state: &str) -> Result<()> {
        let decoded = self.codec.decode(state, &self.board)?;
        self.board.load(decoded.kind, &decoded.ticks)?;
        let parameters = self.board.apply(&self.defaults)?;

        for (source, source_parameters) in parameters.sources.iter() {
            if !source_parameters.ramp_is_ordered() {
                warn!("Restored ramp years for {source} are not strictly increasing");
            }
        }

        info!(
            "Restored {} slider positions from a version {} state string",
            decoded.ticks.len(),
            decoded.version
        );
        self.parameters = parameters;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TickLayout;
    use crate::fixture::parameters;
    use crate::presets::PresetOption;
    use crate::source::EnergySource;
    use base64::prelude::{BASE64_STANDARD, Engine as _};
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    /// Index of the solar operating cost slider
    const SOLAR_OPERATING_COST: usize = 10;

    /// Index of the carbon price slider
    const CARBON_PRICE: usize = 2;

    #[fixture]
    fn session(parameters: ScenarioParameters) -> Session {
        Session::new(parameters).unwrap()
    }

    #[rstest]
    fn test_new_session(session: Session) {
        assert_eq!(session.state_string(), "");
        assert_eq!(session.board().ticks(), session.board().default_ticks());
        assert_approx_eq!(f64, session.parameters().discount_rate, 0.06, epsilon = 1e-12);
    }

    #[rstest]
    fn test_restore_presets(
        mut session: Session,
        #[values(
            PresetOption::Default,
            PresetOption::Renewables,
            PresetOption::Nuclear,
            PresetOption::NoHydrogen,
            PresetOption::Flat,
            PresetOption::Gas
        )]
        preset: PresetOption,
    ) {
        assert!(session.restore(preset.state_string()));
    }

    #[rstest]
    fn test_restore_default_preset(mut session: Session) {
        assert!(session.restore(PresetOption::Default.state_string()));
        assert_eq!(session.board().ticks(), session.board().default_ticks());
        assert_eq!(session.state_string(), "");
    }

    #[rstest]
    #[case(PresetOption::Renewables)]
    #[case(PresetOption::Flat)]
    fn test_restore_then_encode(mut session: Session, #[case] preset: PresetOption) {
        assert!(session.restore(preset.state_string()));
        assert_eq!(session.state_string(), preset.state_string());
    }

    #[rstest]
    fn test_restore_flat_assumptions(mut session: Session) {
        assert!(session.restore(PresetOption::Flat.state_string()));
        let parameters = session.parameters();
        assert_approx_eq!(f64, parameters.carbon_price, 0.0);
        assert_approx_eq!(
            f64,
            parameters.sources[EnergySource::Solar].operating_cost,
            10.0
        );
        assert!(!parameters.sources[EnergySource::Solar].ramp_is_ordered());
    }

    #[rstest]
    fn test_encode_state_kind(mut session: Session) {
        session.set_tick(4, 10).unwrap();
        let decoded = StateCodec::default()
            .decode(&session.encode_state(), session.board())
            .unwrap();
        assert_eq!(decoded.kind, VectorKind::Plan);
        assert_eq!(decoded.ticks.len(), 32);

        session.set_tick(CARBON_PRICE, 25).unwrap();
        assert_approx_eq!(f64, session.parameters().carbon_price, 50.0);
        let decoded = StateCodec::default()
            .decode(&session.encode_state(), session.board())
            .unwrap();
        assert_eq!(decoded.kind, VectorKind::Full);
        assert_eq!(decoded.ticks, session.board().ticks());
    }

    #[rstest]
    #[case("")]
    #[case("not a state string")]
    #[case("AwIAAA==")] // Newer version
    fn test_restore_invalid(mut session: Session, #[case] state: &str) {
        session.set_tick(CARBON_PRICE, 25).unwrap();
        assert!(!session.restore(state));
        assert_eq!(session.board().ticks(), session.board().default_ticks());
        assert_approx_eq!(f64, session.parameters().carbon_price, 0.0);
    }

    #[rstest]
    fn test_restore_out_of_range(mut session: Session) {
        let mut ticks = session.board().plan_ticks();
        ticks[1] = 25;
        assert!(!session.restore(&StateCodec::default().encode(&ticks)));
        assert_eq!(session.board().ticks(), session.board().default_ticks());
    }

    #[rstest]
    fn test_restore_version_one_full_vector(mut session: Session) {
        let default_ticks = session.board().default_ticks().to_vec();
        let mut ticks = default_ticks.clone();
        ticks[CARBON_PRICE] = 10;
        ticks[SOLAR_OPERATING_COST] = 60;

        let mut bytes = vec![1, ticks.len() as u8];
        bytes.extend(&ticks);
        assert!(session.restore(&BASE64_STANDARD.encode(bytes)));

        let board = session.board();
        assert_eq!(board.len(VectorKind::Full), ticks.len());
        assert_eq!(board.ticks()[CARBON_PRICE], 10);
        assert_eq!(
            board.ticks()[SOLAR_OPERATING_COST],
            default_ticks[SOLAR_OPERATING_COST]
        );
        assert_approx_eq!(f64, session.parameters().carbon_price, 20.0);
    }
}
