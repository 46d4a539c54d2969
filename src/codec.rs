//! Encoding slider positions as compact, versioned state strings.
//!
//! A state string is the standard base64 encoding of the bytes `[version, count, ticks...]`, with
//! one byte per tick. Decoding is the only place untrusted input enters the engine, so it never
//! panics: every malformed string is reported as a [`StateError`].
//!
//! Strings written by older versions of the program are upgraded by a chain of [`Migration`]s,
//! one for every version between the string's and the current one.
use crate::parameters::SourceFieldKind;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use log::debug;
use thiserror::Error;

/// The version of the tick vocabulary and order written by [`StateCodec::encode`]
pub const FORMAT_VERSION: u8 = 2;

/// The two shapes of tick vector a state string can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    /// The build-out plan sliders only
    Plan,
    /// Every slider
    Full,
}

/// Describes the tick vectors which a state string can be decoded into
pub trait TickLayout {
    /// The number of ticks in a vector of the given kind
    fn len(&self, kind: VectorKind) -> usize;

    /// The kind of source field controlled by the tick at `index`, if any
    fn field_kind(&self, kind: VectorKind, index: usize) -> Option<SourceFieldKind>;

    /// The default tick at `index`
    fn default_tick(&self, kind: VectorKind, index: usize) -> u8;
}

/// Reasons a state string cannot be decoded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    /// The string is not valid base64
    #[error("State string is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The string holds too few bytes for a header
    #[error("State string is too short ({0} bytes)")]
    TooShort(usize),
    /// The string was written by a newer version of the program
    #[error("State string has version {0}, which is newer than this program supports")]
    NewerVersion(u8),
    /// The string has an old version which cannot be upgraded
    #[error("State string version {0} is no longer supported")]
    UnsupportedVersion(u8),
    /// The number of ticks doesn't match the header
    #[error("State string declares {declared} ticks but contains {actual}")]
    LengthMismatch {
        /// The number of ticks given in the header
        declared: usize,
        /// The number of ticks present
        actual: usize,
    },
    /// The number of ticks matches neither known vector
    #[error("State string has {0} ticks, which matches no known slider layout")]
    UnrecognisedLength(usize),
}

/// A change to the ticks of an old state string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationRule {
    /// Reset every tick for the given kind of field to its default
    ResetToDefault(SourceFieldKind),
}

impl MigrationRule {
    fn apply(self, layout: &impl TickLayout, kind: VectorKind, ticks: &mut [u8]) {
        match self {
            Self::ResetToDefault(field_kind) => {
                for (index, tick) in ticks.iter_mut().enumerate() {
                    if layout.field_kind(kind, index) == Some(field_kind) {
                        *tick = layout.default_tick(kind, index);
                    }
                }
            }
        }
    }
}

/// A step upgrading state strings of one version to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// The version the step upgrades from
    pub version: u8,
    /// The change to make
    pub rule: MigrationRule,
}

/// A successfully decoded state string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedState {
    /// The version the string was written with
    pub version: u8,
    /// Which vector the ticks belong to
    pub kind: VectorKind,
    /// The ticks, upgraded to the current version
    pub ticks: Vec<u8>,
}

/// Reads and writes state strings
#[derive(Debug, Clone, PartialEq)]
pub struct StateCodec {
    migrations: Vec<Migration>,
}

impl Default for StateCodec {
    fn default() -> Self {
        // The operating cost scale changed in version 2
        Self::new(vec![Migration {
            version: 1,
            rule: MigrationRule::ResetToDefault(SourceFieldKind::OperatingCost),
        }])
    }
}

impl StateCodec {
    /// Create a codec with the given migration steps, which are applied in the order given
    pub fn new(migrations: Vec<Migration>) -> Self {
        Self { migrations }
    }

    /// Encode a tick vector with the current version.
    ///
    /// # Panics
    ///
    /// If there are more than 255 ticks.
    pub fn encode(&self, ticks: &[u8]) -> String {
        assert!(
            ticks.len() <= usize::from(u8::MAX),
            "Cannot encode {} ticks",
            ticks.len()
        );

        let mut bytes = Vec::with_capacity(ticks.len() + 2);
        bytes.push(FORMAT_VERSION);
        bytes.push(ticks.len() as u8);
        bytes.extend_from_slice(ticks);
        BASE64_STANDARD.encode(bytes)
    }

    /// Decode a state string into one of the vectors described by `layout`
    pub fn decode(
        &self,
        state: &str,
        layout: &impl TickLayout,
    ) -> Result<DecodedState, StateError> {
        let bytes = BASE64_STANDARD.decode(state.trim())?;
        let [version, count, ticks @ ..] = bytes.as_slice() else {
            return Err(StateError::TooShort(bytes.len()));
        };

        let version = *version;
        if version > FORMAT_VERSION {
            return Err(StateError::NewerVersion(version));
        }
        let steps = self.steps_from(version)?;

        let count = usize::from(*count);
        if ticks.len() != count {
            return Err(StateError::LengthMismatch {
                declared: count,
                actual: ticks.len(),
            });
        }
        let kind = [VectorKind::Plan, VectorKind::Full]
            .into_iter()
            .find(|kind| layout.len(*kind) == count)
            .ok_or(StateError::UnrecognisedLength(count))?;

        let mut ticks = ticks.to_vec();
        for step in steps {
            debug!(
                "Upgrading state string from version {} with {:?}",
                step.version, step.rule
            );
            step.rule.apply(layout, kind, &mut ticks);
        }

        Ok(DecodedState {
            version,
            kind,
            ticks,
        })
    }

    /// The steps needed to upgrade a string of the given version, in the order to apply them
    fn steps_from(&self, version: u8) -> Result<Vec<&Migration>, StateError> {
        let mut steps = Vec::new();
        for from in version..FORMAT_VERSION {
            let len_before = steps.len();
            steps.extend(self.migrations.iter().filter(|step| step.version == from));
            if steps.len() == len_before {
                return Err(StateError::UnsupportedVersion(version));
            }
        }

        Ok(steps)
    }
}
