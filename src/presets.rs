//! Named slider states bundled with the program.
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use strum::EnumIter;

/// A bundled scenario which can be restored instead of a state string
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum PresetOption {
    /// The built-in plan
    #[string = "default"]
    Default,
    /// Mostly renewable generation backed by hydrogen storage
    #[string = "re"]
    Renewables,
    /// A nuclear-led build-out
    #[string = "nuclear"]
    Nuclear,
    /// Renewables backed by batteries rather than hydrogen
    #[string = "no_h2"]
    NoHydrogen,
    /// Flat demand with revised cost assumptions
    #[string = "flat"]
    Flat,
    /// Gas-fired generation only
    #[string = "gas"]
    Gas,
}

impl PresetOption {
    /// The state string this preset restores
    pub fn state_string(self) -> &'static str {
        match self {
            Self::Default => "ASAECQgTBAkKEwIJAhMGCQYTJQkxEwAEABMACQATAAkAEw==",
            Self::Renewables => "AiAJBBYTDQgSEwIJAhMGCQYTJQkxEwAAABMECQgTCgVTEw==",
            Self::Nuclear => "AiAJBAADBwcAEwIJAhMWBiUTIQ0CEwAAABMICAsTAQUZEw==",
            Self::NoHydrogen => "AiANBRwTDQgUEwIJAhMGCQYTJQkxEwAEABMXCGQTAAUAEw==",
            Self::Flat => concat!(
                "Am8gFAACABMAEwALBQAoEh1iAgETABMADhAAKA8TXwQCCQITAx4UAxlBMWIPBgkGEwVePxMjHjFbRhoJGx",
                "MACARMHqsTXwABEwATBDkeJR7IJ18AAAkAEwANDQAoChNiUAMAAAkAEwEVCgsoDhNfIC8="
            ),
            Self::Gas => "AiAAAAATAAAAEwIJAhMGCQYTKQk5EwATABMACQATAAkAEw==",
        }
    }
}
