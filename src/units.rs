//! This module defines the physical and monetary quantities used in scenario evaluation.
//!
//! Power is measured in MW, energy in MWh, mass in tonnes and money in dollars. Because the
//! profile datasets have an hourly cadence, one hourly value in MW is also the energy in MWh
//! delivered during that hour.
use float_cmp::{ApproxEq, F64Margin};
use serde::{Deserialize, Serialize};
use std::iter::Sum;

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
            derive_more::Display,
        )]
        #[display("{_0}")]
        pub struct $name(pub f64);

        impl $name {
            /// Return the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl From<f64> for $name {
            fn from(val: f64) -> Self {
                Self(val)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl ApproxEq for $name {
            type Margin = F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::from(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::from(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::from(self.0 / rhs.0)
            }
        }
    };
}

/// Represents a dimensionless quantity, e.g. a fraction or a rate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
    derive_more::Display,
)]
#[display("{_0}")]
pub struct Dimensionless(pub f64);

impl Dimensionless {
    /// Create a new dimensionless quantity
    pub fn new(val: f64) -> Self {
        Self(val)
    }

    /// Return the underlying value
    pub fn value(self) -> f64 {
        self.0
    }

    /// Raise to an integer power
    pub fn powi(self, rhs: i32) -> Self {
        Self(self.0.powi(rhs))
    }
}

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl ApproxEq for Dimensionless {
    type Margin = F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        self.0.approx_eq(other.0, margin)
    }
}

// Base quantities
unit_struct!(Money);
unit_struct!(Power);
unit_struct!(Energy);
unit_struct!(Mass);

// Derived quantities
unit_struct!(MoneyPerEnergy);
unit_struct!(MoneyPerPower);
unit_struct!(MoneyPerMass);
unit_struct!(MassPerEnergy);

// Division rules
impl_div!(Money, Energy, MoneyPerEnergy);
impl_div!(Money, Power, MoneyPerPower);
impl_div!(Mass, Energy, MassPerEnergy);

// Multiplication rules
impl_mul!(MoneyPerEnergy, Energy, Money);
impl_mul!(MoneyPerPower, Power, Money);
impl_mul!(MassPerEnergy, Energy, Mass);
impl_mul!(MoneyPerMass, MassPerEnergy, MoneyPerEnergy);
