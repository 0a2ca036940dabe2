use super::KernelError;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Smoothness regime of a task's generalized Matérn basis function
///
/// The squared-exponential kernel is the ν → ∞ limit of the Matérn family.
/// ν = 5/2 and ν = 7/2 have dedicated closed forms; any other ν > 0 uses
/// the general Bessel-function form.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum Smoothness {
    SquaredExponential,
    Matern52,
    Matern72,
    GeneralMatern(f64),
}

impl Smoothness {
    /// Resolve a numeric ν to its regime.
    ///
    /// # Example
    ///
    /// ```
    /// use mtgp::kernel::Smoothness;
    ///
    /// assert_eq!(Smoothness::from_nu(2.5).unwrap(), Smoothness::Matern52);
    /// assert_eq!(
    ///     Smoothness::from_nu(f64::INFINITY).unwrap(),
    ///     Smoothness::SquaredExponential
    /// );
    /// assert_eq!(
    ///     Smoothness::from_nu(1.5).unwrap(),
    ///     Smoothness::GeneralMatern(1.5)
    /// );
    /// assert_eq!(
    ///     Smoothness::from_nu(0.5).unwrap(),
    ///     Smoothness::GeneralMatern(0.5)
    /// );
    /// assert!(Smoothness::from_nu(0.0).is_err());
    /// ```
    pub fn from_nu(nu: f64) -> Result<Self, KernelError> {
        if nu == f64::INFINITY {
            Ok(Self::SquaredExponential)
        } else if nu == 2.5 {
            Ok(Self::Matern52)
        } else if nu == 3.5 {
            Ok(Self::Matern72)
        } else {
            let smoothness = Self::GeneralMatern(nu);
            smoothness.validate()?;
            Ok(smoothness)
        }
    }

    /// The numeric ν; infinite for the squared exponential
    pub fn nu(&self) -> f64 {
        match self {
            Self::SquaredExponential => f64::INFINITY,
            Self::Matern52 => 2.5,
            Self::Matern72 => 3.5,
            Self::GeneralMatern(nu) => *nu,
        }
    }

    /// Check that a general ν can be evaluated.
    ///
    /// The basis function of ν is |τ|^p K_p(|τ|) with p = ν/2 - 1/4. Its
    /// square is integrable for every finite ν > 0.
    pub fn validate(&self) -> Result<(), KernelError> {
        match self {
            Self::GeneralMatern(nu) if !(nu.is_finite() && *nu > 0.0) => {
                Err(KernelError::UnsupportedSmoothness(nu.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Smoothness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SquaredExponential => write!(f, "SE"),
            Self::Matern52 => write!(f, "5/2"),
            Self::Matern72 => write!(f, "7/2"),
            Self::GeneralMatern(nu) => write!(f, "{}", nu),
        }
    }
}

/// Parse the textual ν of a task configuration.
///
/// `"SE"`, `"squared_exponential"`, `"inf"` and the legacy sentinel `"0.0"`
/// select the squared exponential; `"5/2"`, `"7/2"` and decimal numbers are
/// resolved through [`Smoothness::from_nu`].
impl FromStr for Smoothness {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "se" | "squared_exponential" | "inf" | "infinity" | "0.0"
            | "0" => Ok(Self::SquaredExponential),
            "5/2" => Ok(Self::Matern52),
            "7/2" => Ok(Self::Matern72),
            other => other
                .parse::<f64>()
                .map_err(|_| KernelError::UnsupportedSmoothness(s.to_string()))
                .and_then(Self::from_nu),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_forms() {
        assert_eq!("SE".parse::<Smoothness>(), Ok(Smoothness::SquaredExponential));
        assert_eq!("0.0".parse::<Smoothness>(), Ok(Smoothness::SquaredExponential));
        assert_eq!(" 2.5 ".parse::<Smoothness>(), Ok(Smoothness::Matern52));
        assert_eq!("7/2".parse::<Smoothness>(), Ok(Smoothness::Matern72));
        assert_eq!("3.5".parse::<Smoothness>(), Ok(Smoothness::Matern72));
        assert_eq!("4.5".parse::<Smoothness>(), Ok(Smoothness::GeneralMatern(4.5)));
    }

    #[test]
    fn rejects_unsupported() {
        for s in ["-0.5", "-1", "nan", "matern", "", "1e-400"] {
            match s.parse::<Smoothness>() {
                Err(KernelError::UnsupportedSmoothness(_)) => (),
                other => panic!("{:?} parsed to {:?}", s, other),
            }
        }
    }

    #[test]
    fn general_matern_is_validated() {
        assert!(Smoothness::GeneralMatern(0.0).validate().is_err());
        assert!(Smoothness::GeneralMatern(-0.3).validate().is_err());
        assert!(Smoothness::GeneralMatern(f64::NAN).validate().is_err());
        assert!(Smoothness::GeneralMatern(f64::INFINITY).validate().is_err());
        assert!(Smoothness::GeneralMatern(0.75).validate().is_ok());
    }

    #[test]
    fn rough_matern_is_accepted() {
        assert_eq!(Smoothness::from_nu(0.5), Ok(Smoothness::GeneralMatern(0.5)));
        assert_eq!("0.3".parse::<Smoothness>(), Ok(Smoothness::GeneralMatern(0.3)));
        assert!(Smoothness::GeneralMatern(0.1).validate().is_ok());
    }

    #[test]
    fn nu_round_trips_through_from_nu() {
        for s in [
            Smoothness::SquaredExponential,
            Smoothness::Matern52,
            Smoothness::Matern72,
            Smoothness::GeneralMatern(1.25),
        ] {
            assert_eq!(Smoothness::from_nu(s.nu()), Ok(s));
        }
    }
}
