//! Run configuration for the integration drivers.

use crate::analysis::Method;
use crate::traits::Scalar;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Method and range of an integration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings<T = f64> {
    pub method: Method,
    pub x0: T,
    pub x_end: T,
    pub dx: T,
}

impl<T: Scalar> IntegrationSettings<T> {
    pub fn validate(&self) -> Result<()> {
        validate_range(self.x0, self.x_end, self.dx)
    }
}

impl<T: Scalar + DeserializeOwned> IntegrationSettings<T> {
    /// Parses and validates settings written in YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let settings: Self =
            serde_yaml::from_str(text).context("Failed to parse integration settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let settings: Self =
            serde_yaml::from_reader(reader).context("Failed to read integration settings")?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Checks that stepping from `x0` by `dx` eventually passes `x_end`.
pub(crate) fn validate_range<T: Scalar>(x0: T, x_end: T, dx: T) -> Result<()> {
    if !x0.is_finite() || !x_end.is_finite() {
        bail!("Integration bounds must be finite.");
    }
    if !dx.is_finite() || dx == T::zero() {
        bail!("Step size dx must be finite and non-zero.");
    }
    if (x_end - x0) * dx < T::zero() {
        bail!("Step size dx must point from x0 towards x_end.");
    }
    if x0 + dx == x0 || x_end + dx == x_end {
        bail!("Step size dx is too small to advance x across the integration range.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::IntegrationSettings;
    use crate::analysis::Method;

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err:#}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn parses_yaml_settings() {
        let settings: IntegrationSettings = IntegrationSettings::from_yaml_str(
            "method: runge_kutta\nx0: 0.0\nx_end: 2.5\ndx: 0.05\n",
        )
        .expect("settings should parse");
        assert_eq!(settings.method, Method::RungeKutta);
        assert_eq!(settings.x_end, 2.5);
        assert_eq!(settings.dx, 0.05);
    }

    #[test]
    fn reads_settings_from_reader() {
        let text = b"method: velocity_verlet\nx0: 1.0\nx_end: 0.0\ndx: -0.001\n";
        let settings = IntegrationSettings::<f32>::from_reader(&text[..])
            .expect("settings should parse");
        assert_eq!(settings.method, Method::VelocityVerlet);
        assert!(settings.dx < 0.0);
    }

    #[test]
    fn method_names_are_snake_case() {
        let text = serde_yaml::to_string(&Method::MidPoint).expect("serialize");
        assert_eq!(text.trim(), "mid_point");
    }

    #[test]
    fn rejects_unknown_method() {
        assert_err_contains(
            IntegrationSettings::<f64>::from_yaml_str("method: leapfrog\nx0: 0\nx_end: 1\ndx: 0.1\n"),
            "Failed to parse integration settings",
        );
    }

    #[test]
    fn rejects_step_pointing_away_from_end() {
        assert_err_contains(
            IntegrationSettings::<f64>::from_yaml_str(
                "method: euler\nx0: 0.0\nx_end: 1.0\ndx: -0.1\n",
            ),
            "towards x_end",
        );
        let settings = IntegrationSettings {
            method: Method::Euler,
            x0: 0.0,
            x_end: 1.0,
            dx: 0.0,
        };
        assert_err_contains(settings.validate(), "non-zero");
    }

    #[test]
    fn rejects_step_lost_in_rounding() {
        let at_start = IntegrationSettings {
            method: Method::Euler,
            x0: 1e17,
            x_end: 2e17,
            dx: 1.0,
        };
        assert_err_contains(at_start.validate(), "too small to advance");

        // x would stall at 2^53 on the way to x_end.
        let at_end = IntegrationSettings {
            x0: 0.0,
            x_end: 1e17,
            ..at_start
        };
        assert_err_contains(at_end.validate(), "too small to advance");

        let fine = IntegrationSettings {
            x0: 1e3,
            x_end: 2e3,
            ..at_start
        };
        assert!(fine.validate().is_ok());
    }
}
