use serde::Serialize;

use super::{
    environment::{AtmosphereModel, LaunchSite},
    propulsion::{Engine, PropellantModel},
    rocket::Rocket,
};
use crate::constants::{DEFAULT_ROD_LENGTH, MAX_STEPS, SAMPLE_INTERVAL, TIME_STEP};
use crate::errors::SimulationError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOptions {
    pub time_step: f64,       // s
    pub sample_interval: f64, // s between retained telemetry samples
    pub temperature_correction: bool,
    pub atmosphere: AtmosphereModel,
    pub propellant_model: PropellantModel,
    pub max_steps: u64,
    pub verbose: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            time_step: TIME_STEP,
            sample_interval: SAMPLE_INTERVAL,
            temperature_correction: true,
            atmosphere: AtmosphereModel::default(),
            propellant_model: PropellantModel::default(),
            max_steps: MAX_STEPS,
            verbose: true,
        }
    }
}

impl SimulationOptions {
    pub fn sample_stride(&self) -> u64 {
        ((self.sample_interval / self.time_step).round() as u64).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flight {
    pub rocket: Rocket,
    pub engines: Vec<Engine>, // one per stage, booster first
    pub site: LaunchSite,
    pub rod_length: f64,  // m
    pub coast_time: f64,  // s to keep integrating once the rocket is descending
    pub options: SimulationOptions,
}

impl Flight {
    pub fn new(rocket: Rocket, engines: Vec<Engine>) -> Self {
        Flight {
            rocket,
            engines,
            site: LaunchSite::default(),
            rod_length: DEFAULT_ROD_LENGTH,
            coast_time: 0.0,
            options: SimulationOptions::default(),
        }
    }

    pub fn with_site(mut self, site: LaunchSite) -> Self {
        self.site = site;
        self
    }

    pub fn with_rod_length(mut self, rod_length: f64) -> Self {
        self.rod_length = rod_length;
        self
    }

    pub fn with_coast_time(mut self, coast_time: f64) -> Self {
        self.coast_time = coast_time;
        self
    }

    pub fn with_options(mut self, options: SimulationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        self.rocket.validate()?;

        if self.engines.len() != self.rocket.stage_count() {
            return Err(SimulationError::ConfigurationError(format!(
                "{} stages but {} motors",
                self.rocket.stage_count(),
                self.engines.len()
            )));
        }
        if !(self.rod_length >= 0.0) || !self.rod_length.is_finite() {
            return Err(SimulationError::ConfigurationError(format!(
                "rod length must not be negative, got {} m",
                self.rod_length
            )));
        }
        if !(self.coast_time >= 0.0) || !self.coast_time.is_finite() {
            return Err(SimulationError::ConfigurationError(format!(
                "coast time must not be negative, got {} s",
                self.coast_time
            )));
        }
        if !(self.options.time_step > 0.0) || !self.options.time_step.is_finite() {
            return Err(SimulationError::ConfigurationError(format!(
                "time step must be positive, got {} s",
                self.options.time_step
            )));
        }
        if !(self.options.sample_interval > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "sample interval must be positive, got {} s",
                self.options.sample_interval
            )));
        }
        if self.options.max_steps == 0 {
            return Err(SimulationError::ConfigurationError(
                "step ceiling must be at least one".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::launch_stages::Stage;
    use crate::control::propulsion::ThrustCurve;
    use crate::control::rocket::NoseShape;

    fn create_test_flight() -> Flight {
        let curve = ThrustCurve::from_pairs(&[(0.05, 10.0), (2.0, 10.0), (2.001, 0.0)]).unwrap();
        let engine = Engine::new("E10", 0.02, 0.04, curve).unwrap();
        let rocket = Rocket::new("Test", NoseShape::Ogive, vec![Stage::new(1, 0.5, 0.03)]);
        Flight::new(rocket, vec![engine])
    }

    #[test]
    fn test_defaults() {
        let flight = create_test_flight();
        assert!(flight.validate().is_ok());
        assert_eq!(flight.options.time_step, 0.001);
        assert_eq!(flight.options.sample_stride(), 100);
        assert_eq!(flight.options.atmosphere, AtmosphereModel::Historical);
        assert!((flight.rod_length - 1.524).abs() < 1e-12);
    }

    #[test]
    fn test_motor_count_must_match_stages() {
        let mut flight = create_test_flight();
        flight.engines.clear();
        assert!(matches!(
            flight.validate(),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_rejects_bad_environment() {
        assert!(create_test_flight().with_rod_length(-1.0).validate().is_err());
        assert!(create_test_flight().with_coast_time(-0.5).validate().is_err());

        let options = SimulationOptions {
            time_step: 0.0,
            ..SimulationOptions::default()
        };
        assert!(create_test_flight().with_options(options).validate().is_err());
    }

    #[test]
    fn test_sample_stride_never_zero() {
        let options = SimulationOptions {
            sample_interval: 0.0001,
            ..SimulationOptions::default()
        };
        assert_eq!(options.sample_stride(), 1);
    }
}
