use serde::Serialize;

use crate::errors::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThrustSample {
    pub time: f64,   // s from ignition
    pub thrust: f64, // N
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PropellantModel {
    #[default]
    ImpulseFraction,
    // Deprecated: mass leaves at a constant rate over the burn time.
    BurnTimeFraction,
}

// Linear between samples, from an implicit (0, 0) unless the first sample is at t = 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrustCurve {
    samples: Vec<ThrustSample>,
    total_impulse: f64,
    peak_thrust: f64,
}

impl ThrustCurve {
    pub fn new(samples: Vec<ThrustSample>) -> Result<Self, SimulationError> {
        let last = match samples.last() {
            Some(last) => *last,
            None => {
                return Err(SimulationError::NumericError(
                    "thrust curve has no samples".to_string(),
                ))
            }
        };

        let mut previous_time = f64::NEG_INFINITY;
        for sample in &samples {
            if !sample.time.is_finite() || !sample.thrust.is_finite() {
                return Err(SimulationError::NumericError(
                    "thrust curve contains a non-finite sample".to_string(),
                ));
            }
            if sample.time < 0.0 || sample.thrust < 0.0 {
                return Err(SimulationError::NumericError(format!(
                    "thrust sample ({}, {}) is negative",
                    sample.time, sample.thrust
                )));
            }
            if sample.time <= previous_time {
                return Err(SimulationError::NumericError(format!(
                    "thrust sample times must strictly increase, {} follows {}",
                    sample.time, previous_time
                )));
            }
            previous_time = sample.time;
        }

        if last.thrust != 0.0 || last.time <= 0.0 {
            return Err(SimulationError::NumericError(
                "thrust curve has no terminating zero-thrust sample".to_string(),
            ));
        }

        let mut curve = ThrustCurve {
            samples,
            total_impulse: 0.0,
            peak_thrust: 0.0,
        };
        curve.total_impulse = curve.impulse_until(last.time);
        curve.peak_thrust = curve
            .samples
            .iter()
            .map(|sample| sample.thrust)
            .fold(0.0, f64::max);

        if !(curve.total_impulse > 0.0) {
            return Err(SimulationError::NumericError(
                "thrust curve delivers zero total impulse".to_string(),
            ));
        }

        Ok(curve)
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, SimulationError> {
        Self::new(
            pairs
                .iter()
                .map(|&(time, thrust)| ThrustSample { time, thrust })
                .collect(),
        )
    }

    pub fn samples(&self) -> &[ThrustSample] {
        &self.samples
    }

    pub fn burn_time(&self) -> f64 {
        self.samples.last().map_or(0.0, |sample| sample.time)
    }

    pub fn total_impulse(&self) -> f64 {
        self.total_impulse
    }

    pub fn peak_thrust(&self) -> f64 {
        self.peak_thrust
    }

    pub fn average_thrust(&self) -> f64 {
        self.total_impulse / self.burn_time()
    }

    pub fn thrust_at(&self, time: f64) -> f64 {
        if time < 0.0 || time >= self.burn_time() {
            return 0.0;
        }

        let index = self.samples.partition_point(|sample| sample.time < time);
        let next = self.samples[index];
        let previous = self.previous_point(index);

        if next.time == previous.time {
            return next.thrust;
        }

        previous.thrust
            + (next.thrust - previous.thrust) * (time - previous.time) / (next.time - previous.time)
    }

    pub fn impulse_until(&self, time: f64) -> f64 {
        if time <= 0.0 {
            return 0.0;
        }

        let mut impulse = 0.0;
        let mut previous = ThrustSample {
            time: 0.0,
            thrust: 0.0,
        };

        for sample in &self.samples {
            if sample.time >= time {
                let partial = self.thrust_at(time);
                impulse += (time - previous.time) * (previous.thrust + partial) / 2.0;
                return impulse;
            }
            impulse += (sample.time - previous.time) * (previous.thrust + sample.thrust) / 2.0;
            previous = *sample;
        }

        impulse
    }

    fn previous_point(&self, index: usize) -> ThrustSample {
        if index == 0 {
            ThrustSample {
                time: 0.0,
                thrust: 0.0,
            }
        } else {
            self.samples[index - 1]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Engine {
    pub code: String,
    pub manufacturer: String,
    pub diameter: f64, // mm
    pub length: f64,   // mm
    pub delays: Vec<u32>,
    pub propellant_mass: f64, // kg
    pub total_mass: f64,      // kg
    pub curve: ThrustCurve,
}

impl Engine {
    pub fn new(
        code: impl Into<String>,
        propellant_mass: f64,
        total_mass: f64,
        curve: ThrustCurve,
    ) -> Result<Self, SimulationError> {
        let code = code.into();

        if code.trim().is_empty() {
            return Err(SimulationError::ConfigurationError(
                "motor code is empty".to_string(),
            ));
        }
        if !(propellant_mass >= 0.0) || !(total_mass > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "motor {} has invalid mass (propellant {} kg, total {} kg)",
                code, propellant_mass, total_mass
            )));
        }
        if propellant_mass > total_mass {
            return Err(SimulationError::ConfigurationError(format!(
                "motor {} propellant mass {} kg exceeds its total mass {} kg",
                code, propellant_mass, total_mass
            )));
        }

        Ok(Engine {
            code,
            manufacturer: String::new(),
            diameter: 0.0,
            length: 0.0,
            delays: Vec::new(),
            propellant_mass,
            total_mass,
            curve,
        })
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    pub fn with_dimensions(mut self, diameter: f64, length: f64) -> Self {
        self.diameter = diameter;
        self.length = length;
        self
    }

    pub fn with_delays(mut self, delays: Vec<u32>) -> Self {
        self.delays = delays;
        self
    }

    pub fn burn_time(&self) -> f64 {
        self.curve.burn_time()
    }

    pub fn thrust_at(&self, time: f64) -> f64 {
        self.curve.thrust_at(time)
    }

    pub fn total_impulse(&self) -> f64 {
        self.curve.total_impulse()
    }

    pub fn peak_thrust(&self) -> f64 {
        self.curve.peak_thrust()
    }

    pub fn average_thrust(&self) -> f64 {
        self.curve.average_thrust()
    }

    // Propellant burned by one motor, never more than it carries.
    pub fn consumed_mass(
        &self,
        model: PropellantModel,
        delivered_impulse: f64,
        burn_time: f64,
    ) -> f64 {
        let fraction = match model {
            PropellantModel::ImpulseFraction => delivered_impulse / self.total_impulse(),
            PropellantModel::BurnTimeFraction => burn_time / self.burn_time(),
        };

        (fraction * self.propellant_mass).clamp(0.0, self.propellant_mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    fn ramp_curve() -> ThrustCurve {
        ThrustCurve::from_pairs(&[(0.1, 10.0), (0.5, 6.0), (1.0, 6.0), (1.2, 0.0)]).unwrap()
    }

    #[test]
    fn test_thrust_outside_burn_is_zero() {
        let curve = ramp_curve();
        assert_eq!(curve.thrust_at(-0.5), 0.0);
        assert_eq!(curve.thrust_at(1.2), 0.0);
        assert_eq!(curve.thrust_at(5.0), 0.0);
    }

    #[test]
    fn test_thrust_interpolates_from_origin() {
        let curve = ramp_curve();
        assert_relative_eq!(curve.thrust_at(0.0), 0.0, epsilon = EPSILON);
        assert_relative_eq!(curve.thrust_at(0.05), 5.0, epsilon = EPSILON);
        assert_relative_eq!(curve.thrust_at(0.1), 10.0, epsilon = EPSILON);
        assert_relative_eq!(curve.thrust_at(0.3), 8.0, epsilon = EPSILON);
        assert_relative_eq!(curve.thrust_at(0.75), 6.0, epsilon = EPSILON);
        assert_relative_eq!(curve.thrust_at(1.1), 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_sample_at_ignition_is_used_directly() {
        let curve = ThrustCurve::from_pairs(&[(0.0, 4.0), (1.0, 4.0), (1.5, 0.0)]).unwrap();
        assert_relative_eq!(curve.thrust_at(0.0), 4.0, epsilon = EPSILON);
        assert_relative_eq!(curve.total_impulse(), 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_derived_figures() {
        let curve = ramp_curve();
        // 0.5 + 3.2 + 3.0 + 0.6
        assert_relative_eq!(curve.total_impulse(), 7.3, epsilon = EPSILON);
        assert_relative_eq!(curve.peak_thrust(), 10.0, epsilon = EPSILON);
        assert_relative_eq!(curve.average_thrust(), 7.3 / 1.2, epsilon = EPSILON);
        assert_relative_eq!(curve.burn_time(), 1.2, epsilon = EPSILON);
    }

    #[test]
    fn test_partial_impulse() {
        let curve = ramp_curve();
        assert_eq!(curve.impulse_until(0.0), 0.0);
        assert_relative_eq!(curve.impulse_until(0.1), 0.5, epsilon = EPSILON);
        assert_relative_eq!(curve.impulse_until(0.3), 0.5 + 1.8, epsilon = EPSILON);
        assert_relative_eq!(curve.impulse_until(10.0), 7.3, epsilon = EPSILON);
    }

    #[test]
    fn test_rejects_missing_burnout_sample() {
        let result = ThrustCurve::from_pairs(&[(0.1, 10.0), (1.0, 5.0)]);
        assert!(matches!(result, Err(SimulationError::NumericError(_))));
    }

    #[test]
    fn test_rejects_unsorted_samples() {
        let result = ThrustCurve::from_pairs(&[(0.5, 10.0), (0.2, 5.0), (1.0, 0.0)]);
        assert!(matches!(result, Err(SimulationError::NumericError(_))));
    }

    #[test]
    fn test_rejects_zero_impulse() {
        assert!(ThrustCurve::from_pairs(&[]).is_err());
        let result = ThrustCurve::from_pairs(&[(0.5, 0.0), (1.0, 0.0)]);
        assert!(matches!(result, Err(SimulationError::NumericError(_))));
    }

    #[test]
    fn test_engine_mass_validation() {
        assert!(Engine::new("A8", 0.003, 0.016, ramp_curve()).is_ok());
        assert!(matches!(
            Engine::new("A8", 0.02, 0.016, ramp_curve()),
            Err(SimulationError::ConfigurationError(_))
        ));
        assert!(Engine::new("A8", 0.003, 0.0, ramp_curve()).is_err());
        assert!(Engine::new("  ", 0.003, 0.016, ramp_curve()).is_err());
    }

    #[test]
    fn test_consumed_mass_tracks_impulse_fraction() {
        let engine = Engine::new("X1", 0.01, 0.02, ramp_curve()).unwrap();
        let half = engine.total_impulse() / 2.0;

        assert_relative_eq!(
            engine.consumed_mass(PropellantModel::ImpulseFraction, half, 0.1),
            0.005,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            engine.consumed_mass(PropellantModel::ImpulseFraction, 1.0e3, 0.1),
            0.01,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            engine.consumed_mass(PropellantModel::BurnTimeFraction, 0.0, 0.6),
            0.005,
            epsilon = EPSILON
        );
    }
}
