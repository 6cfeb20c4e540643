use serde::Serialize;

use crate::constants::DEFAULT_DRAG_COEFFICIENT;
use crate::errors::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Fins {
    pub count: u32,
    pub thickness: f64, // m
    pub span: f64,      // m
}

impl Fins {
    pub fn new(count: u32, thickness: f64, span: f64) -> Self {
        Fins {
            count,
            thickness,
            span,
        }
    }

    pub fn area(&self) -> f64 {
        self.count as f64 * self.thickness * self.span
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub number: usize,
    pub engine_count: u32,
    pub dry_mass: f64,         // kg, without motors
    pub diameter: f64,         // m
    pub drag_coefficient: f64,
    pub fins: Fins,
    pub delay: f64, // s between burnout and the next stage's ignition
}

impl Stage {
    pub fn new(number: usize, dry_mass: f64, diameter: f64) -> Self {
        Stage {
            number,
            engine_count: 1,
            dry_mass,
            diameter,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            fins: Fins::default(),
            delay: 0.0,
        }
    }

    pub fn with_engine_count(mut self, engine_count: u32) -> Self {
        self.engine_count = engine_count;
        self
    }

    pub fn with_drag_coefficient(mut self, drag_coefficient: f64) -> Self {
        self.drag_coefficient = drag_coefficient;
        self
    }

    pub fn with_fins(mut self, fins: Fins) -> Self {
        self.fins = fins;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn effective_diameter(&self) -> f64 {
        let radius = self.diameter / 2.0;
        2.0 * (radius * radius + self.fins.area() / std::f64::consts::PI).sqrt()
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let reject = |message: String| {
            Err(SimulationError::ConfigurationError(format!(
                "stage {}: {}",
                self.number, message
            )))
        };

        if self.engine_count == 0 {
            return reject("needs at least one motor".to_string());
        }
        if !(self.dry_mass > 0.0) || !self.dry_mass.is_finite() {
            return reject(format!("dry mass must be positive, got {} kg", self.dry_mass));
        }
        if !(self.diameter > 0.0) || !self.diameter.is_finite() {
            return reject(format!("diameter must be positive, got {} m", self.diameter));
        }
        if !(self.drag_coefficient >= 0.0) || !self.drag_coefficient.is_finite() {
            return reject(format!(
                "drag coefficient must not be negative, got {}",
                self.drag_coefficient
            ));
        }
        if !(self.fins.thickness >= 0.0) || !(self.fins.span >= 0.0) {
            return reject("fin dimensions must not be negative".to_string());
        }
        if !(self.delay >= 0.0) || !self.delay.is_finite() {
            return reject(format!("stage delay must not be negative, got {} s", self.delay));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fin_area() {
        let fins = Fins::new(4, 0.003, 0.05);
        assert_relative_eq!(fins.area(), 0.0006, epsilon = 1e-12);
        assert_eq!(Fins::default().area(), 0.0);
    }

    #[test]
    fn test_stage_defaults() {
        let stage = Stage::new(1, 0.5, 0.03);
        assert_eq!(stage.engine_count, 1);
        assert_eq!(stage.drag_coefficient, 0.75);
        assert_eq!(stage.delay, 0.0);
        assert!(stage.validate().is_ok());
    }

    #[test]
    fn test_effective_diameter_includes_fins() {
        let bare = Stage::new(1, 0.5, 0.03);
        assert_relative_eq!(bare.effective_diameter(), 0.03, epsilon = 1e-12);

        let finned = bare.with_fins(Fins::new(3, 0.003, 0.05));
        assert!(finned.effective_diameter() > 0.03);
    }

    #[test]
    fn test_validation_rejects_bad_stages() {
        assert!(Stage::new(1, 0.0, 0.03).validate().is_err());
        assert!(Stage::new(1, 0.5, -0.03).validate().is_err());
        assert!(Stage::new(1, 0.5, 0.03)
            .with_engine_count(0)
            .validate()
            .is_err());
        assert!(Stage::new(1, 0.5, 0.03)
            .with_delay(-1.0)
            .validate()
            .is_err());
        assert!(matches!(
            Stage::new(2, 0.5, 0.03).with_drag_coefficient(-0.1).validate(),
            Err(SimulationError::ConfigurationError(_))
        ));
    }
}
