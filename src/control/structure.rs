use serde::Serialize;

use super::{propulsion::Engine, rocket::Rocket};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageWindow {
    pub start_burn: f64,
    pub end_burn: f64,
    pub end_stage: f64,
}

impl StageWindow {
    pub fn is_burning(&self, time: f64) -> bool {
        time >= self.start_burn && time <= self.end_burn
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub windows: Vec<StageWindow>,
    pub stage_masses: Vec<f64>, // launch mass of each stage including motors
    diameters: Vec<f64>,
    drag_coefficients: Vec<f64>,
    fin_areas: Vec<f64>,
}

impl Structure {
    pub fn new(rocket: &Rocket, engines: &[Engine]) -> Self {
        let mut windows = Vec::with_capacity(rocket.stages.len());
        let mut start_burn = 0.0;

        for (stage, engine) in rocket.stages.iter().zip(engines) {
            let end_burn = start_burn + engine.burn_time();
            let end_stage = end_burn + stage.delay;
            windows.push(StageWindow {
                start_burn,
                end_burn,
                end_stage,
            });
            start_burn = end_stage;
        }

        let stage_masses = rocket
            .stages
            .iter()
            .zip(engines)
            .map(|(stage, engine)| stage.dry_mass + engine.total_mass * stage.engine_count as f64)
            .collect();

        Structure {
            windows,
            stage_masses,
            diameters: rocket.stages.iter().map(|stage| stage.diameter).collect(),
            drag_coefficients: rocket
                .stages
                .iter()
                .map(|stage| stage.drag_coefficient)
                .collect(),
            fin_areas: rocket.stages.iter().map(|stage| stage.fins.area()).collect(),
        }
    }

    pub fn stage_count(&self) -> usize {
        self.windows.len()
    }

    pub fn get_total_mass(&self) -> f64 {
        self.stage_masses.iter().sum()
    }

    // Mass still attached once every stage before `stage` has been dropped.
    pub fn mass_from(&self, stage: usize) -> f64 {
        self.stage_masses[stage..].iter().sum()
    }

    pub fn reference_diameter(&self, stage: usize) -> f64 {
        self.diameters[stage..].iter().copied().fold(0.0, f64::max)
    }

    pub fn reference_drag_coefficient(&self, stage: usize) -> f64 {
        self.drag_coefficients[stage..]
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }

    pub fn drag_constant(&self, stage: usize) -> f64 {
        let diameter = self.reference_diameter(stage);
        let area = std::f64::consts::PI * diameter * diameter * 0.25 + self.fin_areas[stage];
        0.5 * self.reference_drag_coefficient(stage) * area
    }
}
