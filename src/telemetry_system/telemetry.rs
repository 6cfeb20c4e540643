use serde::Serialize;

use crate::control::environment::Environment;
use crate::trajectory_system::kinematics::FlightPhase;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub time: f64,         // s
    pub altitude: f64,     // m above the pad
    pub velocity: f64,     // m/s
    pub acceleration: f64, // m/s²
    pub thrust: f64,       // N
    pub drag: f64,         // N, signed along the launch axis
    pub mass: f64,         // kg
    pub stage: usize,      // 1-based stage currently lowest on the stack
    pub phase: FlightPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EventKind {
    Ignition { stage: usize },
    Liftoff,
    RodClearance,
    Burnout { stage: usize },
    Separation { stage: usize },
    Apogee,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightEvent {
    pub time: f64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Extremum {
    pub value: f64,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RodClearance {
    pub time: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cutoff {
    pub time: f64,
    pub altitude: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    Apogee,
    CoastLimit,
    GroundImpact,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteSummary {
    pub altitude: f64,           // m
    pub temperature: f64,        // K
    pub barometer: f64,          // inHg
    pub sea_level_density: f64,  // kg/m³
    pub sound_speed: f64,        // m/s
}

impl From<&Environment> for SiteSummary {
    fn from(environment: &Environment) -> Self {
        SiteSummary {
            altitude: environment.site_altitude,
            temperature: environment.base_temperature,
            barometer: environment.barometer,
            sea_level_density: environment.sea_level_density,
            sound_speed: environment.site_sound_speed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Results {
    pub samples: Vec<TelemetrySample>,
    pub events: Vec<FlightEvent>,
    pub max_altitude: Extremum,
    pub max_velocity: Extremum,
    pub max_acceleration: Extremum,
    pub min_acceleration: Extremum,
    pub rod_clearance: Option<RodClearance>,
    pub cutoff: Option<Cutoff>,
    pub liftoff_time: Option<f64>,
    pub termination: Termination,
    pub final_time: f64,
    pub steps: u64,
    pub site: SiteSummary,
}

impl Results {
    pub fn event_time(&self, kind: EventKind) -> Option<f64> {
        self.events
            .iter()
            .find(|event| event.kind == kind)
            .map(|event| event.time)
    }

    pub fn ignition_time(&self, stage: usize) -> Option<f64> {
        self.event_time(EventKind::Ignition { stage })
    }

    pub fn apogee_time(&self) -> Option<f64> {
        self.event_time(EventKind::Apogee)
    }

    pub fn final_sample(&self) -> Option<&TelemetrySample> {
        self.samples.last()
    }
}

#[derive(Debug)]
pub struct Telemetry {
    stride: u64,
    samples: Vec<TelemetrySample>,
    events: Vec<FlightEvent>,
    max_altitude: Extremum,
    max_velocity: Extremum,
    max_acceleration: Extremum,
    min_acceleration: Extremum,
    rod_clearance: Option<RodClearance>,
    cutoff: Option<Cutoff>,
    liftoff_time: Option<f64>,
    steps: u64,
}

impl Telemetry {
    pub fn new(stride: u64) -> Self {
        Telemetry {
            stride: stride.max(1),
            samples: Vec::new(),
            events: Vec::new(),
            max_altitude: Extremum::default(),
            max_velocity: Extremum::default(),
            max_acceleration: Extremum::default(),
            min_acceleration: Extremum::default(),
            rod_clearance: None,
            cutoff: None,
            liftoff_time: None,
            steps: 0,
        }
    }

    pub fn record_initial(&mut self, sample: TelemetrySample) {
        self.samples.push(sample);
    }

    pub fn collect_data(&mut self, sample: TelemetrySample) {
        self.steps += 1;

        if sample.acceleration > self.max_acceleration.value {
            self.max_acceleration = Extremum {
                value: sample.acceleration,
                time: sample.time,
            };
        } else if sample.acceleration < self.min_acceleration.value {
            self.min_acceleration = Extremum {
                value: sample.acceleration,
                time: sample.time,
            };
        }
        if sample.velocity > self.max_velocity.value {
            self.max_velocity = Extremum {
                value: sample.velocity,
                time: sample.time,
            };
        }
        if sample.altitude > self.max_altitude.value {
            self.max_altitude = Extremum {
                value: sample.altitude,
                time: sample.time,
            };
        }

        if self.steps % self.stride == 0 {
            self.samples.push(sample);
        }
    }

    pub fn record_event(&mut self, time: f64, kind: EventKind) {
        self.events.push(FlightEvent { time, kind });
    }

    pub fn has_event(&self, kind: EventKind) -> bool {
        self.events.iter().any(|event| event.kind == kind)
    }

    pub fn record_liftoff(&mut self, time: f64) {
        if self.liftoff_time.is_none() {
            self.liftoff_time = Some(time);
            self.record_event(time, EventKind::Liftoff);
        }
    }

    pub fn record_rod_clearance(&mut self, time: f64, velocity: f64) {
        if self.rod_clearance.is_none() {
            self.rod_clearance = Some(RodClearance { time, velocity });
            self.record_event(time, EventKind::RodClearance);
        }
    }

    pub fn record_cutoff(&mut self, time: f64, altitude: f64, velocity: f64) {
        if self.cutoff.is_none() {
            self.cutoff = Some(Cutoff {
                time,
                altitude,
                velocity,
            });
        }
    }

    pub fn has_cutoff(&self) -> bool {
        self.cutoff.is_some()
    }

    pub fn rod_cleared(&self) -> bool {
        self.rod_clearance.is_some()
    }

    pub fn finish(
        mut self,
        last: TelemetrySample,
        termination: Termination,
        site: SiteSummary,
    ) -> Results {
        if self.samples.last() != Some(&last) {
            self.samples.push(last);
        }

        Results {
            samples: self.samples,
            events: self.events,
            max_altitude: self.max_altitude,
            max_velocity: self.max_velocity,
            max_acceleration: self.max_acceleration,
            min_acceleration: self.min_acceleration,
            rod_clearance: self.rod_clearance,
            cutoff: self.cutoff,
            liftoff_time: self.liftoff_time,
            termination,
            final_time: last.time,
            steps: self.steps,
            site,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, altitude: f64, velocity: f64, acceleration: f64) -> TelemetrySample {
        TelemetrySample {
            time,
            altitude,
            velocity,
            acceleration,
            thrust: 0.0,
            drag: 0.0,
            mass: 1.0,
            stage: 1,
            phase: FlightPhase::Coasting,
        }
    }

    fn site() -> SiteSummary {
        SiteSummary {
            altitude: 0.0,
            temperature: 288.15,
            barometer: 29.92,
            sea_level_density: 1.2256,
            sound_speed: 340.3,
        }
    }

    #[test]
    fn test_decimation_keeps_every_stride_sample() {
        let mut telemetry = Telemetry::new(3);
        for step in 1..=10 {
            telemetry.collect_data(sample(step as f64, 0.0, 0.0, 0.0));
        }

        let results = telemetry.finish(sample(10.0, 0.0, 0.0, 0.0), Termination::Apogee, site());
        let times: Vec<f64> = results.samples.iter().map(|s| s.time).collect();

        assert_eq!(times, vec![3.0, 6.0, 9.0, 10.0]);
        assert_eq!(results.steps, 10);
        assert_eq!(results.final_time, 10.0);
    }

    #[test]
    fn test_extrema_track_every_sample() {
        let mut telemetry = Telemetry::new(100);
        telemetry.collect_data(sample(0.1, 1.0, 5.0, 40.0));
        telemetry.collect_data(sample(0.2, 2.0, 9.0, 60.0));
        telemetry.collect_data(sample(0.3, 3.0, 8.0, -12.0));
        telemetry.collect_data(sample(0.4, 3.5, 2.0, -9.8));

        let last = sample(0.4, 3.5, 2.0, -9.8);
        let results = telemetry.finish(last, Termination::Apogee, site());

        assert_eq!(results.max_acceleration, Extremum { value: 60.0, time: 0.2 });
        assert_eq!(results.min_acceleration, Extremum { value: -12.0, time: 0.3 });
        assert_eq!(results.max_velocity, Extremum { value: 9.0, time: 0.2 });
        assert_eq!(results.max_altitude, Extremum { value: 3.5, time: 0.4 });
    }

    #[test]
    fn test_one_shot_events() {
        let mut telemetry = Telemetry::new(1);
        telemetry.record_liftoff(0.05);
        telemetry.record_liftoff(0.5);
        telemetry.record_rod_clearance(0.3, 12.0);
        telemetry.record_rod_clearance(0.4, 13.0);
        telemetry.record_cutoff(2.0, 40.0, 30.0);
        telemetry.record_cutoff(2.1, 42.0, 29.0);

        assert!(telemetry.rod_cleared());
        assert!(telemetry.has_cutoff());
        assert!(telemetry.has_event(EventKind::Liftoff));

        let results = telemetry.finish(sample(3.0, 50.0, 0.0, -9.8), Termination::Apogee, site());

        assert_eq!(results.liftoff_time, Some(0.05));
        assert_eq!(results.event_time(EventKind::Liftoff), Some(0.05));
        assert_eq!(
            results.rod_clearance,
            Some(RodClearance { time: 0.3, velocity: 12.0 })
        );
        assert_eq!(results.cutoff.map(|cutoff| cutoff.time), Some(2.0));
        assert_eq!(results.events.len(), 2);
    }
}
