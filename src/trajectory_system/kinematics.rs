use log::{debug, info};
use serde::Serialize;

use super::aerodynamics::{drag_divergence, drag_force};
use crate::constants::GRAVITY;
use crate::control::{environment::Environment, flight::Flight, structure::Structure};
use crate::errors::SimulationError;
use crate::telemetry_system::telemetry::{
    EventKind, Results, SiteSummary, Telemetry, TelemetrySample, Termination,
};

#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize)]
pub enum FlightPhase {
    OnPad,
    PoweredFlight { stage: usize },
    Coasting,
    Apogee,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematics {
    pub time: f64,
    pub altitude: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub previous_velocity: f64,
}

impl Kinematics {
    pub fn update(&mut self, acceleration: f64, delta_time: f64) {
        self.acceleration = acceleration;
        self.previous_velocity = self.velocity;
        self.velocity += acceleration * delta_time;
        self.altitude += self.velocity * delta_time;
    }

    pub fn average_velocity(&self) -> f64 {
        (self.previous_velocity + self.velocity) / 2.0
    }

    pub fn hold_on_pad(&mut self) {
        self.altitude = 0.0;
        self.velocity = 0.0;
        self.acceleration = 0.0;
    }
}

/// Runs one flight from ignition to apogee (or the coast limit).
pub fn simulate(flight: &Flight) -> Result<Results, SimulationError> {
    flight.validate()?;
    let environment = Environment::new(&flight.site, flight.options.atmosphere)?;
    let structure = Structure::new(&flight.rocket, &flight.engines);

    info!(
        "simulating {} ({} stage(s), {:.3} kg at launch)",
        flight.rocket.name,
        structure.stage_count(),
        structure.get_total_mass()
    );

    let results = Integrator::new(flight, &environment, &structure).run()?;

    info!(
        "{}: peak altitude {:.2} m at {:.3} s, {:?} after {} steps",
        flight.rocket.name,
        results.max_altitude.value,
        results.max_altitude.time,
        results.termination,
        results.steps
    );

    Ok(results)
}

struct Integrator<'a> {
    flight: &'a Flight,
    environment: &'a Environment,
    structure: &'a Structure,
    kinematics: Kinematics,
    telemetry: Telemetry,
    phase: FlightPhase,
    stage: usize,
    mass: f64,
    delivered_impulse: f64,
    drag_constant: f64,
    sound_speed: f64,
    launched: bool,
    coast_time: f64,
    burnout_logged: Vec<bool>,
}

impl<'a> Integrator<'a> {
    fn new(flight: &'a Flight, environment: &'a Environment, structure: &'a Structure) -> Self {
        Integrator {
            flight,
            environment,
            structure,
            kinematics: Kinematics::default(),
            telemetry: Telemetry::new(flight.options.sample_stride()),
            phase: FlightPhase::OnPad,
            stage: 0,
            mass: structure.mass_from(0),
            delivered_impulse: 0.0,
            drag_constant: structure.drag_constant(0),
            sound_speed: environment.site_sound_speed(),
            launched: false,
            coast_time: 0.0,
            burnout_logged: vec![false; structure.stage_count()],
        }
    }

    fn run(mut self) -> Result<Results, SimulationError> {
        let delta_time = self.flight.options.time_step;
        let last_stage = self.structure.stage_count() - 1;
        let final_burnout = self.structure.windows[last_stage].end_burn;
        let nose = self.flight.rocket.nose.form();
        let mut steps: u64 = 0;

        self.record_initial_sample();

        loop {
            steps += 1;
            if steps > self.flight.options.max_steps {
                return Err(SimulationError::NonConvergence(format!(
                    "no apogee within {} steps ({:.3} s)",
                    self.flight.options.max_steps, self.kinematics.time
                )));
            }

            let density = self.environment.density(self.kinematics.altitude);
            if self.flight.options.temperature_correction {
                self.sound_speed = self.environment.sound_speed(self.kinematics.altitude);
            }

            self.kinematics.time += delta_time;
            let time = self.kinematics.time;

            if time > self.structure.windows[self.stage].end_stage && self.stage < last_stage {
                self.separate_stage();
            }

            let window = self.structure.windows[self.stage];
            let thrust = if window.is_burning(time) {
                self.burn(time - window.start_burn, delta_time)
            } else {
                if time > window.end_burn {
                    self.note_burnout(self.stage);
                }
                if self.stage == last_stage && !self.telemetry.has_cutoff() {
                    self.telemetry.record_cutoff(
                        time,
                        self.kinematics.altitude,
                        self.kinematics.velocity,
                    );
                }
                0.0
            };

            if !(self.mass > 0.0) {
                return Err(SimulationError::NumericError(format!(
                    "non-positive mass {} kg at {:.3} s",
                    self.mass, time
                )));
            }

            let divergence = drag_divergence(nose, self.sound_speed, self.kinematics.velocity);
            let drag_magnitude = drag_force(
                density,
                self.drag_constant,
                divergence,
                self.kinematics.average_velocity(),
            );

            // Falling: drag turns around and gravity alone pulls against it.
            let descending = self.launched && self.kinematics.velocity <= 0.0;
            let (drag, acceleration) = if descending {
                (drag_magnitude, drag_magnitude / self.mass - GRAVITY)
            } else {
                (
                    -drag_magnitude,
                    (thrust - drag_magnitude) / self.mass - GRAVITY,
                )
            };

            if !acceleration.is_finite() {
                return Err(SimulationError::NumericError(format!(
                    "acceleration diverged at {:.3} s",
                    time
                )));
            }

            self.kinematics.update(acceleration, delta_time);

            let mut terminal = None;
            if self.kinematics.velocity > 0.0 {
                if !self.launched {
                    self.launched = true;
                    self.telemetry.record_liftoff(time);
                    debug!("liftoff at {:.3} s", time);
                }
            } else if !self.launched {
                if self.kinematics.velocity < 0.0 {
                    self.kinematics.hold_on_pad();
                }
                if time > final_burnout {
                    return Err(SimulationError::NonConvergence(format!(
                        "{} never left the pad: thrust never exceeded weight",
                        self.flight.rocket.name
                    )));
                }
            } else {
                if !self.telemetry.has_event(EventKind::Apogee) {
                    self.telemetry.record_event(time, EventKind::Apogee);
                    debug!(
                        "apogee at {:.3} s, {:.2} m",
                        time, self.kinematics.altitude
                    );
                }
                self.coast_time += delta_time;

                if self.kinematics.altitude <= 0.0 {
                    terminal = Some(Termination::GroundImpact);
                } else if self.coast_time > self.flight.coast_time {
                    terminal = Some(if self.flight.coast_time > 0.0 {
                        Termination::CoastLimit
                    } else {
                        Termination::Apogee
                    });
                }
            }

            if self.launched
                && !self.telemetry.rod_cleared()
                && self.kinematics.altitude > self.flight.rod_length
                && self.kinematics.velocity > 0.0
            {
                self.telemetry
                    .record_rod_clearance(time, self.kinematics.velocity);
                debug!(
                    "cleared the rod at {:.3} s, {:.2} m/s",
                    time, self.kinematics.velocity
                );
            }

            self.update_phase(thrust, terminal.is_some());

            let sample = TelemetrySample {
                time,
                altitude: self.kinematics.altitude,
                velocity: self.kinematics.velocity,
                acceleration: self.kinematics.acceleration,
                thrust,
                drag,
                mass: self.mass,
                stage: self.stage + 1,
                phase: self.phase,
            };
            self.telemetry.collect_data(sample);

            if let Some(termination) = terminal {
                return Ok(self.telemetry.finish(
                    sample,
                    termination,
                    SiteSummary::from(self.environment),
                ));
            }
        }
    }

    fn record_initial_sample(&mut self) {
        let count = self.flight.rocket.stages[0].engine_count as f64;
        let thrust = self.flight.engines[0].thrust_at(0.0) * count;
        let acceleration = if thrust != 0.0 {
            thrust / self.mass - GRAVITY
        } else {
            0.0
        };

        self.telemetry.record_event(0.0, EventKind::Ignition { stage: 1 });
        self.telemetry.record_initial(TelemetrySample {
            time: 0.0,
            altitude: 0.0,
            velocity: 0.0,
            acceleration,
            thrust,
            drag: 0.0,
            mass: self.mass,
            stage: 1,
            phase: FlightPhase::OnPad,
        });
    }

    fn burn(&mut self, elapsed: f64, delta_time: f64) -> f64 {
        let engine = &self.flight.engines[self.stage];
        let count = self.flight.rocket.stages[self.stage].engine_count as f64;

        let thrust = engine.thrust_at(elapsed) * count;
        self.delivered_impulse += thrust * delta_time;

        let consumed = engine.consumed_mass(
            self.flight.options.propellant_model,
            self.delivered_impulse / count,
            elapsed,
        ) * count;
        self.mass = self.structure.mass_from(self.stage) - consumed;

        thrust
    }

    fn separate_stage(&mut self) {
        let spent = self.stage;
        self.note_burnout(spent);
        self.telemetry.record_event(
            self.structure.windows[spent].end_stage,
            EventKind::Separation { stage: spent + 1 },
        );

        self.stage += 1;
        self.mass = self.structure.mass_from(self.stage);
        self.delivered_impulse = 0.0;
        self.drag_constant = self.structure.drag_constant(self.stage);

        let ignition = self.structure.windows[self.stage].start_burn;
        self.telemetry.record_event(
            ignition,
            EventKind::Ignition {
                stage: self.stage + 1,
            },
        );
        debug!(
            "stage {} dropped, stage {} ignites at {:.3} s ({:.3} kg remaining)",
            spent + 1,
            self.stage + 1,
            ignition,
            self.mass
        );
    }

    fn note_burnout(&mut self, stage: usize) {
        if !self.burnout_logged[stage] {
            self.burnout_logged[stage] = true;
            let time = self.structure.windows[stage].end_burn;
            self.telemetry
                .record_event(time, EventKind::Burnout { stage: stage + 1 });
            debug!("stage {} burnout at {:.3} s", stage + 1, time);
        }
    }

    fn update_phase(&mut self, thrust: f64, terminal: bool) {
        let phase = if terminal {
            FlightPhase::Apogee
        } else if !self.launched {
            FlightPhase::OnPad
        } else if thrust > 0.0 {
            FlightPhase::PoweredFlight {
                stage: self.stage + 1,
            }
        } else {
            FlightPhase::Coasting
        };

        if phase != self.phase {
            debug!(
                "{:?} -> {:?} at {:.3} s",
                self.phase, phase, self.kinematics.time
            );
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::environment::AtmosphereModel;
    use crate::control::flight::SimulationOptions;
    use crate::control::launch_stages::Stage;
    use crate::control::propulsion::{Engine, ThrustCurve};
    use crate::control::rocket::{NoseShape, Rocket};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn create_test_engine(code: &str, thrust: f64, burn: f64, propellant: f64) -> Engine {
        let curve =
            ThrustCurve::from_pairs(&[(0.0, thrust), (burn, thrust), (burn + 0.001, 0.0)])
                .unwrap();
        Engine::new(code, propellant, propellant + 0.02, curve).unwrap()
    }

    fn create_ballistic_flight() -> Flight {
        // 0.98 kg airframe + 0.02 kg motor case; the motor carries no propellant.
        let engine = create_test_engine("T20", GRAVITY + 10.0, 2.0, 0.0);
        let rocket = Rocket::new(
            "Ballistic",
            NoseShape::Ogive,
            vec![Stage::new(1, 0.98, 0.03).with_drag_coefficient(0.0)],
        );
        Flight::new(rocket, vec![engine])
    }

    fn create_two_stage_flight() -> Flight {
        let booster = create_test_engine("B40", 40.0, 1.0, 0.02);
        let sustainer = create_test_engine("S20", 20.0, 1.5, 0.015);
        let rocket = Rocket::new(
            "Two Step",
            NoseShape::Ogive,
            vec![
                Stage::new(1, 0.3, 0.04).with_delay(0.5),
                Stage::new(2, 0.2, 0.03),
            ],
        );
        Flight::new(rocket, vec![booster, sustainer])
    }

    #[test]
    fn test_euler_update() {
        let mut kinematics = Kinematics::default();
        kinematics.update(10.0, 0.5);

        assert_eq!(kinematics.velocity, 5.0);
        assert_eq!(kinematics.altitude, 2.5);
        assert_eq!(kinematics.average_velocity(), 2.5);
    }

    #[test]
    fn test_zero_drag_matches_closed_form() {
        let results = simulate(&create_ballistic_flight()).unwrap();

        // a = 10 m/s² for 2 s, then a ballistic coast.
        let burnout_velocity = 20.0;
        let expected_apogee = 20.0 + burnout_velocity * burnout_velocity / (2.0 * GRAVITY);

        let cutoff = results.cutoff.unwrap();
        assert_abs_diff_eq!(cutoff.velocity, burnout_velocity, epsilon = 0.1);
        assert_abs_diff_eq!(cutoff.altitude, 20.0, epsilon = 0.1);
        assert_abs_diff_eq!(results.max_altitude.value, expected_apogee, epsilon = 0.2);
        assert_abs_diff_eq!(
            results.max_altitude.time,
            2.0 + burnout_velocity / GRAVITY,
            epsilon = 0.01
        );
        assert_abs_diff_eq!(results.max_acceleration.value, 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(results.min_acceleration.value, -GRAVITY, epsilon = 1e-6);
    }

    #[test]
    fn test_stage_ignition_follows_burn_and_delay() {
        let flight = create_two_stage_flight();
        let results = simulate(&flight).unwrap();

        let expected = flight.engines[0].burn_time() + flight.rocket.stages[0].delay;
        assert_eq!(results.ignition_time(1), Some(0.0));
        assert_eq!(results.ignition_time(2), Some(expected));
        assert_eq!(
            results.event_time(EventKind::Burnout { stage: 1 }),
            Some(flight.engines[0].burn_time())
        );
        assert!(results
            .samples
            .iter()
            .any(|sample| sample.stage == 2 && sample.thrust > 0.0));
    }

    #[test]
    fn test_coast_zero_stops_at_first_descent() {
        let results = simulate(&create_ballistic_flight()).unwrap();
        let last = results.final_sample().unwrap();

        assert_eq!(results.termination, Termination::Apogee);
        assert!(last.velocity <= 0.0);
        assert_eq!(results.apogee_time(), Some(last.time));
        assert_eq!(last.phase, FlightPhase::Apogee);
    }

    #[test]
    fn test_coast_limit_extends_the_run() {
        let base = simulate(&create_ballistic_flight()).unwrap();
        let extended = simulate(&create_ballistic_flight().with_coast_time(1.5)).unwrap();

        assert_eq!(extended.termination, Termination::CoastLimit);
        assert_eq!(extended.apogee_time(), base.apogee_time());
        assert_relative_eq!(
            extended.final_time,
            base.apogee_time().unwrap() + 1.5,
            epsilon = 0.002
        );
        assert!(extended.final_sample().unwrap().altitude < base.max_altitude.value);
    }

    #[test]
    fn test_long_coast_ends_at_ground() {
        let results = simulate(&create_ballistic_flight().with_coast_time(1000.0)).unwrap();

        assert_eq!(results.termination, Termination::GroundImpact);
        assert!(results.final_sample().unwrap().altitude <= 0.0);
    }

    #[test]
    fn test_underpowered_rocket_never_converges() {
        let engine = create_test_engine("W1", 1.0, 1.0, 0.01);
        let rocket = Rocket::new(
            "Brick",
            NoseShape::Blunt,
            vec![Stage::new(1, 2.0, 0.05)],
        );
        let result = simulate(&Flight::new(rocket, vec![engine]));

        assert!(matches!(result, Err(SimulationError::NonConvergence(_))));
    }

    #[test]
    fn test_step_ceiling_is_reported() {
        let options = SimulationOptions {
            max_steps: 500,
            ..SimulationOptions::default()
        };
        let result = simulate(&create_ballistic_flight().with_options(options));

        assert!(matches!(result, Err(SimulationError::NonConvergence(_))));
    }

    #[test]
    fn test_invalid_configuration_is_rejected_up_front() {
        let mut flight = create_two_stage_flight();
        flight.engines.pop();

        assert!(matches!(
            simulate(&flight),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_rod_clearance_and_liftoff() {
        let flight = create_ballistic_flight().with_rod_length(1.0);
        let results = simulate(&flight).unwrap();

        let rod = results.rod_clearance.unwrap();
        assert!(results.liftoff_time.unwrap() < rod.time);
        assert_abs_diff_eq!(rod.velocity, (2.0 * 10.0 * 1.0f64).sqrt(), epsilon = 0.05);
    }

    #[test]
    fn test_samples_are_decimated() {
        let results = simulate(&create_ballistic_flight()).unwrap();

        assert_eq!(results.samples[0].time, 0.0);
        assert_abs_diff_eq!(results.samples[1].time, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(results.samples[2].time, 0.2, epsilon = 1e-9);
        assert!(results.samples.len() < results.steps as usize / 50);
    }

    #[test]
    fn test_propellant_burns_off() {
        let flight = create_two_stage_flight();
        let results = simulate(&flight).unwrap();
        let structure = Structure::new(&flight.rocket, &flight.engines);

        let sustainer_dry = structure.mass_from(1) - flight.engines[1].propellant_mass;
        assert_abs_diff_eq!(
            results.final_sample().unwrap().mass,
            sustainer_dry,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_atmosphere_model_shapes_high_flights() {
        let engine = create_test_engine("H1000", 1000.0, 3.0, 0.0);
        let rocket = Rocket::new(
            "Sounding",
            NoseShape::Ogive,
            vec![Stage::new(1, 0.98, 0.03).with_drag_coefficient(0.01)],
        );
        let historical = Flight::new(rocket, vec![engine]);
        let corrected = historical.clone().with_options(SimulationOptions {
            atmosphere: AtmosphereModel::Corrected,
            ..SimulationOptions::default()
        });

        let historical = simulate(&historical).unwrap();
        let corrected = simulate(&corrected).unwrap();

        assert!(historical.max_altitude.value > 20_000.0);
        assert!(corrected.max_altitude.value > 20_000.0);
        assert!(historical.max_altitude.value != corrected.max_altitude.value);
    }
}
