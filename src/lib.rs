pub mod constants;
pub mod control;
pub mod errors;
pub mod input_system;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use constants::*;
pub use control::environment::{AtmosphereModel, Environment, LaunchSite};
pub use control::flight::{Flight, SimulationOptions};
pub use control::launch_stages::{Fins, Stage};
pub use control::propulsion::{Engine, PropellantModel, ThrustCurve, ThrustSample};
pub use control::rocket::{NoseForm, NoseShape, Rocket};
pub use control::structure::Structure;
pub use errors::{InputError, SimulationError};

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::drag_divergence;
pub use trajectory_system::kinematics::{simulate, FlightPhase};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::report::{write_csv, write_report};
pub use telemetry_system::telemetry::{EventKind, Results, Termination};

// Re-export the input collaborators
pub use input_system::batch::{run_script, Action, BatchConfig};
pub use input_system::motor_file::MotorCatalog;
pub use utils::units::UnitKind;
