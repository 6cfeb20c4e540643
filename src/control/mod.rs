pub mod environment;
pub mod flight;
pub mod launch_stages;
pub mod propulsion;
pub mod rocket;
pub mod structure;
