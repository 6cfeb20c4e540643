pub mod batch;
pub mod motor_file;
