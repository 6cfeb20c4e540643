// Physical Constants
pub const GRAVITY: f64 = 9.806650; // m/s²
pub const GAMMA: f64 = 1.40109; // specific heat ratio of air
pub const GAS_CONST_AIR: f64 = 286.90124; // J/(kg⋅K)
pub const MACH_CONST: f64 = GAMMA * GAS_CONST_AIR;

// Unit Conversions
pub const IN2M: f64 = 0.0254;
pub const M2FT: f64 = 3.280840;
pub const OZ2KG: f64 = 0.028349523;
pub const IN2PASCAL: f64 = 3386.39; // Pa per inch of mercury

// Environmental Constants
pub const STD_ATM: f64 = 29.92; // inHg
pub const STD_TEMPERATURE: f64 = 288.15; // K (59 °F)
pub const TROPOPAUSE_ALTITUDE: f64 = 36_093.0 / M2FT; // m
pub const HISTORICAL_TROPOPAUSE_ALTITUDE: f64 = 36_093.0 * M2FT; // m, above SPACE_ALTITUDE
pub const SPACE_ALTITUDE: f64 = 43_610.0; // m, density is zero above
pub const DENSITY_LAPSE: f64 = 2.2566e-5; // 1/m
pub const DENSITY_EXPONENT: f64 = 4.255;
pub const STRATOSPHERE_DENSITY: f64 = 1.9788; // kg/m³
pub const STRATOSPHERE_DECAY: f64 = 1.5757e-4; // 1/m

// Simulation Parameters
pub const TIME_STEP: f64 = 0.001; // s
pub const SAMPLE_INTERVAL: f64 = 0.1; // s
pub const MAX_STEPS: u64 = 10_000_000;
pub const MAX_STAGES: usize = 5;

// Launch Defaults
pub const DEFAULT_ROD_LENGTH: f64 = 60.0 * IN2M; // m
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 0.75;
