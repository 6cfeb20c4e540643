use serde::Serialize;

use crate::constants::{
    DENSITY_EXPONENT, DENSITY_LAPSE, GAS_CONST_AIR, HISTORICAL_TROPOPAUSE_ALTITUDE, IN2PASCAL,
    M2FT, MACH_CONST, SPACE_ALTITUDE, STD_ATM, STD_TEMPERATURE, STRATOSPHERE_DECAY,
    STRATOSPHERE_DENSITY, TROPOPAUSE_ALTITUDE,
};
use crate::errors::SimulationError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchSite {
    pub altitude: f64,    // m above sea level
    pub temperature: f64, // K
    pub pressure: Option<f64>, // Pa; inferred from altitude when absent
}

impl Default for LaunchSite {
    fn default() -> Self {
        LaunchSite {
            altitude: 0.0,
            temperature: STD_TEMPERATURE,
            pressure: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AtmosphereModel {
    // Published figures: 36 093 · M2FT tropopause, 228.65 K anchor for 32-47 km.
    #[default]
    Historical,
    // Tropopause at 36 093 ft and a continuous ISA profile.
    Corrected,
}

impl AtmosphereModel {
    pub fn tropopause(&self) -> f64 {
        match self {
            AtmosphereModel::Historical => HISTORICAL_TROPOPAUSE_ALTITUDE,
            AtmosphereModel::Corrected => TROPOPAUSE_ALTITUDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub site_altitude: f64,
    pub base_temperature: f64,
    pub barometer: f64, // inHg
    pub sea_level_density: f64,
    pub model: AtmosphereModel,
}

impl Environment {
    pub fn new(site: &LaunchSite, model: AtmosphereModel) -> Result<Self, SimulationError> {
        if !(site.temperature > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "site temperature must be positive, got {} K",
                site.temperature
            )));
        }

        let barometer = match site.pressure {
            Some(pressure) => pressure / IN2PASCAL,
            None => standard_barometer(site.altitude),
        };

        if !(barometer > 0.0) || !barometer.is_finite() {
            return Err(SimulationError::ConfigurationError(format!(
                "site pressure must be positive, got {:.4} inHg",
                barometer
            )));
        }

        Ok(Environment {
            site_altitude: site.altitude,
            base_temperature: site.temperature,
            barometer,
            sea_level_density: (barometer * IN2PASCAL) / (GAS_CONST_AIR * site.temperature),
            model,
        })
    }

    pub fn density(&self, altitude: f64) -> f64 {
        if altitude > SPACE_ALTITUDE {
            0.0
        } else if altitude > self.model.tropopause() {
            STRATOSPHERE_DENSITY * (-STRATOSPHERE_DECAY * altitude).exp()
        } else {
            self.sea_level_density * (1.0 - altitude * DENSITY_LAPSE).powf(DENSITY_EXPONENT)
        }
    }

    pub fn temperature(&self, altitude: f64) -> f64 {
        isa_temperature(self.base_temperature, altitude, self.model)
    }

    pub fn sound_speed(&self, altitude: f64) -> f64 {
        (MACH_CONST * self.temperature(altitude)).sqrt()
    }

    pub fn site_sound_speed(&self) -> f64 {
        (MACH_CONST * self.base_temperature).sqrt()
    }
}

pub fn standard_barometer(site_altitude: f64) -> f64 {
    let ratio = 1.0 - (0.00000688 * site_altitude * M2FT);
    STD_ATM * (5.256 * ratio.ln()).exp()
}

pub fn isa_temperature(base_temperature: f64, altitude: f64, model: AtmosphereModel) -> f64 {
    let upper_stratosphere = match model {
        AtmosphereModel::Historical => 228.65,
        AtmosphereModel::Corrected => 270.65,
    };

    let temperature = if altitude <= 11_000.0 {
        base_temperature - altitude * 0.0065
    } else if altitude <= 20_000.0 {
        216.65
    } else if altitude <= 32_000.0 {
        228.65 + (altitude - 32_000.0) * 0.0010
    } else if altitude <= 47_000.0 {
        upper_stratosphere + (altitude - 47_000.0) * 0.0028
    } else if altitude <= 51_000.0 {
        270.65
    } else if altitude <= 71_000.0 {
        214.65 - (altitude - 71_000.0) * 0.0028
    } else if altitude <= 84_852.0 {
        186.95 - (altitude - 84_852.0) * 0.0020
    } else {
        186.95
    };

    temperature.max(0.0)
}
