use crate::control::rocket::NoseForm;

/// Transonic drag-rise multiplier applied to the subsonic drag coefficient.
pub fn drag_divergence(form: NoseForm, sound_speed: f64, velocity: f64) -> f64 {
    if !(sound_speed > 0.0) {
        return 1.0;
    }

    let mach = velocity / sound_speed;

    if mach <= 0.9 {
        return 1.0;
    }

    match form {
        NoseForm::Round => {
            if mach <= 1.2 {
                1.0 + 4.88 * (mach - 0.9).powf(1.1)
            } else if mach < 2.0 {
                2.0 + 0.30 * (-5.75 * (mach - 1.2)).exp()
            } else {
                2.0
            }
        }
        NoseForm::Sharp => {
            if mach <= 1.05 {
                let excess = mach - 0.9;
                1.0 + 35.5 * excess * excess
            } else if mach < 2.0 {
                1.27 + 0.53 * (-5.2 * (mach - 1.05)).exp()
            } else {
                1.27
            }
        }
    }
}

// Drag force magnitude in N for `velocity` in m/s.
pub fn drag_force(density: f64, drag_constant: f64, divergence: f64, velocity: f64) -> f64 {
    density * drag_constant * divergence * velocity * velocity
}
