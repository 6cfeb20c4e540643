use crate::errors::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Mass,
    Length,
    Temperature,
    Pressure,
    Time,
    Angle,
}

// (name, factor to SI, display label)
type UnitEntry = (&'static str, f64, &'static str);

const MASS_UNITS: &[UnitEntry] = &[
    ("none", 1.0, "kg"),
    ("kilogram", 1.0, "kg"),
    ("kg", 1.0, "kg"),
    ("gram", 0.001, "gm"),
    ("gm", 0.001, "gm"),
    ("g", 0.001, "gm"),
    ("pound", 0.45359237, "lb"),
    ("lb", 0.45359237, "lb"),
    ("ounce", 0.028349523, "oz"),
    ("oz", 0.028349523, "oz"),
];

const LENGTH_UNITS: &[UnitEntry] = &[
    ("none", 1.0, "m"),
    ("meter", 1.0, "m"),
    ("m", 1.0, "m"),
    ("decimeter", 0.1, "dm"),
    ("dm", 0.1, "dm"),
    ("centimeter", 0.01, "cm"),
    ("cm", 0.01, "cm"),
    ("millimeter", 0.001, "mm"),
    ("mm", 0.001, "mm"),
    ("feet", 0.3048, "ft"),
    ("foot", 0.3048, "ft"),
    ("ft", 0.3048, "ft"),
    ("inch", 0.0254, "in"),
    ("inche", 0.0254, "in"),
    ("in", 0.0254, "in"),
];

// Temperatures are offsets, not factors; see `temperature_to_si`.
const TEMPERATURE_UNITS: &[UnitEntry] = &[
    ("none", 1.0, "K"),
    ("kelvin", 1.0, "K"),
    ("k", 1.0, "K"),
    ("fahrenheit", 1.0, "F"),
    ("farenheit", 1.0, "F"),
    ("f", 1.0, "F"),
    ("celsius", 1.0, "C"),
    ("celcius", 1.0, "C"),
    ("centigrade", 1.0, "C"),
    ("c", 1.0, "C"),
    ("rankine", 1.0, "R"),
    ("r", 1.0, "R"),
];

const PRESSURE_UNITS: &[UnitEntry] = &[
    ("none", 1.0, "Pa"),
    ("pascal", 1.0, "Pa"),
    ("pa", 1.0, "Pa"),
    ("inch-mercury", 3386.386725364, "inHg"),
    ("inches-mercury", 3386.386725364, "inHg"),
    ("ins-hg", 3386.386725364, "inHg"),
    ("in-hg", 3386.386725364, "inHg"),
    ("inhg", 3386.386725364, "inHg"),
    ("inmercury", 3386.386725364, "inHg"),
    ("millimeter", 133.3223120222, "mmHg"),
    ("mm-hg", 133.3223120222, "mmHg"),
    ("mmhg", 133.3223120222, "mmHg"),
    ("mm", 133.3223120222, "mmHg"),
    ("torr", 133.3223120222, "mmHg"),
    ("millibar", 100.0, "mb"),
    ("mbar", 100.0, "mb"),
    ("mb", 100.0, "mb"),
    ("kilopascal", 1000.0, "kPa"),
    ("kpa", 1000.0, "kPa"),
    ("pound", 6894.744825494, "psi"),
    ("psi", 6894.744825494, "psi"),
    ("lb", 6894.744825494, "psi"),
];

const TIME_UNITS: &[UnitEntry] = &[
    ("none", 1.0, "sec"),
    ("second", 1.0, "sec"),
    ("sec", 1.0, "sec"),
    ("s", 1.0, "sec"),
    ("millisecond", 0.001, "msec"),
    ("msec", 0.001, "msec"),
    ("ms", 0.001, "msec"),
    ("microsecond", 0.000001, "usec"),
    ("usec", 0.000001, "usec"),
    ("us", 0.000001, "usec"),
    ("minute", 60.0, "min"),
    ("min", 60.0, "min"),
    ("hour", 3600.0, "hr"),
    ("hr", 3600.0, "hr"),
];

const ANGLE_UNITS: &[UnitEntry] = &[
    ("none", 1.0, "rad"),
    ("radian", 1.0, "rad"),
    ("rad", 1.0, "rad"),
    ("degree", 0.01745329251994, "deg"),
    ("deg", 0.01745329251994, "deg"),
    ("gradian", 0.01570796326795, "grad"),
    ("grad", 0.01570796326795, "grad"),
];

impl UnitKind {
    pub fn name(&self) -> &'static str {
        match self {
            UnitKind::Mass => "mass",
            UnitKind::Length => "length",
            UnitKind::Temperature => "temperature",
            UnitKind::Pressure => "pressure",
            UnitKind::Time => "time",
            UnitKind::Angle => "angle",
        }
    }

    fn table(&self) -> &'static [UnitEntry] {
        match self {
            UnitKind::Mass => MASS_UNITS,
            UnitKind::Length => LENGTH_UNITS,
            UnitKind::Temperature => TEMPERATURE_UNITS,
            UnitKind::Pressure => PRESSURE_UNITS,
            UnitKind::Time => TIME_UNITS,
            UnitKind::Angle => ANGLE_UNITS,
        }
    }

    fn lookup(&self, unit: &str) -> Result<(f64, &'static str), InputError> {
        let unit = unit.trim().to_ascii_lowercase();
        let find = |name: &str| {
            self.table()
                .iter()
                .find(|entry| entry.0 == name)
                .map(|entry| (entry.1, entry.2))
        };

        find(&unit)
            .or_else(|| unit.strip_suffix('s').and_then(find))
            .ok_or_else(|| InputError::UnknownUnit {
                kind: self.name().to_string(),
                unit,
            })
    }
}

pub fn to_si(kind: UnitKind, value: f64, unit: &str) -> Result<f64, InputError> {
    let (factor, label) = kind.lookup(unit)?;

    Ok(match kind {
        UnitKind::Temperature => match label {
            "F" => 273.15 + (value - 32.0) * 5.0 / 9.0,
            "C" => 273.15 + value,
            "R" => value * 5.0 / 9.0,
            _ => value,
        },
        _ => value * factor,
    })
}

pub fn from_si(kind: UnitKind, value: f64, unit: &str) -> Result<f64, InputError> {
    let (factor, label) = kind.lookup(unit)?;

    Ok(match kind {
        UnitKind::Temperature => match label {
            "F" => (value - 273.15) * 9.0 / 5.0 + 32.0,
            "C" => value - 273.15,
            "R" => value * 9.0 / 5.0,
            _ => value,
        },
        _ => value / factor,
    })
}

pub fn unit_label(kind: UnitKind, unit: &str) -> Result<&'static str, InputError> {
    kind.lookup(unit).map(|(_, label)| label)
}
