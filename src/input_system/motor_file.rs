use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::control::propulsion::{Engine, ThrustCurve, ThrustSample};
use crate::errors::InputError;

#[derive(Debug, Clone, Default)]
pub struct MotorCatalog {
    motors: Vec<Engine>,
}

impl MotorCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let catalog = Self::parse(&text)?;
        debug!("loaded {} motors from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn parse(text: &str) -> Result<Self, InputError> {
        Ok(MotorCatalog {
            motors: parse_motors(text)?,
        })
    }

    pub fn motors(&self) -> &[Engine] {
        &self.motors
    }

    pub fn len(&self) -> usize {
        self.motors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }

    pub fn find(&self, code: &str) -> Result<&Engine, InputError> {
        let wanted = code.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return Err(InputError::MotorNotFound(code.to_string()));
        }

        self.motors
            .iter()
            .find(|engine| engine.code.to_ascii_lowercase() == wanted)
            .or_else(|| {
                self.motors
                    .iter()
                    .find(|engine| engine.code.to_ascii_lowercase().starts_with(&wanted))
            })
            .ok_or_else(|| InputError::MotorNotFound(code.to_string()))
    }

    pub fn write_listing<W: Write>(&self, writer: &mut W, csv: bool) -> io::Result<()> {
        if csv {
            writeln!(
                writer,
                "\"Desig\",\"Mfg\",\"Impulse (Nsec)\",\"Avg Thrust (N)\",\"Burn (sec)\",\
                 \"Peak Thrust (N)\",\"Motor Mass (Kg)\",\"Pro Mass (Kg)\",\"D x L\",\"Delays\""
            )?;
        } else {
            writeln!(
                writer,
                "{:<9} {:<5}  {:>6} {:>6} {:>5}  {:>6}  {:>6}  {:>6}",
                "", "", "Total", "Avg", "Burn", "Peak", "Motor", "Pro"
            )?;
            writeln!(
                writer,
                "{:<9} {:<5} {:>7} {:>6} {:>5}  {:>6}  {:>6}  {:>6}",
                " Motor", "Motor", "Impulse", "Thrust", "Time", "Thrust", "Mass", "Mass"
            )?;
            writeln!(
                writer,
                "{:<9} {:<5}  {:>6} {:>6} {:>5}  {:>6}  {:>6}  {:>6} D x L  Delays",
                " Desig", "Mfg", "(Nsec)", "(N)", "(sec)", "(N)", "(Kg)", "(Kg)"
            )?;
            writeln!(
                writer,
                "{:<9} {:<5} {:>7} {:>6} {:>5}  {:>6}  {:>6}  {:>6} =================",
                "=========", "=====", "=======", "======", "=====", "======", "======", "======"
            )?;
        }

        for engine in &self.motors {
            if csv {
                writeln!(writer, "{}", catalog_csv_line(engine))?;
            } else {
                writeln!(writer, "{}", catalog_line(engine))?;
            }
        }

        Ok(())
    }
}

pub fn catalog_line(engine: &Engine) -> String {
    let mut line = format!(
        "{:<9} {:<5}  {:>6} {:>6} {:>5.2}  {:>6}  {:>6}  {:>6} {}x{}",
        engine.code,
        short_manufacturer(engine),
        force_figure(engine.total_impulse()),
        force_figure(engine.average_thrust()),
        engine.burn_time(),
        force_figure(engine.peak_thrust()),
        mass_figure(engine.total_mass),
        mass_figure(engine.propellant_mass),
        engine.diameter.round(),
        engine.length.round()
    );

    if !engine.delays.is_empty() {
        line.push(' ');
        line.push_str(&delay_list(&engine.delays));
    }
    line
}

fn catalog_csv_line(engine: &Engine) -> String {
    format!(
        "\"{}\",\"{}\",{},{},{:.2},{},{},{},\"{}x{}\",\"{}\"",
        engine.code,
        short_manufacturer(engine),
        force_figure(engine.total_impulse()).trim(),
        force_figure(engine.average_thrust()).trim(),
        engine.burn_time(),
        force_figure(engine.peak_thrust()).trim(),
        mass_figure(engine.total_mass).trim(),
        mass_figure(engine.propellant_mass).trim(),
        engine.diameter.round(),
        engine.length.round(),
        delay_list(&engine.delays)
    )
}

fn short_manufacturer(engine: &Engine) -> String {
    engine.manufacturer.chars().take(5).collect()
}

fn delay_list(delays: &[u32]) -> String {
    delays
        .iter()
        .map(|delay| delay.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

// Fewer decimals as the figure grows, always six columns wide.
fn force_figure(value: f64) -> String {
    if value >= 1000.0 {
        format!("{:6.0}", value)
    } else if value >= 100.0 {
        format!("{:6.1}", value)
    } else if value >= 10.0 {
        format!("{:6.2}", value)
    } else {
        format!("{:6.3}", value)
    }
}

fn mass_figure(value: f64) -> String {
    if value >= 100.0 {
        format!("{:6.2}", value)
    } else if value >= 10.0 {
        format!("{:6.3}", value)
    } else {
        format!("{:6.4}", value)
    }
}

struct MotorHeader {
    line: usize,
    code: String,
    diameter: f64,
    length: f64,
    delays: Vec<u32>,
    propellant_mass: f64,
    total_mass: f64,
    manufacturer: String,
}

// Parses every motor in an `.eng` file.
pub fn parse_motors(text: &str) -> Result<Vec<Engine>, InputError> {
    let mut motors = Vec::new();
    let mut current: Option<(MotorHeader, Vec<ThrustSample>)> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        match current.take() {
            None => current = Some((parse_header(line, line_number)?, Vec::new())),
            Some((header, mut samples)) => {
                let (time, thrust) = match parse_sample(line) {
                    Some(pair) => pair,
                    None => {
                        return Err(InputError::MotorFile {
                            line: line_number,
                            message: format!(
                                "motor {} has no zero-thrust burnout point before this line",
                                header.code
                            ),
                        })
                    }
                };

                if time > 0.0 && thrust == 0.0 {
                    samples.push(ThrustSample { time, thrust });
                    motors.push(build_engine(header, samples)?);
                } else {
                    if time > 0.0 || thrust > 0.0 {
                        samples.push(ThrustSample { time, thrust });
                    }
                    current = Some((header, samples));
                }
            }
        }
    }

    if let Some((header, _)) = current {
        return Err(InputError::MotorFile {
            line: header.line,
            message: format!("unexpected end of file inside motor {}", header.code),
        });
    }

    Ok(motors)
}

fn parse_header(line: &str, line_number: usize) -> Result<MotorHeader, InputError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let reject = |message: String| InputError::MotorFile {
        line: line_number,
        message,
    };

    if fields.len() < 7 {
        return Err(reject(format!(
            "motor header needs 7 fields (code dia len delays prop total mfg), found {}",
            fields.len()
        )));
    }

    let number = |index: usize, what: &str| -> Result<f64, InputError> {
        fields[index]
            .parse::<f64>()
            .map_err(|_| reject(format!("bad {} '{}'", what, fields[index])))
    };

    Ok(MotorHeader {
        line: line_number,
        code: fields[0].to_string(),
        diameter: number(1, "diameter")?,
        length: number(2, "length")?,
        delays: parse_delays(fields[3]),
        propellant_mass: number(4, "propellant mass")?,
        total_mass: number(5, "motor mass")?,
        manufacturer: fields[6..].join(" "),
    })
}

pub fn parse_delays(field: &str) -> Vec<u32> {
    field
        .split('-')
        .filter_map(|delay| delay.trim().parse::<u32>().ok())
        .collect()
}

fn parse_sample(line: &str) -> Option<(f64, f64)> {
    let mut fields = line.split_whitespace();
    let time = fields.next()?.parse::<f64>().ok()?;
    let thrust = fields.next()?.parse::<f64>().ok()?;
    Some((time, thrust))
}

fn build_engine(header: MotorHeader, samples: Vec<ThrustSample>) -> Result<Engine, InputError> {
    let wrap = |error: crate::errors::SimulationError| InputError::MotorFile {
        line: header.line,
        message: format!("motor {}: {}", header.code, error),
    };

    let curve = ThrustCurve::new(samples).map_err(wrap)?;
    let engine = Engine::new(
        header.code.clone(),
        header.propellant_mass,
        header.total_mass,
        curve,
    )
    .map_err(wrap)?;

    Ok(engine
        .with_manufacturer(header.manufacturer)
        .with_dimensions(header.diameter, header.length)
        .with_delays(header.delays))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_FILE: &str = "\
; sample motors
; code dia len delays prop total mfg
A8 18 70 3-5 0.0033 0.0163 Estes
0.05 2.0
0.2 10.0
0.5 4.0
0.7 0.0
;
C6 18 70 0-3-5-7 0.0108 0.0258 Estes
0.1 12.0
1.8 4.0
1.9 0.0

D12 24 70 P 0.021 0.0441 Estes Industries
0.2 29.0
1.6 10.0
1.7 0.0
";

    fn create_test_catalog() -> MotorCatalog {
        MotorCatalog::parse(SAMPLE_FILE).unwrap()
    }

    #[test]
    fn test_parses_every_motor() {
        let catalog = create_test_catalog();
        assert_eq!(catalog.len(), 3);

        let a8 = &catalog.motors()[0];
        assert_eq!(a8.code, "A8");
        assert_eq!(a8.delays, vec![3, 5]);
        assert_eq!(a8.diameter, 18.0);
        assert_relative_eq!(a8.burn_time(), 0.7, epsilon = 1e-12);
        assert_relative_eq!(a8.propellant_mass, 0.0033, epsilon = 1e-12);
        assert_eq!(a8.peak_thrust(), 10.0);

        let d12 = &catalog.motors()[2];
        assert!(d12.delays.is_empty());
        assert_eq!(d12.manufacturer, "Estes Industries");
    }

    #[test]
    fn test_total_impulse_starts_from_origin() {
        let catalog = create_test_catalog();
        let a8 = &catalog.motors()[0];

        let expected = 0.05 * 2.0 / 2.0 + 0.15 * 12.0 / 2.0 + 0.3 * 14.0 / 2.0 + 0.2 * 4.0 / 2.0;
        assert_relative_eq!(a8.total_impulse(), expected, epsilon = 1e-9);
        assert_relative_eq!(a8.average_thrust(), expected / 0.7, epsilon = 1e-9);
    }

    #[test]
    fn test_find_exact_then_prefix() {
        let catalog = create_test_catalog();

        assert_eq!(catalog.find("c6").unwrap().code, "C6");
        assert_eq!(catalog.find("D").unwrap().code, "D12");
        assert!(matches!(
            catalog.find("F50"),
            Err(InputError::MotorNotFound(_))
        ));
        assert!(catalog.find("  ").is_err());
    }

    #[test]
    fn test_missing_burnout_point() {
        let text = "B4 18 70 2 0.006 0.02 Estes\n0.1 5.0\n0.9 3.0\n";
        assert!(matches!(
            MotorCatalog::parse(text),
            Err(InputError::MotorFile { line: 1, .. })
        ));

        let next_header = "B4 18 70 2 0.006 0.02 Estes\n0.1 5.0\nC6 18 70 3 0.01 0.02 Estes\n";
        assert!(matches!(
            MotorCatalog::parse(next_header),
            Err(InputError::MotorFile { line: 3, .. })
        ));
    }

    #[test]
    fn test_short_header_is_rejected() {
        let text = "B4 18 70 2 0.006\n0.1 5.0\n0.9 0.0\n";
        assert!(matches!(
            MotorCatalog::parse(text),
            Err(InputError::MotorFile { line: 1, .. })
        ));
    }

    #[test]
    fn test_delay_lists() {
        assert_eq!(parse_delays("3-5-7"), vec![3, 5, 7]);
        assert_eq!(parse_delays("P"), Vec::<u32>::new());
        assert_eq!(parse_delays("0"), vec![0]);
    }

    #[test]
    fn test_listing() {
        let catalog = create_test_catalog();
        let mut text = Vec::new();
        catalog.write_listing(&mut text, false).unwrap();
        let text = String::from_utf8(text).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4 + 3);
        assert!(lines[4].starts_with("A8        Estes"));
        assert!(lines[4].ends_with("18x70 3-5"));

        let mut csv = Vec::new();
        catalog.write_listing(&mut csv, true).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert!(csv.lines().nth(3).unwrap().starts_with("\"D12\",\"Estes\","));
    }
}
