use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::warn;

use super::motor_file::MotorCatalog;
use crate::constants::{
    DEFAULT_DRAG_COEFFICIENT, DEFAULT_ROD_LENGTH, MAX_STAGES, SAMPLE_INTERVAL, STD_TEMPERATURE,
    TIME_STEP,
};
use crate::control::{
    environment::LaunchSite,
    flight::{Flight, SimulationOptions},
    launch_stages::{self, Fins},
    rocket::{NoseShape, Rocket},
};
use crate::errors::InputError;
use crate::utils::units::{to_si, UnitKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    None,
    Text,
    FileName,
    Integer,
    Number,
    Quantity(UnitKind, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    NoOp,
    Home,
    Units,
    Mode,
    Quiet,
    Verbose,
    Launch,
    Quit,
    Debug,
    Dump,
    Title,
    TimeStep,
    PrintTime,
    PrintCommand,
    SiteAltitude,
    FinalAltitude,
    CoastTime,
    SiteTemperature,
    SitePressure,
    RodLength,
    EngineFile,
    NumStages,
    NoseType,
    Stage,
    StageDelay,
    Diameter,
    NumFins,
    FinThickness,
    FinSpan,
    DryMass,
    LaunchMass,
    DragCoefficient,
    MotorName,
    NumMotors,
    Destination,
    OutFile,
    LaunchAngle,
}

// Order matters: an abbreviation resolves to the first entry it prefixes.
const KEYWORDS: &[(&str, Keyword)] = &[
    ("none", Keyword::NoOp),
    ("home", Keyword::Home),
    ("homedir", Keyword::Home),
    ("rasphome", Keyword::Home),
    ("raspdir", Keyword::Home),
    ("units", Keyword::Units),
    ("mode", Keyword::Mode),
    ("quiet", Keyword::Quiet),
    ("summary", Keyword::Quiet),
    ("verbose", Keyword::Verbose),
    ("detail", Keyword::Verbose),
    ("launch", Keyword::Launch),
    ("quit", Keyword::Quit),
    ("done", Keyword::Quit),
    ("exit", Keyword::Quit),
    ("debug", Keyword::Debug),
    ("dump", Keyword::Dump),
    ("title", Keyword::Title),
    ("dtime", Keyword::TimeStep),
    ("printtime", Keyword::PrintTime),
    ("printcommand", Keyword::PrintCommand),
    ("sitealtitude", Keyword::SiteAltitude),
    ("finalaltitude", Keyword::FinalAltitude),
    ("coasttime", Keyword::CoastTime),
    ("sitetemperature", Keyword::SiteTemperature),
    ("sitepressure", Keyword::SitePressure),
    ("raillength", Keyword::RodLength),
    ("rodlength", Keyword::RodLength),
    ("enginefile", Keyword::EngineFile),
    ("motorfile", Keyword::EngineFile),
    ("numstages", Keyword::NumStages),
    ("nosetype", Keyword::NoseType),
    ("stage", Keyword::Stage),
    ("stagedelay", Keyword::StageDelay),
    ("diameter", Keyword::Diameter),
    ("numfins", Keyword::NumFins),
    ("finthickness", Keyword::FinThickness),
    ("finspan", Keyword::FinSpan),
    ("drymass", Keyword::DryMass),
    ("dmass", Keyword::DryMass),
    ("mass", Keyword::DryMass),
    ("launchmass", Keyword::LaunchMass),
    ("lmass", Keyword::LaunchMass),
    ("cd", Keyword::DragCoefficient),
    ("motorname", Keyword::MotorName),
    ("enginename", Keyword::MotorName),
    ("nummotor", Keyword::NumMotors),
    ("numengine", Keyword::NumMotors),
    ("destination", Keyword::Destination),
    ("outfile", Keyword::OutFile),
    ("outputfile", Keyword::OutFile),
    ("theta", Keyword::LaunchAngle),
    ("launchangle", Keyword::LaunchAngle),
];

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        let word = word.to_ascii_lowercase();
        if word.is_empty() {
            return None;
        }

        KEYWORDS
            .iter()
            .find(|(tag, _)| tag.starts_with(word.as_str()))
            .map(|&(_, keyword)| keyword)
    }

    pub fn operand(&self) -> Operand {
        match self {
            Keyword::NoOp | Keyword::Launch | Keyword::Quit | Keyword::Dump | Keyword::Title => {
                Operand::None
            }
            Keyword::Home
            | Keyword::Units
            | Keyword::Mode
            | Keyword::PrintCommand
            | Keyword::NoseType
            | Keyword::MotorName
            | Keyword::Destination => Operand::Text,
            Keyword::EngineFile | Keyword::OutFile => Operand::FileName,
            Keyword::Quiet
            | Keyword::Verbose
            | Keyword::Debug
            | Keyword::NumStages
            | Keyword::Stage
            | Keyword::NumFins
            | Keyword::NumMotors => Operand::Integer,
            Keyword::DragCoefficient => Operand::Number,
            Keyword::TimeStep | Keyword::PrintTime | Keyword::CoastTime | Keyword::StageDelay => {
                Operand::Quantity(UnitKind::Time, "sec")
            }
            Keyword::SiteAltitude | Keyword::FinalAltitude => {
                Operand::Quantity(UnitKind::Length, "ft")
            }
            Keyword::RodLength | Keyword::Diameter | Keyword::FinThickness | Keyword::FinSpan => {
                Operand::Quantity(UnitKind::Length, "in")
            }
            Keyword::SiteTemperature => Operand::Quantity(UnitKind::Temperature, "F"),
            Keyword::SitePressure => Operand::Quantity(UnitKind::Pressure, "inHg"),
            Keyword::DryMass | Keyword::LaunchMass => Operand::Quantity(UnitKind::Mass, "oz"),
            Keyword::LaunchAngle => Operand::Quantity(UnitKind::Angle, "deg"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Text(String),
    Integer(i64),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Set(Keyword, Value),
    Title(String),
    Launch,
    Dump,
    Quit,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '='
}

pub fn parse_statement(line: &str, line_number: usize) -> Result<Option<Statement>, InputError> {
    let line = line.trim_end();
    let mut words = line.split(is_separator).filter(|word| !word.is_empty());

    let first = match words.next() {
        Some(first) => first,
        None => return Ok(None),
    };
    let keyword = match Keyword::lookup(first) {
        Some(keyword) => keyword,
        None => {
            warn!("line {}: unknown keyword '{}' ignored", line_number, first);
            return Ok(None);
        }
    };

    let statement = match keyword {
        Keyword::Title => {
            let start = line.find(first).map_or(0, |at| at + first.len());
            let rest = line[start..].trim_start_matches(is_separator);
            Statement::Title(rest.to_string())
        }
        Keyword::Launch => Statement::Launch,
        Keyword::Dump => Statement::Dump,
        Keyword::Quit => Statement::Quit,
        _ => {
            let value = parse_value(keyword, words.next(), words.next(), line_number)?;
            Statement::Set(keyword, value)
        }
    };

    Ok(Some(statement))
}

fn parse_value(
    keyword: Keyword,
    value: Option<&str>,
    unit: Option<&str>,
    line_number: usize,
) -> Result<Value, InputError> {
    let reject = |message: String| InputError::Batch {
        line: line_number,
        message,
    };

    match keyword.operand() {
        Operand::None => Ok(Value::None),
        Operand::Text | Operand::FileName => {
            Ok(value.map_or(Value::None, |text| Value::Text(text.to_string())))
        }
        Operand::Integer => match value {
            None => Ok(Value::Integer(0)),
            Some(text) => text
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| reject(format!("{:?} expects a whole number, got '{}'", keyword, text))),
        },
        Operand::Number => {
            let text = value.ok_or_else(|| reject(format!("{:?} needs a value", keyword)))?;
            text.parse::<f64>()
                .map(Value::Number)
                .map_err(|_| reject(format!("{:?} expects a number, got '{}'", keyword, text)))
        }
        Operand::Quantity(kind, default_unit) => {
            let text = value.ok_or_else(|| reject(format!("{:?} needs a value", keyword)))?;
            let number = text
                .parse::<f64>()
                .map_err(|_| reject(format!("{:?} expects a number, got '{}'", keyword, text)))?;
            let converted = to_si(kind, number, unit.unwrap_or(default_unit))
                .map_err(|error| reject(error.to_string()))?;
            Ok(Value::Number(converted))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Verbose,
    Debug,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    pub delay: f64,
    pub diameter: f64,
    pub fin_count: u32,
    pub fin_thickness: f64,
    pub fin_span: f64,
    pub dry_mass: f64,
    pub launch_mass: f64,
    pub drag_coefficient: f64,
    pub motor: String,
    pub motor_count: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        StageConfig {
            delay: 0.0,
            diameter: 0.0,
            fin_count: 0,
            fin_thickness: 0.0,
            fin_span: 0.0,
            dry_mass: 0.0,
            launch_mass: 0.0,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            motor: String::new(),
            motor_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub title: String,
    pub units: String,
    pub verbosity: Verbosity,
    pub home: Option<PathBuf>,
    pub time_step: f64,
    pub print_time: f64,
    pub print_command: String,
    pub site_altitude: f64,
    pub site_temperature: f64,
    pub site_pressure: Option<f64>,
    pub final_altitude: f64,
    pub coast_time: f64,
    pub rod_length: f64,
    pub engine_file: String,
    pub destination: String,
    pub outfile: String,
    pub launch_angle: f64,
    pub nose: String,
    pub stage_count: usize,
    pub stages: Vec<StageConfig>,
    current_stage: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            title: "None".to_string(),
            units: "FPS".to_string(),
            verbosity: Verbosity::Verbose,
            home: None,
            time_step: TIME_STEP,
            print_time: SAMPLE_INTERVAL,
            print_command: "lp -dL1".to_string(),
            site_altitude: 0.0,
            site_temperature: STD_TEMPERATURE,
            site_pressure: None,
            final_altitude: 0.0,
            coast_time: 0.0,
            rod_length: DEFAULT_ROD_LENGTH,
            engine_file: "rasp.eng".to_string(),
            destination: "screen".to_string(),
            outfile: String::new(),
            launch_angle: 0.0,
            nose: NoseShape::default().name().to_string(),
            stage_count: 1,
            stages: vec![StageConfig::default(); MAX_STAGES],
            current_stage: 1,
        }
    }
}

impl BatchConfig {
    pub fn current_stage(&self) -> usize {
        self.current_stage
    }

    pub fn apply(
        &mut self,
        keyword: Keyword,
        value: Value,
        line_number: usize,
    ) -> Result<(), InputError> {
        let number = match value {
            Value::Number(number) => number,
            Value::Integer(integer) => integer as f64,
            _ => 0.0,
        };
        let integer = match value {
            Value::Integer(integer) => integer,
            _ => 0,
        };
        let text = match &value {
            Value::Text(text) => Some(text.clone()),
            _ => None,
        };
        let stage = &mut self.stages[self.current_stage - 1];

        match keyword {
            Keyword::Home => self.home = text.map(PathBuf::from),
            Keyword::Units => self.units = text.unwrap_or_default(),
            Keyword::Mode => {
                let mode = text.unwrap_or_default().to_ascii_lowercase();
                self.verbosity = if mode.starts_with("quiet") || mode.starts_with("summa") {
                    Verbosity::Quiet
                } else if mode.starts_with("debug") {
                    Verbosity::Debug
                } else {
                    Verbosity::Verbose
                };
            }
            Keyword::Quiet => self.verbosity = Verbosity::Quiet,
            Keyword::Verbose => self.verbosity = Verbosity::Verbose,
            Keyword::Debug => self.verbosity = Verbosity::Debug,
            Keyword::TimeStep => self.time_step = number,
            Keyword::PrintTime => self.print_time = number,
            Keyword::PrintCommand => self.print_command = text.unwrap_or_default(),
            Keyword::SiteAltitude => self.site_altitude = number,
            Keyword::FinalAltitude => self.final_altitude = number,
            Keyword::CoastTime => self.coast_time = number,
            Keyword::SiteTemperature => self.site_temperature = number,
            Keyword::SitePressure => self.site_pressure = Some(number),
            Keyword::RodLength => self.rod_length = number,
            Keyword::EngineFile => match text {
                Some(file) => self.engine_file = file,
                None => warn!("motor file name missing, keeping {}", self.engine_file),
            },
            Keyword::Destination => {
                self.destination = text.unwrap_or_default().to_ascii_lowercase()
            }
            Keyword::OutFile => self.outfile = text.unwrap_or_default(),
            Keyword::LaunchAngle => self.launch_angle = number,
            Keyword::NoseType => self.nose = text.unwrap_or_default(),
            Keyword::NumStages => {
                self.stage_count = stage_number(integer, line_number)?;
            }
            Keyword::Stage => {
                self.current_stage = stage_number(integer, line_number)?;
                self.stage_count = self.stage_count.max(self.current_stage);
            }
            Keyword::StageDelay => stage.delay = number,
            Keyword::Diameter => stage.diameter = number,
            Keyword::NumFins => stage.fin_count = integer.max(0) as u32,
            Keyword::FinThickness => stage.fin_thickness = number,
            Keyword::FinSpan => stage.fin_span = number,
            Keyword::DryMass => stage.dry_mass = number,
            Keyword::LaunchMass => stage.launch_mass = number,
            Keyword::DragCoefficient => stage.drag_coefficient = number,
            Keyword::MotorName => stage.motor = text.unwrap_or_default(),
            Keyword::NumMotors => stage.motor_count = integer.max(0) as u32,
            Keyword::NoOp | Keyword::Launch | Keyword::Quit | Keyword::Dump | Keyword::Title => {}
        }

        Ok(())
    }

    pub fn motor_path(&self, batch_dir: Option<&Path>) -> PathBuf {
        let file = Path::new(&self.engine_file);
        match (&self.home, batch_dir) {
            (Some(home), _) => home.join(file),
            (None, Some(dir)) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        if !self.outfile.is_empty() {
            return Some(PathBuf::from(&self.outfile));
        }
        if self.destination == "file" {
            warn!("destination is file but no outfile was given; writing to the screen");
        }
        None
    }

    pub fn to_flight(&self, catalog: &MotorCatalog) -> Result<Flight, InputError> {
        let nose = NoseShape::find(&self.nose).unwrap_or_else(|| {
            warn!("unknown nose type '{}', using ogive", self.nose);
            NoseShape::default()
        });

        let mut stages = Vec::with_capacity(self.stage_count);
        let mut engines = Vec::with_capacity(self.stage_count);

        for (index, config) in self.stages.iter().take(self.stage_count).enumerate() {
            engines.push(catalog.find(&config.motor)?.clone());
            stages.push(
                launch_stages::Stage::new(index + 1, config.dry_mass, config.diameter)
                    .with_engine_count(config.motor_count)
                    .with_drag_coefficient(config.drag_coefficient)
                    .with_fins(Fins::new(
                        config.fin_count,
                        config.fin_thickness,
                        config.fin_span,
                    ))
                    .with_delay(config.delay),
            );
        }

        let site = LaunchSite {
            altitude: self.site_altitude,
            temperature: self.site_temperature,
            pressure: self.site_pressure,
        };
        let options = SimulationOptions {
            time_step: self.time_step,
            sample_interval: self.print_time,
            verbose: self.verbosity != Verbosity::Quiet,
            ..SimulationOptions::default()
        };

        let flight = Flight::new(Rocket::new(self.title.clone(), nose, stages), engines)
            .with_site(site)
            .with_rod_length(self.rod_length)
            .with_coast_time(self.coast_time)
            .with_options(options);
        flight.validate()?;

        Ok(flight)
    }

    pub fn dump<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "\nRASP Batch Dump\n")?;
        writeln!(writer, "title        = {}", self.title)?;
        writeln!(writer, "units        = {}", self.units)?;
        writeln!(writer, "mode         = {:?}", self.verbosity)?;
        writeln!(
            writer,
            "home         = {}",
            self.home.as_ref().map_or(String::new(), |home| home.display().to_string())
        )?;
        writeln!(writer, "dtime        = {:.6} s", self.time_step)?;
        writeln!(writer, "printtime    = {:.6} s", self.print_time)?;
        writeln!(writer, "printcmd     = {}", self.print_command)?;
        writeln!(writer)?;
        writeln!(writer, "sitealt      = {:.3} m", self.site_altitude)?;
        writeln!(writer, "sitetemp     = {:.2} K", self.site_temperature)?;
        match self.site_pressure {
            Some(pressure) => writeln!(writer, "sitepress    = {:.1} Pa", pressure)?,
            None => writeln!(writer, "sitepress    = standard for site altitude")?,
        }
        writeln!(writer, "raillength   = {:.4} m", self.rod_length)?;
        writeln!(writer, "theta        = {:.4} rad", self.launch_angle)?;
        writeln!(writer, "finalalt     = {:.3} m", self.final_altitude)?;
        writeln!(writer, "coasttime    = {:.3} s", self.coast_time)?;
        writeln!(writer, "enginefile   = {}", self.engine_file)?;
        writeln!(writer, "destination  = {}", self.destination)?;
        writeln!(writer, "outfile      = {}", self.outfile)?;
        writeln!(writer, "nosetype     = {}", self.nose)?;
        writeln!(writer, "numstages    = {}", self.stage_count)?;

        for (index, stage) in self.stages.iter().take(self.stage_count).enumerate() {
            writeln!(writer)?;
            writeln!(writer, "   *** stage [{}] data ***", index + 1)?;
            writeln!(writer, "   diameter     = {:.4} m", stage.diameter)?;
            writeln!(writer, "   numfins      = {}", stage.fin_count)?;
            writeln!(writer, "   finthickness = {:.4} m", stage.fin_thickness)?;
            writeln!(writer, "   finspan      = {:.4} m", stage.fin_span)?;
            writeln!(writer, "   cd           = {:.3}", stage.drag_coefficient)?;
            writeln!(writer, "   drymass      = {:.4} kg", stage.dry_mass)?;
            writeln!(writer, "   launchmass   = {:.4} kg", stage.launch_mass)?;
            writeln!(writer, "   nummotor     = {}", stage.motor_count)?;
            writeln!(writer, "   motorname    = {}", stage.motor)?;
            writeln!(writer, "   stagedelay   = {:.3} s", stage.delay)?;
        }

        Ok(())
    }
}

fn stage_number(number: i64, line_number: usize) -> Result<usize, InputError> {
    if (1..=MAX_STAGES as i64).contains(&number) {
        Ok(number as usize)
    } else {
        Err(InputError::Batch {
            line: line_number,
            message: format!("stage {} is out of range (1..={})", number, MAX_STAGES),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Launch,
    Dump,
}

/// Runs a batch script, calling `handler` on every `LAUNCH` and `DUMP` until `QUIT`.
pub fn run_script<F>(text: &str, mut handler: F) -> Result<BatchConfig, InputError>
where
    F: FnMut(Action, &BatchConfig) -> Result<(), InputError>,
{
    let mut config = BatchConfig::default();

    for (index, line) in text.lines().enumerate() {
        match parse_statement(line, index + 1)? {
            None => {}
            Some(Statement::Title(title)) => {
                if !title.is_empty() {
                    config.title = title;
                }
            }
            Some(Statement::Launch) => handler(Action::Launch, &config)?,
            Some(Statement::Dump) => handler(Action::Dump, &config)?,
            Some(Statement::Quit) => break,
            Some(Statement::Set(keyword, value)) => config.apply(keyword, value, index + 1)?,
        }
    }

    Ok(config)
}
