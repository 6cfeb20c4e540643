use std::io::{self, Write};

use super::telemetry::{EventKind, Results, Termination};
use crate::constants::{IN2M, M2FT, OZ2KG};
use crate::control::{flight::Flight, structure::Structure};
use crate::input_system::motor_file::catalog_line;
use crate::utils::units::{from_si, UnitKind};

// Comment marker so reports can be fed straight to plotting tools.
const MARK: char = '#';

/// Renders the classic text report: header, optional telemetry table, summary.
pub fn write_report<W: Write>(
    writer: &mut W,
    flight: &Flight,
    results: &Results,
    motor_file: &str,
) -> io::Result<()> {
    write_header(writer, flight, motor_file)?;
    if flight.options.verbose {
        write_telemetry(writer, results)?;
    }
    write_summary(writer, flight, results)
}

fn write_header<W: Write>(writer: &mut W, flight: &Flight, motor_file: &str) -> io::Result<()> {
    let structure = Structure::new(&flight.rocket, &flight.engines);

    writeln!(writer, "{}", MARK)?;
    writeln!(writer, "{}Rocket Name:  {}", MARK, flight.rocket.name)?;
    writeln!(writer, "{}Motor File:   {}", MARK, motor_file)?;

    for (index, (stage, engine)) in flight.rocket.stages.iter().zip(&flight.engines).enumerate() {
        writeln!(writer, "{}", MARK)?;
        writeln!(
            writer,
            "{}{:>5}  {:<16}  {:>8}  {:>8}  {:>8}  {:>9}",
            MARK, "Stage", "Engine", "Bare", "Launch", "AirFrame", "Effective"
        )?;
        writeln!(
            writer,
            "{}{:>5}  {:<16}  {:>8}  {:>8}  {:>8}  {:>9}  {:>5}",
            MARK, "Num", "(Qt) Type", "Weight", "Weight", "Diameter", "Diameter", "Cd"
        )?;
        writeln!(
            writer,
            "{}{:>5}  {:<16}  {:>8}  {:>8}  {:>8}  {:>9}  {:>5}",
            MARK, "=====", "================", "========", "========", "========", "=========", "====="
        )?;
        writeln!(
            writer,
            "{}{:>5}  ({}) {:<12}  {:>8.2}  {:>8.2}  {:>8.3}  {:>9.3}  {:>5.3}",
            MARK,
            stage.number,
            stage.engine_count,
            engine.code,
            stage.dry_mass / OZ2KG,
            structure.mass_from(index) / OZ2KG,
            stage.diameter / IN2M,
            stage.effective_diameter() / IN2M,
            stage.drag_coefficient
        )?;
        writeln!(writer, "{}{}", MARK, catalog_line(engine))?;
    }

    Ok(())
}

fn write_telemetry<W: Write>(writer: &mut W, results: &Results) -> io::Result<()> {
    writeln!(writer, "{}", MARK)?;
    writeln!(
        writer,
        "{}{:>4} {:>10} {:>10} {:>10} {:>11} {:>10} {:>10}",
        MARK, "Time", "Altitude", "Velocity", "Accel", "Weight", "Thrust", "Drag"
    )?;
    writeln!(
        writer,
        "{}{:>4} {:>10} {:>10} {:>10} {:>11} {:>10} {:>10}",
        MARK, "(Sec)", "(Feet)", "(Feet/Sec)", "(Ft/Sec^2)", "(Grams)", "(Newtons)", "(Newtons)"
    )?;
    writeln!(
        writer,
        "{}{:>4} {:>10} {:>10} {:>10} {:>11} {:>10} {:>10}",
        MARK, "-----", "---------", "---------", "---------", "-----------", "---------", "---------"
    )?;

    let mut ignitions = results
        .events
        .iter()
        .filter_map(|event| match event.kind {
            EventKind::Ignition { stage } if stage > 1 => Some((stage, event.time)),
            _ => None,
        })
        .peekable();

    for sample in &results.samples {
        while let Some(&(stage, time)) = ignitions.peek() {
            if time > sample.time {
                break;
            }
            writeln!(writer, "{}Stage {} Ignition at {:5.2} sec.", MARK, stage, time)?;
            ignitions.next();
        }

        writeln!(
            writer,
            " {:4.1} {:10.1} {:10.1} {:10.2} {:11.2} {:10.3} {:10.3}",
            sample.time,
            sample.altitude * M2FT,
            sample.velocity * M2FT,
            sample.acceleration * M2FT,
            sample.mass * 1000.0,
            sample.thrust,
            sample.drag
        )?;
    }

    Ok(())
}

fn write_summary<W: Write>(writer: &mut W, flight: &Flight, results: &Results) -> io::Result<()> {
    let cutoff = results.cutoff.map_or((0.0, 0.0, 0.0), |cutoff| {
        (cutoff.velocity, cutoff.altitude, cutoff.time)
    });
    let rod = results
        .rod_clearance
        .map_or((0.0, 0.0), |rod| (rod.time, rod.velocity));
    let site_temperature =
        from_si(UnitKind::Temperature, results.site.temperature, "F").unwrap_or(f64::NAN);

    writeln!(writer, "{}", MARK)?;
    writeln!(
        writer,
        "{}Maximum altitude attained = {:.1} feet ({:.1} meters).",
        MARK,
        results.max_altitude.value * M2FT,
        results.max_altitude.value
    )?;
    writeln!(
        writer,
        "{}Time to peak altitude =     {:.2} seconds.",
        MARK, results.max_altitude.time
    )?;
    writeln!(
        writer,
        "{}Maximum velocity =          {:.1} feet/sec at {:.2} sec.",
        MARK,
        results.max_velocity.value * M2FT,
        results.max_velocity.time
    )?;
    writeln!(
        writer,
        "{}Cutoff velocity =           {:.1} feet/sec at {:.1} feet ( {:.2} sec ).",
        MARK,
        cutoff.0 * M2FT,
        cutoff.1 * M2FT,
        cutoff.2
    )?;
    writeln!(
        writer,
        "{}Maximum acceleration =      {:.1} feet/sec^2 at {:.2} sec.",
        MARK,
        results.max_acceleration.value * M2FT,
        results.max_acceleration.time
    )?;
    writeln!(
        writer,
        "{}Minimum acceleration =      {:.1} feet/sec^2 at {:.2} sec.",
        MARK,
        results.min_acceleration.value * M2FT,
        results.min_acceleration.time
    )?;
    writeln!(
        writer,
        "{}Launch rod time =  {:.2},  rod len   = {:.1},       velocity  = {:.1}",
        MARK,
        rod.0,
        flight.rod_length * M2FT,
        rod.1 * M2FT
    )?;
    writeln!(
        writer,
        "{}Site Altitude =   {:5.0},  site temp = {:.1} F",
        MARK,
        results.site.altitude * M2FT,
        site_temperature
    )?;
    writeln!(
        writer,
        "{}Barometer     =   {:.2},  air density = {:.4},  Mach vel  = {:.1}",
        MARK,
        results.site.barometer,
        results.site.sea_level_density,
        results.site.sound_speed * M2FT
    )?;
    writeln!(
        writer,
        "{}Flight ended at {:.2} sec ({}).",
        MARK,
        results.final_time,
        termination_label(results.termination)
    )
}

fn termination_label(termination: Termination) -> &'static str {
    match termination {
        Termination::Apogee => "apogee",
        Termination::CoastLimit => "coast limit",
        Termination::GroundImpact => "ground impact",
    }
}

pub fn write_csv<W: Write>(writer: &mut W, results: &Results) -> io::Result<()> {
    writeln!(writer, "time,altitude,velocity,acceleration,mass,thrust,drag")?;

    for sample in &results.samples {
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.6},{:.4},{:.4}",
            sample.time,
            sample.altitude,
            sample.velocity,
            sample.acceleration,
            sample.mass,
            sample.thrust,
            sample.drag
        )?;
    }

    Ok(())
}
