//! Desync monitor
//!
//! Stores the player's position and motion next to every recorded tick as
//! `$desyncMonitor(x, y, z, mx, my, mz);` on the tick line. During playback
//! the stored values are compared with what the host reports, so a run that
//! drifts from its recording is noticed on the tick it happens.

use std::collections::BTreeMap;

use super::file_command::{FileCommand, FileCommandExtension};
use crate::error::ExtensionError;
use crate::tick::TickContainer;

pub const NAME: &str = "desyncMonitor@v1";
pub const COMMAND: &str = "desyncMonitor";

/// Position and motion of the player at the end of a tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionSample {
    pub position: [f64; 3],
    pub motion: [f64; 3],
}

impl MotionSample {
    pub fn new(position: [f64; 3], motion: [f64; 3]) -> Self {
        Self { position, motion }
    }

    /// Largest absolute difference over all six axes
    pub fn max_deviation(&self, other: &MotionSample) -> f64 {
        self.position
            .iter()
            .chain(&self.motion)
            .zip(other.position.iter().chain(&other.motion))
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    fn to_command(self) -> FileCommand {
        FileCommand::new(
            COMMAND,
            self.position
                .iter()
                .chain(&self.motion)
                .map(|v| v.to_string()),
        )
    }

    fn from_command(command: &FileCommand) -> Result<Self, ExtensionError> {
        if command.args.len() != 6 {
            return Err(ExtensionError::new(format!(
                "expected 6 values, found {}",
                command.args.len()
            )));
        }
        let mut values = [0.0; 6];
        for (slot, arg) in values.iter_mut().zip(&command.args) {
            *slot = arg
                .trim()
                .parse()
                .map_err(|_| ExtensionError::new(format!("invalid number `{}`", arg)))?;
        }
        Ok(Self {
            position: [values[0], values[1], values[2]],
            motion: [values[3], values[4], values[5]],
        })
    }
}

/// Host hook reporting where the player currently is
pub trait PositionProbe: Send {
    fn sample(&self) -> Option<MotionSample>;
}

/// A tick whose played-back state differs from the recording
#[derive(Debug, Clone, PartialEq)]
pub struct DesyncReport {
    pub tick: usize,
    pub expected: MotionSample,
    pub actual: MotionSample,
    pub deviation: f64,
}

#[derive(Default)]
pub struct DesyncMonitorExtension {
    samples: BTreeMap<usize, MotionSample>,
    probe: Option<Box<dyn PositionProbe>>,
    tolerance: f64,
    reports: Vec<DesyncReport>,
}

impl DesyncMonitorExtension {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn set_probe(&mut self, probe: impl PositionProbe + 'static) {
        self.probe = Some(Box::new(probe));
    }

    pub fn remove_probe(&mut self) {
        self.probe = None;
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    pub fn sample(&self, tick: usize) -> Option<&MotionSample> {
        self.samples.get(&tick)
    }

    pub fn set_sample(&mut self, tick: usize, sample: MotionSample) {
        self.samples.insert(tick, sample);
    }

    /// Desyncs found since the last clear
    pub fn reports(&self) -> &[DesyncReport] {
        &self.reports
    }

    pub fn take_reports(&mut self) -> Vec<DesyncReport> {
        std::mem::take(&mut self.reports)
    }
}

impl FileCommandExtension for DesyncMonitorExtension {
    fn name(&self) -> &str {
        NAME
    }

    fn command_names(&self) -> &[&'static str] {
        &[COMMAND]
    }

    fn on_clear(&mut self) {
        self.samples.clear();
        self.reports.clear();
    }

    fn on_truncate(&mut self, len: usize) {
        self.samples.retain(|tick, _| *tick < len);
        self.reports.retain(|report| report.tick < len);
    }

    fn on_record(&mut self, tick: usize, _container: &TickContainer) {
        if let Some(sample) = self.probe.as_ref().and_then(|p| p.sample()) {
            self.samples.insert(tick, sample);
        }
    }

    fn on_playback(&mut self, tick: usize, _container: &TickContainer) {
        let Some(expected) = self.samples.get(&tick).copied() else {
            return;
        };
        let Some(actual) = self.probe.as_ref().and_then(|p| p.sample()) else {
            return;
        };
        let deviation = expected.max_deviation(&actual);
        if deviation > self.tolerance {
            tracing::warn!(tick, deviation, "desync detected");
            self.reports.push(DesyncReport {
                tick,
                expected,
                actual,
                deviation,
            });
        }
    }

    fn on_serialise_endline(
        &self,
        tick: usize,
        _container: &TickContainer,
    ) -> Vec<Option<FileCommand>> {
        match self.samples.get(&tick) {
            Some(sample) => vec![Some(sample.to_command())],
            None => Vec::new(),
        }
    }

    fn check_endline(
        &self,
        _tick: usize,
        commands: &[Option<FileCommand>],
    ) -> Result<(), ExtensionError> {
        match commands.first() {
            Some(Some(command)) => MotionSample::from_command(command).map(drop),
            _ => Ok(()),
        }
    }

    fn on_deserialise_endline(
        &mut self,
        tick: usize,
        commands: &[Option<FileCommand>],
    ) -> Result<(), ExtensionError> {
        if let Some(Some(command)) = commands.first() {
            self.samples.insert(tick, MotionSample::from_command(command)?);
        }
        Ok(())
    }
}
