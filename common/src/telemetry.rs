use crate::{
    averaging::AveragingBuffer,
    config::{Calibration, TelemetryConfig},
    error::{Channel, SensorFault},
    types::{CalibratedReading, SensorSample},
};

#[derive(Debug, Clone)]
pub struct TelemetryPipeline {
    temperature: Calibration,
    humidity: Calibration,
    temp_range: (f32, f32),
    humidity_range: (f32, f32),
    buffer: AveragingBuffer,
    accepted: u64,
    rejected: u64,
}

impl TelemetryPipeline {
    pub fn new(config: &TelemetryConfig) -> Self {
        let mut config = config.clone();
        config.sanitize();
        Self {
            temperature: config.temperature,
            humidity: config.humidity,
            temp_range: (config.min_valid_temp_c, config.max_valid_temp_c),
            humidity_range: (config.min_valid_humidity, config.max_valid_humidity),
            buffer: AveragingBuffer::new(config.average_count),
            accepted: 0,
            rejected: 0,
        }
    }

    /// Validates a raw sample and pushes its calibrated value into the window.
    ///
    /// Faulty samples never reach the buffer, so the running average keeps
    /// sliding over the last good values.
    pub fn ingest(&mut self, raw: SensorSample) -> Result<(), SensorFault> {
        if let Err(fault) = self.check(raw) {
            self.rejected = self.rejected.saturating_add(1);
            return Err(fault);
        }

        self.buffer.push(CalibratedReading {
            temperature: self.temperature.apply(raw.temperature),
            humidity: self.humidity.apply(raw.humidity),
        });
        self.accepted = self.accepted.saturating_add(1);
        Ok(())
    }

    pub fn tick(&self) -> Option<CalibratedReading> {
        if !self.buffer.is_full() {
            return None;
        }
        self.buffer.mean()
    }

    pub fn is_warm(&self) -> bool {
        self.buffer.is_full()
    }

    pub fn accepted_samples(&self) -> u64 {
        self.accepted
    }

    pub fn rejected_samples(&self) -> u64 {
        self.rejected
    }

    fn check(&self, raw: SensorSample) -> Result<(), SensorFault> {
        check_channel(Channel::Temperature, raw.temperature, self.temp_range)?;
        check_channel(Channel::Humidity, raw.humidity, self.humidity_range)
    }
}

fn check_channel(channel: Channel, value: f32, (min, max): (f32, f32)) -> Result<(), SensorFault> {
    if !value.is_finite() {
        return Err(SensorFault::NotFinite(channel));
    }
    if !(min..=max).contains(&value) {
        return Err(SensorFault::OutOfRange {
            channel,
            value,
            min,
            max,
        });
    }
    Ok(())
}
