use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcMode {
    Auto,
    Heat,
    Cool,
    Dry,
    FanOnly,
}

impl AcMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanSpeed {
    Auto,
    Low,
    Medium,
    High,
    Turbo,
}

impl FanSpeed {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Turbo => "turbo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Swing {
    On,
    Off,
}

impl Swing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcField {
    Power,
    Mode,
    TargetTemp,
    Fan,
    Swing,
}

impl AcField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Mode => "mode",
            Self::TargetTemp => "temp",
            Self::Fan => "fan",
            Self::Swing => "swing",
        }
    }
}

impl fmt::Display for AcField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn invalid(field: AcField, raw: &str) -> CommandError {
    CommandError::InvalidValue {
        field,
        value: raw.to_string(),
    }
}

impl FromStr for Power {
    type Err = CommandError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(invalid(AcField::Power, raw)),
        }
    }
}

impl FromStr for AcMode {
    type Err = CommandError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "auto" => Ok(Self::Auto),
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            "dry" => Ok(Self::Dry),
            "fan_only" => Ok(Self::FanOnly),
            _ => Err(invalid(AcField::Mode, raw)),
        }
    }
}

impl FromStr for FanSpeed {
    type Err = CommandError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "auto" => Ok(Self::Auto),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "turbo" => Ok(Self::Turbo),
            _ => Err(invalid(AcField::Fan, raw)),
        }
    }
}

impl FromStr for Swing {
    type Err = CommandError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(invalid(AcField::Swing, raw)),
        }
    }
}

/// Integral decimals such as `"24.0"` are accepted. Values outside `bounds`
/// are rejected, never clamped.
pub fn parse_target_temp(raw: &str, bounds: (i32, i32)) -> Result<i32, CommandError> {
    let trimmed = raw.trim();
    let value = match trimmed.parse::<i32>() {
        Ok(value) => value,
        Err(_) => {
            let float = trimmed
                .parse::<f32>()
                .map_err(|_| invalid(AcField::TargetTemp, raw))?;
            if !float.is_finite() || float.fract() != 0.0 {
                return Err(invalid(AcField::TargetTemp, raw));
            }
            float as i32
        }
    };

    let (min, max) = bounds;
    if !(min..=max).contains(&value) {
        return Err(invalid(AcField::TargetTemp, raw));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcState {
    pub power: Power,
    pub mode: AcMode,
    #[serde(rename = "temp")]
    pub target_temp: i32,
    #[serde(rename = "fan")]
    pub fan_speed: FanSpeed,
    pub swing: Swing,
}

impl Default for AcState {
    fn default() -> Self {
        Self {
            power: Power::Off,
            mode: AcMode::Auto,
            target_temp: 24,
            fan_speed: FanSpeed::Auto,
            swing: Swing::Off,
        }
    }
}

impl fmt::Display for AcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power={} mode={} temp={} fan={} swing={}",
            self.power.as_str(),
            self.mode.as_str(),
            self.target_temp,
            self.fan_speed.as_str(),
            self.swing.as_str()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    Power(Power),
    Mode(AcMode),
    TargetTemp(i32),
    Fan(FanSpeed),
    Swing(Swing),
}

impl FieldUpdate {
    pub fn apply_to(self, state: &mut AcState) {
        match self {
            Self::Power(power) => state.power = power,
            Self::Mode(mode) => state.mode = mode,
            Self::TargetTemp(temp) => state.target_temp = temp,
            Self::Fan(fan) => state.fan_speed = fan,
            Self::Swing(swing) => state.swing = swing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub temperature: f32,
    pub humidity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedReading {
    pub temperature: f32,
    pub humidity: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SensorPayload {
    pub temperature: f32,
    pub humidity: f32,
}

impl From<CalibratedReading> for SensorPayload {
    fn from(reading: CalibratedReading) -> Self {
        Self {
            temperature: round_centi(reading.temperature),
            humidity: round_centi(reading.humidity),
        }
    }
}

fn round_centi(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
