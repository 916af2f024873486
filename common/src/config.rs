use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::types::AcState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub slope: f32,
    pub shift: f32,
}

impl Calibration {
    pub const IDENTITY: Self = Self {
        slope: 1.0,
        shift: 0.0,
    };

    pub const fn new(slope: f32, shift: f32) -> Self {
        Self { slope, shift }
    }

    #[inline]
    pub fn apply(&self, raw: f32) -> f32 {
        raw * self.slope + self.shift
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub sample_interval_ms: u64,
    pub average_count: usize,
    pub temperature: Calibration,
    pub humidity: Calibration,
    pub min_valid_temp_c: f32,
    pub max_valid_temp_c: f32,
    pub min_valid_humidity: f32,
    pub max_valid_humidity: f32,
    pub log_sensor_faults: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 500,
            average_count: 12,
            temperature: Calibration::new(1.029, -5.01),
            humidity: Calibration::new(0.899, 21.285),
            min_valid_temp_c: -40.0,
            max_valid_temp_c: 80.0,
            min_valid_humidity: 0.0,
            max_valid_humidity: 100.0,
            log_sensor_faults: true,
        }
    }
}

impl TelemetryConfig {
    pub fn sanitize(&mut self) {
        self.sample_interval_ms = self.sample_interval_ms.max(50);
        self.average_count = self.average_count.clamp(1, 1_024);

        if self.min_valid_temp_c > self.max_valid_temp_c {
            std::mem::swap(&mut self.min_valid_temp_c, &mut self.max_valid_temp_c);
        }
        if self.min_valid_humidity > self.max_valid_humidity {
            std::mem::swap(&mut self.min_valid_humidity, &mut self.max_valid_humidity);
        }
    }

    pub fn report_interval_ms(&self) -> u64 {
        self.sample_interval_ms
            .saturating_mul(self.average_count as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcConfig {
    pub initial_state: AcState,
    pub min_target_temp: i32,
    pub max_target_temp: i32,
    pub retransmit_on_reconnect: bool,
}

impl Default for AcConfig {
    fn default() -> Self {
        Self {
            initial_state: AcState::default(),
            min_target_temp: 16,
            max_target_temp: 30,
            retransmit_on_reconnect: false,
        }
    }
}

impl AcConfig {
    pub fn sanitize(&mut self) {
        if self.min_target_temp > self.max_target_temp {
            std::mem::swap(&mut self.min_target_temp, &mut self.max_target_temp);
        }
        self.initial_state.target_temp = self
            .initial_state
            .target_temp
            .clamp(self.min_target_temp, self.max_target_temp);
    }

    pub fn target_bounds(&self) -> (i32, i32) {
        (self.min_target_temp, self.max_target_temp)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub mqtt_client_id: String,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_user: String,
    pub mqtt_pass: String,
    pub use_static_ip: bool,
    pub static_ip: Option<[u8; 4]>,
    pub gateway: Option<[u8; 4]>,
    pub subnet: Option<[u8; 4]>,
    pub dns: Option<[u8; 4]>,
    pub log_mqtt_connect: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_pass: String::new(),
            mqtt_client_id: "home_sensor1_dht11".to_string(),
            mqtt_host: "192.168.0.5".to_string(),
            mqtt_port: 1883,
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
            use_static_ip: false,
            static_ip: None,
            gateway: None,
            subnet: None,
            dns: None,
            log_mqtt_connect: false,
        }
    }
}

impl NetworkConfig {
    pub fn sanitize(&mut self) {
        if self.mqtt_client_id.trim().is_empty() {
            self.mqtt_client_id = Self::default().mqtt_client_id;
        }
        if self.mqtt_port == 0 {
            self.mqtt_port = 1883;
        }
        // A static address is useless without gateway and subnet.
        if self.use_static_ip
            && (self.static_ip.is_none() || self.gateway.is_none() || self.subnet.is_none())
        {
            self.use_static_ip = false;
        }
    }

    pub fn link_summary(&self) -> String {
        let ssid: &str = if self.wifi_ssid.is_empty() {
            "<unset>"
        } else {
            &self.wifi_ssid
        };
        let auth = if self.wifi_pass.is_empty() { "open" } else { "psk" };

        let addressing = match (self.use_static_ip, self.static_ip, self.gateway, self.subnet) {
            (true, Some(ip), Some(gateway), Some(subnet)) => {
                let dns = self
                    .dns
                    .map_or_else(|| "via gateway".to_string(), |dns| Ipv4Addr::from(dns).to_string());
                format!(
                    "static {} gw {} mask {} dns {dns}",
                    Ipv4Addr::from(ip),
                    Ipv4Addr::from(gateway),
                    Ipv4Addr::from(subnet)
                )
            }
            _ => "dhcp".to_string(),
        };

        format!("wifi {ssid} ({auth}), {addressing}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorKind {
    Dht11,
    Dht22,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub sensor_pin: i32,
    pub sensor_kind: SensorKind,
    pub ir_tx_pin: i32,
    pub ir_carrier_khz: u32,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            sensor_pin: 2,
            sensor_kind: SensorKind::Dht11,
            ir_tx_pin: 4,
            ir_carrier_khz: 38,
        }
    }
}

impl HardwareConfig {
    pub fn sanitize(&mut self) {
        if self.sensor_pin < 0 {
            self.sensor_pin = 2;
        }
        if self.ir_tx_pin < 0 {
            self.ir_tx_pin = 4;
        }
        self.ir_carrier_khz = self.ir_carrier_khz.clamp(10, 100);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub network: NetworkConfig,
    pub telemetry: TelemetryConfig,
    pub ac: AcConfig,
    pub hardware: HardwareConfig,
}

impl BridgeConfig {
    pub fn sanitize(&mut self) {
        self.network.sanitize();
        self.telemetry.sanitize();
        self.ac.sanitize();
        self.hardware.sanitize();
    }
}
