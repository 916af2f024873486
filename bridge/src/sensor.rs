use tracing::info;

use ac_bridge_common::{HardwareConfig, SensorDriver, SensorFault, SensorKind, SensorSample};

// Every this many reads the simulated sensor times out, like a real DHT11
// occasionally does.
const DROPOUT_EVERY: u64 = 97;

pub struct SimulatedSensor {
    kind: SensorKind,
    reads: u64,
}

impl SimulatedSensor {
    pub fn new(hardware: &HardwareConfig) -> Self {
        info!(
            "simulating {:?} sensor on GPIO{}",
            hardware.sensor_kind, hardware.sensor_pin
        );
        Self {
            kind: hardware.sensor_kind,
            reads: 0,
        }
    }
}

impl SensorDriver for SimulatedSensor {
    fn read(&mut self) -> Result<SensorSample, SensorFault> {
        self.reads = self.reads.saturating_add(1);
        if self.reads % DROPOUT_EVERY == 0 {
            return Err(SensorFault::Unreadable);
        }

        let temperature = 24.0 + (self.reads % 5) as f32;
        let humidity = 45.0 + (self.reads % 7) as f32;

        // The DHT11 only reports whole units.
        Ok(match self.kind {
            SensorKind::Dht11 => SensorSample {
                temperature,
                humidity,
            },
            SensorKind::Dht22 => SensorSample {
                temperature: temperature + 0.3,
                humidity: humidity + 0.6,
            },
        })
    }
}
