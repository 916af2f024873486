pub mod averaging;
pub mod bridge;
pub mod cadence;
pub mod config;
pub mod error;
pub mod resilience;
pub mod synchronizer;
pub mod telemetry;
pub mod topics;
pub mod types;

pub use bridge::{AcBridge, IrTransmitter, Publisher, SensorDriver, MAX_MQTT_PAYLOAD_BYTES};
pub use config::{
    AcConfig, BridgeConfig, Calibration, HardwareConfig, NetworkConfig, SensorKind,
    TelemetryConfig,
};
pub use error::{Channel, CommandError, IrError, SensorFault, TransportError};
pub use synchronizer::{AcSynchronizer, CommandOutcome, SyncAction};
pub use telemetry::TelemetryPipeline;
pub use topics::*;
pub use types::{
    AcField, AcMode, AcState, CalibratedReading, FanSpeed, FieldUpdate, Power, SensorSample,
    Swing,
};
