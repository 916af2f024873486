use chrono::Utc;
use serde::Serialize;
use tracing::info;

use ac_bridge_common::{AcState, HardwareConfig, IrError, IrTransmitter};

pub struct LoggingIrTransmitter {
    tx_pin: i32,
    carrier_khz: u32,
    sent_frames: u64,
    last_send_epoch: Option<i64>,
    last_frame: Option<AcState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IrDiagnostics {
    #[serde(rename = "txPin")]
    pub tx_pin: i32,
    #[serde(rename = "carrierKHz")]
    pub carrier_khz: u32,
    #[serde(rename = "sentFrames")]
    pub sent_frames: u64,
    #[serde(rename = "lastSendEpoch")]
    pub last_send_epoch: Option<i64>,
    #[serde(rename = "lastFrame")]
    pub last_frame: Option<AcState>,
}

impl LoggingIrTransmitter {
    pub fn new(hardware: &HardwareConfig) -> Self {
        Self {
            tx_pin: hardware.ir_tx_pin,
            carrier_khz: hardware.ir_carrier_khz,
            sent_frames: 0,
            last_send_epoch: None,
            last_frame: None,
        }
    }

    pub fn diagnostics(&self) -> IrDiagnostics {
        IrDiagnostics {
            tx_pin: self.tx_pin,
            carrier_khz: self.carrier_khz,
            sent_frames: self.sent_frames,
            last_send_epoch: self.last_send_epoch,
            last_frame: self.last_frame,
        }
    }
}

impl IrTransmitter for LoggingIrTransmitter {
    fn transmit(&mut self, state: &AcState) -> Result<(), IrError> {
        info!(
            "ir frame on GPIO{} @ {}kHz: {state}",
            self.tx_pin, self.carrier_khz
        );
        self.sent_frames = self.sent_frames.saturating_add(1);
        self.last_send_epoch = Some(Utc::now().timestamp());
        self.last_frame = Some(*state);
        Ok(())
    }
}
