use tracing::{debug, info, warn};

use crate::{
    cadence::ReportCadence,
    config::BridgeConfig,
    error::{CommandError, IrError, SensorFault, TransportError},
    resilience::ConnectivityMonitor,
    synchronizer::{AcSynchronizer, CommandOutcome, SyncAction},
    telemetry::TelemetryPipeline,
    topics::{command_field, TOPIC_AC_STATE, TOPIC_LOG, TOPIC_SENSOR},
    types::{AcState, CalibratedReading, SensorPayload, SensorSample},
};

pub const MAX_MQTT_PAYLOAD_BYTES: usize = 512;

pub trait Publisher {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool)
        -> Result<(), TransportError>;
}

pub trait SensorDriver {
    fn read(&mut self) -> Result<SensorSample, SensorFault>;
}

pub trait IrTransmitter {
    fn transmit(&mut self, state: &AcState) -> Result<(), IrError>;
}

pub struct AcBridge<S, I, P> {
    sync: AcSynchronizer,
    pipeline: TelemetryPipeline,
    cadence: ReportCadence,
    link: ConnectivityMonitor,
    client_id: String,
    log_sensor_faults: bool,
    log_mqtt_connect: bool,
    fault_streak: u32,
    sensor: S,
    ir: I,
    publisher: P,
}

impl<S, I, P> AcBridge<S, I, P>
where
    S: SensorDriver,
    I: IrTransmitter,
    P: Publisher,
{
    pub fn new(config: &BridgeConfig, sensor: S, ir: I, publisher: P) -> Self {
        let mut config = config.clone();
        config.sanitize();

        Self {
            sync: AcSynchronizer::new(&config.ac),
            pipeline: TelemetryPipeline::new(&config.telemetry),
            cadence: ReportCadence::new(config.telemetry.average_count),
            link: ConnectivityMonitor::new(config.ac.retransmit_on_reconnect),
            client_id: config.network.mqtt_client_id,
            log_sensor_faults: config.telemetry.log_sensor_faults,
            log_mqtt_connect: config.network.log_mqtt_connect,
            fault_streak: 0,
            sensor,
            ir,
            publisher,
        }
    }

    pub fn state(&self) -> AcState {
        self.sync.state()
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    pub fn link(&self) -> &ConnectivityMonitor {
        &self.link
    }

    pub fn pipeline(&self) -> &TelemetryPipeline {
        &self.pipeline
    }

    pub fn ir(&self) -> &I {
        &self.ir
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Handles one inbound MQTT message.
    ///
    /// Rejected commands are reported on the log topic and never change state.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &[u8],
    ) -> Result<CommandOutcome, CommandError> {
        let result = self.dispatch(topic, payload);

        match &result {
            Ok(CommandOutcome::StateChanged { current, .. }) => {
                info!("ac state changed via {topic}: {current}");
            }
            Ok(CommandOutcome::NoChange) => {
                debug!("ac command on {topic} left state unchanged");
            }
            Err(CommandError::UnknownTopic(_)) => {
                debug!("ignoring message on unhandled topic {topic}");
            }
            Err(err) => {
                warn!("rejected ac command: {err}");
                self.publish_log(&format!("rejected command: {err}"));
            }
        }

        result
    }

    pub fn sample_tick(&mut self) -> Option<CalibratedReading> {
        let ingested = self
            .sensor
            .read()
            .and_then(|sample| self.pipeline.ingest(sample));

        match ingested {
            Ok(()) => {
                if self.fault_streak > 0 {
                    info!("sensor recovered after {} faulty sample(s)", self.fault_streak);
                    self.fault_streak = 0;
                }
            }
            Err(fault) => self.report_fault(fault),
        }

        if !self.cadence.on_sample_tick() {
            return None;
        }

        let Some(reading) = self.pipeline.tick() else {
            debug!("report window closed during sensor warm-up");
            return None;
        };

        match serde_json::to_vec(&SensorPayload::from(reading)) {
            Ok(body) => {
                if let Err(err) = self.publish(TOPIC_SENSOR, &body, false) {
                    debug!("sensor report not delivered: {err}");
                }
            }
            Err(err) => warn!("sensor payload serialization failed: {err}"),
        }

        Some(reading)
    }

    pub fn on_connected(&mut self) {
        let actions = self.link.on_connected(&self.sync);
        info!(
            "transport connected (reconnects: {}, dropped while offline: {})",
            self.link.reconnects(),
            self.link.dropped_publishes()
        );

        if self.log_mqtt_connect {
            let line = format!("{} connected, state {}", self.client_id, self.sync.state());
            self.publish_log(&line);
        }

        self.execute(actions);
    }

    pub fn on_disconnected(&mut self) {
        if self.link.on_disconnected() {
            warn!("transport disconnected, publishes will be dropped until reconnect");
        }
    }

    fn dispatch(&mut self, topic: &str, payload: &[u8]) -> Result<CommandOutcome, CommandError> {
        let field =
            command_field(topic).ok_or_else(|| CommandError::UnknownTopic(topic.to_string()))?;

        if payload.len() > MAX_MQTT_PAYLOAD_BYTES {
            return Err(CommandError::Malformed {
                topic: topic.to_string(),
                reason: format!("payload of {} bytes is oversized", payload.len()),
            });
        }
        let raw = std::str::from_utf8(payload).map_err(|_| CommandError::Malformed {
            topic: topic.to_string(),
            reason: "payload is not utf-8".to_string(),
        })?;

        let outcome = self.sync.apply_command(field, raw)?;
        self.execute(outcome.actions().to_vec());
        Ok(outcome)
    }

    fn execute(&mut self, actions: Vec<SyncAction>) {
        for action in actions {
            match action {
                SyncAction::Transmit(state) => {
                    if let Err(err) = self.ir.transmit(&state) {
                        warn!("ir transmit of {state} failed: {err}");
                        self.publish_log(&err.to_string());
                    }
                }
                SyncAction::PublishStatus(state) => match serde_json::to_vec(&state) {
                    Ok(body) => {
                        if let Err(err) = self.publish(TOPIC_AC_STATE, &body, true) {
                            debug!("ac status not delivered: {err}");
                        }
                    }
                    Err(err) => warn!("ac status serialization failed: {err}"),
                },
            }
        }
    }

    fn report_fault(&mut self, fault: SensorFault) {
        self.fault_streak = self.fault_streak.saturating_add(1);
        if self.fault_streak > 1 {
            debug!("sensor fault persists ({} in a row): {fault}", self.fault_streak);
            return;
        }

        warn!("discarding sensor sample: {fault}");
        if self.log_sensor_faults {
            self.publish_log(&format!("sensor fault: {fault}"));
        }
    }

    fn publish_log(&mut self, line: &str) {
        if let Err(err) = self.publish(TOPIC_LOG, line.as_bytes(), false) {
            debug!("log line not delivered: {err}");
        }
    }

    /// Sends now or drops; nothing is queued across an outage.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError> {
        if !self.link.is_connected() {
            self.link.note_dropped();
            return Err(TransportError::Unavailable {
                topic: topic.to_string(),
            });
        }

        let result = self.publisher.publish(topic, payload, retain);
        if let Err(err) = &result {
            warn!("mqtt publish failed: {err}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        config::Calibration,
        topics::{TOPIC_CMD_FAN, TOPIC_CMD_MODE, TOPIC_CMD_POWER, TOPIC_CMD_TEMP},
        types::{AcMode, FanSpeed, Power},
    };

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Vec<(String, String, bool)>,
        reject: bool,
    }

    impl RecordingPublisher {
        fn on(&self, topic: &str) -> Vec<String> {
            self.sent
                .iter()
                .filter(|(sent_topic, _, _)| sent_topic == topic)
                .map(|(_, payload, _)| payload.clone())
                .collect()
        }
    }

    impl Publisher for RecordingPublisher {
        fn publish(
            &mut self,
            topic: &str,
            payload: &[u8],
            retain: bool,
        ) -> Result<(), TransportError> {
            if self.reject {
                return Err(TransportError::Rejected {
                    topic: topic.to_string(),
                    reason: "client queue full".to_string(),
                });
            }
            self.sent.push((
                topic.to_string(),
                String::from_utf8_lossy(payload).into_owned(),
                retain,
            ));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingTransmitter {
        frames: Vec<AcState>,
        fail: bool,
    }

    impl IrTransmitter for RecordingTransmitter {
        fn transmit(&mut self, state: &AcState) -> Result<(), IrError> {
            if self.fail {
                return Err(IrError::Transmit("led driver fault".to_string()));
            }
            self.frames.push(*state);
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedSensor {
        script: VecDeque<Result<SensorSample, SensorFault>>,
    }

    impl ScriptedSensor {
        fn with(samples: impl IntoIterator<Item = Result<SensorSample, SensorFault>>) -> Self {
            Self {
                script: samples.into_iter().collect(),
            }
        }
    }

    impl SensorDriver for ScriptedSensor {
        fn read(&mut self) -> Result<SensorSample, SensorFault> {
            self.script.pop_front().unwrap_or(Err(SensorFault::Unreadable))
        }
    }

    type TestBridge = AcBridge<ScriptedSensor, RecordingTransmitter, RecordingPublisher>;

    fn ok(temperature: f32, humidity: f32) -> Result<SensorSample, SensorFault> {
        Ok(SensorSample {
            temperature,
            humidity,
        })
    }

    fn identity_config(average_count: usize) -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.telemetry.average_count = average_count;
        config.telemetry.temperature = Calibration::IDENTITY;
        config.telemetry.humidity = Calibration::IDENTITY;
        config
    }

    fn connected_bridge(config: &BridgeConfig, sensor: ScriptedSensor) -> TestBridge {
        let mut bridge = AcBridge::new(
            config,
            sensor,
            RecordingTransmitter::default(),
            RecordingPublisher::default(),
        );
        bridge.on_connected();
        bridge
    }

    #[test]
    fn first_connect_publishes_retained_state() {
        let bridge = connected_bridge(&BridgeConfig::default(), ScriptedSensor::default());

        assert_eq!(
            bridge.publisher().sent,
            vec![(
                TOPIC_AC_STATE.to_string(),
                r#"{"power":"off","mode":"auto","temp":24,"fan":"auto","swing":"off"}"#
                    .to_string(),
                true,
            )]
        );
        assert!(bridge.ir().frames.is_empty());
    }

    #[test]
    fn repeated_mode_command_transmits_once() {
        let mut bridge = connected_bridge(&BridgeConfig::default(), ScriptedSensor::default());
        bridge.handle_message(TOPIC_CMD_POWER, b"on").unwrap();

        bridge.handle_message(TOPIC_CMD_MODE, b"cool").unwrap();
        let repeat = bridge.handle_message(TOPIC_CMD_MODE, b"cool").unwrap();

        assert_eq!(repeat, CommandOutcome::NoChange);
        assert_eq!(bridge.ir().frames.len(), 2);
        assert_eq!(bridge.ir().frames[1].mode, AcMode::Cool);
        assert_eq!(bridge.publisher().on(TOPIC_AC_STATE).len(), 3);
    }

    #[test]
    fn edits_while_off_ride_along_with_power_on() {
        let mut bridge = connected_bridge(&BridgeConfig::default(), ScriptedSensor::default());
        bridge.handle_message(TOPIC_CMD_POWER, b"on").unwrap();
        bridge.handle_message(TOPIC_CMD_POWER, b"off").unwrap();
        assert_eq!(bridge.ir().frames.len(), 2);

        bridge.handle_message(TOPIC_CMD_FAN, b"high").unwrap();
        bridge.handle_message(TOPIC_CMD_TEMP, b"19").unwrap();
        assert_eq!(bridge.ir().frames.len(), 2);
        assert_eq!(bridge.state().fan_speed, FanSpeed::High);

        bridge.handle_message(TOPIC_CMD_POWER, b"on").unwrap();
        let last = bridge.ir().frames.last().copied().unwrap();
        assert_eq!(last.power, Power::On);
        assert_eq!(last.fan_speed, FanSpeed::High);
        assert_eq!(last.target_temp, 19);
    }

    #[test]
    fn invalid_command_is_logged_and_ignored() {
        let mut bridge = connected_bridge(&BridgeConfig::default(), ScriptedSensor::default());
        let before = bridge.state();

        let err = bridge.handle_message(TOPIC_CMD_MODE, b"blast").unwrap_err();

        assert!(matches!(err, CommandError::InvalidValue { .. }));
        assert_eq!(bridge.state(), before);
        assert!(bridge.ir().frames.is_empty());
        assert_eq!(
            bridge.publisher().on(TOPIC_LOG),
            vec![r#"rejected command: invalid mode value "blast""#.to_string()]
        );
    }

    #[test]
    fn malformed_and_unknown_messages_are_rejected() {
        let mut bridge = connected_bridge(&BridgeConfig::default(), ScriptedSensor::default());

        assert!(matches!(
            bridge.handle_message(TOPIC_CMD_POWER, &[0xff, 0xfe]),
            Err(CommandError::Malformed { .. })
        ));
        assert!(matches!(
            bridge.handle_message(TOPIC_CMD_POWER, &vec![b'o'; MAX_MQTT_PAYLOAD_BYTES + 1]),
            Err(CommandError::Malformed { .. })
        ));
        assert_eq!(
            bridge.handle_message("home/living/ac/volume/set", b"11"),
            Err(CommandError::UnknownTopic("home/living/ac/volume/set".to_string()))
        );
        assert_eq!(bridge.publisher().on(TOPIC_LOG).len(), 2);
    }

    #[test]
    fn reports_once_per_window_after_warm_up() {
        let sensor = ScriptedSensor::with((1..=6).map(|n| ok(n as f32, 50.0)));
        let mut bridge = connected_bridge(&identity_config(3), sensor);

        let reports: Vec<Option<f32>> = (0..6)
            .map(|_| bridge.sample_tick().map(|reading| reading.temperature))
            .collect();

        assert_eq!(reports, vec![None, None, Some(2.0), None, None, Some(5.0)]);
        assert_eq!(
            bridge.publisher().on(TOPIC_SENSOR),
            vec![
                r#"{"temperature":2.0,"humidity":50.0}"#.to_string(),
                r#"{"temperature":5.0,"humidity":50.0}"#.to_string(),
            ]
        );
    }

    #[test]
    fn sensor_faults_are_skipped_and_logged_once_per_streak() {
        let sensor = ScriptedSensor::with([
            ok(20.0, 40.0),
            Err(SensorFault::Unreadable),
            ok(f32::NAN, 40.0),
            ok(22.0, 44.0),
        ]);
        let mut bridge = connected_bridge(&identity_config(2), sensor);

        let reports: Vec<_> = (0..4).map(|_| bridge.sample_tick()).collect();

        assert_eq!(reports[1], None);
        assert_eq!(
            reports[3],
            Some(CalibratedReading {
                temperature: 21.0,
                humidity: 42.0,
            })
        );
        assert_eq!(
            bridge.publisher().on(TOPIC_LOG),
            vec!["sensor fault: sensor did not answer".to_string()]
        );
    }

    #[test]
    fn publishes_while_offline_are_dropped_not_queued() {
        let mut bridge = connected_bridge(&BridgeConfig::default(), ScriptedSensor::default());
        bridge.on_disconnected();
        let published_before = bridge.publisher().sent.len();

        bridge.handle_message(TOPIC_CMD_POWER, b"on").unwrap();

        assert_eq!(bridge.ir().frames.len(), 1);
        assert_eq!(bridge.publisher().sent.len(), published_before);
        assert_eq!(bridge.link().dropped_publishes(), 1);

        bridge.on_connected();
        let status = bridge.publisher().on(TOPIC_AC_STATE);
        assert_eq!(
            status.last().map(String::as_str),
            Some(r#"{"power":"on","mode":"auto","temp":24,"fan":"auto","swing":"off"}"#)
        );
        assert_eq!(bridge.link().reconnects(), 1);
    }

    #[test]
    fn reconnect_can_retransmit_and_announce() {
        let mut config = BridgeConfig::default();
        config.ac.retransmit_on_reconnect = true;
        config.network.log_mqtt_connect = true;
        let mut bridge = connected_bridge(&config, ScriptedSensor::default());
        assert!(bridge.ir().frames.is_empty());

        bridge.on_disconnected();
        bridge.on_connected();

        assert_eq!(bridge.ir().frames, vec![bridge.state()]);
        assert_eq!(bridge.publisher().on(TOPIC_LOG).len(), 2);
        assert!(bridge.publisher().on(TOPIC_LOG)[0].starts_with("home_sensor1_dht11 connected"));
    }

    #[test]
    fn ir_failure_keeps_canonical_state() {
        let mut bridge = AcBridge::new(
            &BridgeConfig::default(),
            ScriptedSensor::default(),
            RecordingTransmitter {
                frames: Vec::new(),
                fail: true,
            },
            RecordingPublisher::default(),
        );
        bridge.on_connected();

        let outcome = bridge.handle_message(TOPIC_CMD_POWER, b"on").unwrap();

        assert!(outcome.is_changed());
        assert_eq!(bridge.state().power, Power::On);
        assert_eq!(
            bridge.publisher().on(TOPIC_LOG),
            vec!["ir transmit failed: led driver fault".to_string()]
        );
    }

    #[test]
    fn fault_logging_can_be_disabled() {
        let mut config = identity_config(2);
        config.telemetry.log_sensor_faults = false;
        let sensor = ScriptedSensor::with([Err(SensorFault::Unreadable), ok(f32::NAN, 40.0)]);
        let mut bridge = connected_bridge(&config, sensor);

        bridge.sample_tick();
        bridge.sample_tick();

        assert!(bridge.publisher().on(TOPIC_LOG).is_empty());
        assert_eq!(bridge.pipeline().rejected_samples(), 1);
    }

    #[test]
    fn rejected_publish_still_updates_and_transmits() {
        let mut bridge = connected_bridge(&BridgeConfig::default(), ScriptedSensor::default());
        bridge.publisher.reject = true;

        let outcome = bridge.handle_message(TOPIC_CMD_POWER, b"on").unwrap();

        assert!(outcome.is_changed());
        assert_eq!(bridge.state().power, Power::On);
        assert_eq!(bridge.ir().frames.len(), 1);
        assert_eq!(bridge.publisher().sent.len(), 1);
        assert!(bridge.is_connected());
        assert_eq!(bridge.link().dropped_publishes(), 0);
    }
}
