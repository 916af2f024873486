use std::time::Duration;

use anyhow::Context;
use rumqttc::{AsyncClient, ClientError, Event, EventLoop, Incoming, MqttOptions, QoS};
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use ac_bridge_common::{AcBridge, Publisher, TransportError, COMMAND_TOPICS};

use crate::{
    ir::LoggingIrTransmitter,
    sensor::SimulatedSensor,
    store::{apply_network_overrides, ConfigStore},
};

const DIAGNOSTICS_INTERVAL: Duration = Duration::from_secs(300);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

type HostBridge = AcBridge<SimulatedSensor, LoggingIrTransmitter, MqttPublisher>;

#[derive(Debug)]
enum BridgeEvent {
    Message { topic: String, payload: Vec<u8> },
    Connected,
    Disconnected,
}

struct MqttPublisher {
    client: AsyncClient,
}

impl Publisher for MqttPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), TransportError> {
        let qos = if retain {
            QoS::AtLeastOnce
        } else {
            QoS::AtMostOnce
        };

        self.client
            .try_publish(topic, qos, retain, payload.to_vec())
            .map_err(|err| TransportError::Rejected {
                topic: topic.to_string(),
                reason: err.to_string(),
            })
    }
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = ConfigStore::from_env();
    let mut config = store.load().await?;
    apply_network_overrides(&mut config.network, |key| std::env::var(key).ok());
    config.sanitize();
    info!("loaded config from {}", store.path().display());
    info!("network: {}", config.network.link_summary());

    let mut mqtt_options = MqttOptions::new(
        config.network.mqtt_client_id.clone(),
        config.network.mqtt_host.clone(),
        config.network.mqtt_port,
    );
    mqtt_options.set_keep_alive(Duration::from_secs(30));
    if !config.network.mqtt_user.is_empty() {
        mqtt_options.set_credentials(
            config.network.mqtt_user.clone(),
            config.network.mqtt_pass.clone(),
        );
    }

    let (mqtt, eventloop) = AsyncClient::new(mqtt_options, 64);
    let (events_tx, events_rx) = mpsc::channel(64);
    spawn_mqtt_loop(mqtt.clone(), eventloop, events_tx);

    let bridge = AcBridge::new(
        &config,
        SimulatedSensor::new(&config.hardware),
        LoggingIrTransmitter::new(&config.hardware),
        MqttPublisher { client: mqtt },
    );

    info!(
        "ac bridge started: mqtt {}:{} as {}, reporting every {}ms",
        config.network.mqtt_host,
        config.network.mqtt_port,
        config.network.mqtt_client_id,
        config.telemetry.report_interval_ms()
    );

    run_worker(
        bridge,
        events_rx,
        Duration::from_millis(config.telemetry.sample_interval_ms),
    )
    .await?;
    Ok(())
}

fn subscribe_topics(mqtt: &AsyncClient) -> Result<(), ClientError> {
    for topic in COMMAND_TOPICS {
        mqtt.try_subscribe(topic, QoS::AtMostOnce)?;
    }
    Ok(())
}

// Drives the rumqttc event loop and forwards what matters to the worker.
// Subscriptions are renewed on every ConnAck since the session is clean.
fn spawn_mqtt_loop(mqtt: AsyncClient, mut eventloop: EventLoop, events: mpsc::Sender<BridgeEvent>) {
    tokio::spawn(async move {
        let mut connected = false;
        loop {
            let (event, backoff) = match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message))) => (
                    Some(BridgeEvent::Message {
                        topic: message.topic,
                        payload: message.payload.to_vec(),
                    }),
                    false,
                ),
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("mqtt connected");
                    connected = true;
                    if let Err(err) = subscribe_topics(&mqtt) {
                        warn!("mqtt subscribe failed: {err}");
                    }
                    (Some(BridgeEvent::Connected), false)
                }
                Ok(_) => (None, false),
                Err(err) => {
                    warn!("mqtt poll error: {err}");
                    let event = std::mem::replace(&mut connected, false)
                        .then_some(BridgeEvent::Disconnected);
                    (event, true)
                }
            };

            if let Some(event) = event {
                if events.send(event).await.is_err() {
                    debug!("bridge worker gone, stopping mqtt loop");
                    break;
                }
            }
            if backoff {
                tokio::time::sleep(RECONNECT_BACKOFF).await;
            }
        }
    });
}

async fn run_worker(
    mut bridge: HostBridge,
    mut events: mpsc::Receiver<BridgeEvent>,
    sample_interval: Duration,
) -> anyhow::Result<HostBridge> {
    let mut samples = tokio::time::interval(sample_interval);
    samples.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut diagnostics = tokio::time::interval(DIAGNOSTICS_INTERVAL);
    diagnostics.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = samples.tick() => {
                if let Some(reading) = bridge.sample_tick() {
                    debug!(
                        "sensor report: {:.2}C {:.2}%",
                        reading.temperature, reading.humidity
                    );
                }
            }
            event = events.recv() => match event {
                Some(BridgeEvent::Message { topic, payload }) => {
                    if let Err(err) = bridge.handle_message(&topic, &payload) {
                        debug!("mqtt message handling error: {err}");
                    }
                }
                Some(BridgeEvent::Connected) => bridge.on_connected(),
                Some(BridgeEvent::Disconnected) => bridge.on_disconnected(),
                None => {
                    warn!("mqtt event channel closed");
                    break;
                }
            },
            _ = diagnostics.tick() => log_diagnostics(&bridge),
            result = &mut shutdown => {
                result.context("failed to listen for shutdown signal")?;
                info!("shutdown requested, final state {}", bridge.state());
                break;
            }
        }
    }

    Ok(bridge)
}

fn log_diagnostics(bridge: &HostBridge) {
    let pipeline = bridge.pipeline();
    info!(
        "telemetry: {} accepted, {} rejected, warm={}; link: connected={} reconnects={} dropped={}",
        pipeline.accepted_samples(),
        pipeline.rejected_samples(),
        pipeline.is_warm(),
        bridge.is_connected(),
        bridge.link().reconnects(),
        bridge.link().dropped_publishes()
    );

    match serde_json::to_string(&bridge.ir().diagnostics()) {
        Ok(body) => info!("ir diagnostics: {body}"),
        Err(err) => warn!("ir diagnostics serialization failed: {err}"),
    }
}
