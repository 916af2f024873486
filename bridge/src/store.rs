use std::{io::ErrorKind, path::PathBuf};

use anyhow::Context;

use ac_bridge_common::{BridgeConfig, NetworkConfig};

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_env() -> Self {
        let path = std::env::var("AC_BRIDGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.ac-bridge/config.json"));
        Self { path }
    }

    #[cfg(test)]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn load(&self) -> anyhow::Result<BridgeConfig> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => serde_json::from_slice::<BridgeConfig>(&raw)
                .with_context(|| format!("invalid config file {}", self.path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BridgeConfig::default()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to read config file {}", self.path.display())),
        }
    }
}

pub fn apply_network_overrides(
    network: &mut NetworkConfig,
    var: impl Fn(&str) -> Option<String>,
) {
    if let Some(host) = var("MQTT_HOST") {
        network.mqtt_host = host;
    }
    if let Some(port) = var("MQTT_PORT").and_then(|value| value.parse::<u16>().ok()) {
        network.mqtt_port = port;
    }
    if let Some(user) = var("MQTT_USER") {
        network.mqtt_user = user;
        network.mqtt_pass = var("MQTT_PASS").unwrap_or_default();
    }
    if let Some(client_id) = var("MQTT_CLIENT_ID") {
        network.mqtt_client_id = client_id;
    }
}
