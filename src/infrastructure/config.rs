use crate::application::summary_deriver::DisplayZone;
use chrono::FixedOffset;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub source: SourceSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub batch_url: String,
    pub live_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8090".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplaySettings {
    /// Fixed display offset east of UTC. Platform local time when unset.
    pub utc_offset_minutes: Option<i32>,
}

impl DisplaySettings {
    pub fn zone(&self) -> anyhow::Result<DisplayZone> {
        match self.utc_offset_minutes {
            None => Ok(DisplayZone::Local),
            Some(minutes) => FixedOffset::east_opt(minutes.saturating_mul(60))
                .map(DisplayZone::Fixed)
                .ok_or_else(|| anyhow::anyhow!("display.utc_offset_minutes out of range: {}", minutes)),
        }
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("NETMON").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
