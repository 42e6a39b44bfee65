use crate::model::SourceKind;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

pub const REPORT_FILE_NAME: &str = "trcara.txt";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_filter_date_from")]
    pub filter_date_from: NaiveDate,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_known_races_url")]
    pub known_races_url: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub itra: ItraConfig,
    #[serde(default)]
    pub trka: TrkaConfig,
    #[serde(default)]
    pub runtrace: RunTraceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter_date_from: default_filter_date_from(),
            output_path: None,
            known_races_url: default_known_races_url(),
            http: HttpConfig::default(),
            itra: ItraConfig::default(),
            trka: TrkaConfig::default(),
            runtrace: RunTraceConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.known_races_url.trim().is_empty() {
            bail!("known_races_url must not be empty");
        }
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be greater than zero");
        }

        for kind in SourceKind::ALL {
            if !self.is_enabled(kind) {
                continue;
            }
            let base_url = self.base_url(kind);
            if base_url.trim().is_empty() {
                bail!("{kind}.base_url must not be empty");
            }
            Url::parse(base_url).with_context(|| format!("invalid {kind}.base_url {base_url}"))?;
        }

        if self.itra.enabled && self.itra.countries.is_empty() {
            bail!("itra.countries must list at least one country code");
        }

        Ok(())
    }

    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Itra => self.itra.enabled,
            SourceKind::Trka => self.trka.enabled,
            SourceKind::RunTrace => self.runtrace.enabled,
        }
    }

    pub fn base_url(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Itra => &self.itra.base_url,
            SourceKind::Trka => &self.trka.base_url,
            SourceKind::RunTrace => &self.runtrace.base_url,
        }
    }

    /// Disables every source not listed. An empty list leaves the config alone.
    pub fn restrict_sources(&mut self, keep: &[SourceKind]) {
        if keep.is_empty() {
            return;
        }
        self.itra.enabled &= keep.contains(&SourceKind::Itra);
        self.trka.enabled &= keep.contains(&SourceKind::Trka);
        self.runtrace.enabled &= keep.contains(&SourceKind::RunTrace);
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_path.clone().unwrap_or_else(default_report_path)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItraConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_itra_base_url")]
    pub base_url: String,
    #[serde(default = "default_itra_countries")]
    pub countries: Vec<String>,
    #[serde(default = "default_country_aliases")]
    pub country_aliases: BTreeMap<String, String>,
}

impl Default for ItraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_itra_base_url(),
            countries: default_itra_countries(),
            country_aliases: default_country_aliases(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrkaConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_trka_base_url")]
    pub base_url: String,
    #[serde(default = "default_trka_language")]
    pub language: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for TrkaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_trka_base_url(),
            language: default_trka_language(),
            country: default_country(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunTraceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_runtrace_base_url")]
    pub base_url: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for RunTraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_runtrace_base_url(),
            country: default_country(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<AppConfig>(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))
}

pub fn default_report_path() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(REPORT_FILE_NAME)
}

fn default_true() -> bool {
    true
}

fn default_filter_date_from() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()
}

fn default_known_races_url() -> String {
    "https://docs.google.com/spreadsheets/d/1o3LivaIhBS0M1_bG9H8Pq_9K57AVFo0H40h0MzCOICs/gviz/tq?tqx=out:csv&tq=select%20B,C"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("trcara/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_itra_base_url() -> String {
    "https://itra.run".to_string()
}

fn default_itra_countries() -> Vec<String> {
    ["AL", "BA", "ME", "GE", "MK", "TR"]
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

fn default_country_aliases() -> BTreeMap<String, String> {
    [
        ("TUR", "Turkey"),
        ("MKD", "NMK"),
        ("BIH", "Bosnia"),
        ("GEO", "Georgia"),
        ("MNE", "Montenegro"),
    ]
    .into_iter()
    .map(|(code, name)| (code.to_string(), name.to_string()))
    .collect()
}

fn default_trka_base_url() -> String {
    "https://www.trka.rs".to_string()
}

fn default_trka_language() -> String {
    "sr-RS".to_string()
}

fn default_runtrace_base_url() -> String {
    "https://runtrace.net".to_string()
}

fn default_country() -> String {
    "Serbia".to_string()
}
