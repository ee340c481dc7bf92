use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub entity_directory: EntityDirectoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Chain-specific denomination exponent: raw value / 10^exponent.
    #[serde(default = "default_denomination_exponent")]
    pub denomination_exponent: u32,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub circular: CircularConfig,
    #[serde(default)]
    pub anomaly: AnomalyConfig,
    #[serde(default)]
    pub taint: TaintConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            denomination_exponent: 18,
            patterns: PatternConfig::default(),
            clustering: ClusteringConfig::default(),
            circular: CircularConfig::default(),
            anomaly: AnomalyConfig::default(),
            taint: TaintConfig::default(),
        }
    }
}

fn default_denomination_exponent() -> u32 {
    18
}

#[derive(Debug, Deserialize, Clone)]
pub struct PatternConfig {
    /// A delta counts as rapid when 0 < delta < this window.
    #[serde(default = "default_rapid_window_secs")]
    pub rapid_window_secs: i64,
    /// Fraction of deltas that must be rapid to set the flag.
    #[serde(default = "default_rapid_fraction")]
    pub rapid_fraction: f64,
    /// Normalized amounts strictly below this are dust.
    #[serde(default = "default_dust_threshold")]
    pub dust_threshold: f64,
    /// Transaction count above which the wallet is high-frequency.
    #[serde(default = "default_high_frequency_min")]
    pub high_frequency_min: usize,
    /// Minimum transaction count for the layering check.
    #[serde(default = "default_layering_min")]
    pub layering_min: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            rapid_window_secs: 60,
            rapid_fraction: 0.3,
            dust_threshold: 0.01,
            high_frequency_min: 50,
            layering_min: 20,
        }
    }
}

fn default_rapid_window_secs() -> i64 {
    60
}

fn default_rapid_fraction() -> f64 {
    0.3
}

fn default_dust_threshold() -> f64 {
    0.01
}

fn default_high_frequency_min() -> usize {
    50
}

fn default_layering_min() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClusteringConfig {
    /// Maximum gap between consecutive transactions in a timing cluster.
    #[serde(default = "default_timing_gap_secs")]
    pub timing_gap_secs: i64,
    /// Minimum size for a timing cluster to be reported.
    #[serde(default = "default_timing_min_cluster")]
    pub timing_min_cluster: usize,
    /// Outgoing amounts below this flag the recipient as a dust target.
    #[serde(default = "default_dust_send_threshold")]
    pub dust_send_threshold: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            timing_gap_secs: 300,
            timing_min_cluster: 5,
            dust_send_threshold: 0.1,
        }
    }
}

fn default_timing_gap_secs() -> i64 {
    300
}

fn default_timing_min_cluster() -> usize {
    5
}

fn default_dust_send_threshold() -> f64 {
    0.1
}

#[derive(Debug, Deserialize, Clone)]
pub struct CircularConfig {
    #[serde(default = "default_circular_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_circular_max_findings")]
    pub max_findings: usize,
}

impl Default for CircularConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_findings: 10,
        }
    }
}

fn default_circular_max_depth() -> usize {
    3
}

fn default_circular_max_findings() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnomalyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Expected fraction of the batch assumed anomalous.
    #[serde(default = "default_contamination")]
    pub contamination: f64,
    /// Seed for the isolation forest, fixed for reproducible runs.
    #[serde(default = "default_anomaly_seed")]
    pub seed: u64,
    /// Batches smaller than this yield no anomalies.
    #[serde(default = "default_min_transactions")]
    pub min_transactions: usize,
    #[serde(default = "default_tree_count")]
    pub tree_count: usize,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            contamination: 0.1,
            seed: 42,
            min_transactions: 10,
            tree_count: 100,
            sample_size: 256,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_contamination() -> f64 {
    0.1
}

fn default_anomaly_seed() -> u64 {
    42
}

fn default_min_transactions() -> usize {
    10
}

fn default_tree_count() -> usize {
    100
}

fn default_sample_size() -> usize {
    256
}

#[derive(Debug, Deserialize, Clone)]
pub struct TaintConfig {
    #[serde(default = "default_taint_max_depth")]
    pub max_depth: usize,
}

impl Default for TaintConfig {
    fn default() -> Self {
        Self { max_depth: 10 }
    }
}

fn default_taint_max_depth() -> usize {
    10
}

// ============================================================
// Entity Directory Config
// ============================================================

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EntityDirectoryConfig {
    /// CSV watchlist: address, entity_name, entity_type, risk_tier per row.
    pub watchlist_path: Option<String>,
    #[serde(default)]
    pub labels: Vec<EntityLabelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EntityLabelConfig {
    pub address: String,
    pub entity_name: String,
    pub entity_type: String,
    #[serde(default = "default_risk_tier")]
    pub risk_tier: String,
}

fn default_risk_tier() -> String {
    "medium".to_string()
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        let anomaly = &self.analysis.anomaly;
        if anomaly.contamination <= 0.0 || anomaly.contamination >= 1.0 {
            return Err(eyre::eyre!(
                "anomaly contamination must be in (0, 1), got {}",
                anomaly.contamination
            ));
        }
        if anomaly.tree_count == 0 || anomaly.sample_size < 2 {
            return Err(eyre::eyre!(
                "anomaly forest needs at least one tree and a sample size of 2"
            ));
        }
        if self.analysis.circular.max_depth == 0 {
            return Err(eyre::eyre!("circular max_depth must be at least 1"));
        }
        for label in &self.entity_directory.labels {
            if label.address.trim().is_empty() {
                return Err(eyre::eyre!(
                    "entity label '{}' has an empty address",
                    label.entity_name
                ));
            }
        }
        Ok(())
    }
}
