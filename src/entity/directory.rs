use std::collections::HashMap;

use crate::config::EntityLabelConfig;

/// A known-entity label for one address.
#[derive(Debug, Clone)]
pub struct EntityLabel {
    pub address: String,
    pub entity_name: String,
    pub entity_type: String,
    pub risk_tier: String,
}

/// Lookup-by-address capability injected into the engine. Keeps the known
/// entity table swappable without touching analysis logic.
pub trait EntityDirectory {
    /// Look up the label for a (lowercase-normalized) address.
    fn lookup(&self, address: &str) -> Option<&EntityLabel>;

    fn is_mixer(&self, address: &str) -> bool {
        self.lookup(address)
            .map(|label| label.entity_type == "mixer")
            .unwrap_or(false)
    }

    fn is_bridge(&self, address: &str) -> bool {
        self.lookup(address)
            .map(|label| label.entity_type == "bridge")
            .unwrap_or(false)
    }

    fn is_exchange(&self, address: &str) -> bool {
        self.lookup(address)
            .map(|label| label.entity_type == "exchange")
            .unwrap_or(false)
    }
}

/// In-memory directory keyed by lowercase address.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    by_address: HashMap<String, EntityLabel>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: EntityLabel) {
        let key = label.address.trim().to_lowercase();
        self.by_address.insert(
            key.clone(),
            EntityLabel {
                address: key,
                ..label
            },
        );
    }

    /// Seed labels from config entries.
    pub fn seed_labels(&mut self, labels: &[EntityLabelConfig]) {
        for config in labels {
            self.insert(EntityLabel {
                address: config.address.clone(),
                entity_name: config.entity_name.clone(),
                entity_type: config.entity_type.clone(),
                risk_tier: config.risk_tier.clone(),
            });
        }
        tracing::info!(labels = self.by_address.len(), "Seeded entity labels");
    }

    /// Load a watchlist CSV. Expected columns: address, entity_name,
    /// entity_type, risk_tier. Rows without an address are skipped.
    pub fn load_csv(&mut self, path: &str) -> eyre::Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| eyre::eyre!("Failed to open watchlist CSV '{}': {}", path, e))?;

        let mut count = 0;
        for result in reader.records() {
            let record = result?;
            let address = record.get(0).unwrap_or("").trim().to_string();
            if address.is_empty() {
                continue;
            }
            self.insert(EntityLabel {
                address,
                entity_name: record.get(1).unwrap_or("").trim().to_string(),
                entity_type: record.get(2).unwrap_or("unknown").trim().to_string(),
                risk_tier: record.get(3).unwrap_or("medium").trim().to_string(),
            });
            count += 1;
        }

        tracing::info!(entries = count, path, "Loaded watchlist entries");
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

impl EntityDirectory for InMemoryDirectory {
    fn lookup(&self, address: &str) -> Option<&EntityLabel> {
        self.by_address.get(&address.trim().to_lowercase())
    }
}
