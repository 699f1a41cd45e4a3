use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::entries::ValidationPolicy;

const MAX_EFFICIENCY_DECIMALS: u32 = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub validation: ValidationPolicy,
}

impl UserSettings {
    /// Replaces out-of-range values with their defaults.
    fn sanitized(mut self) -> Self {
        let defaults = ValidationPolicy::default();
        let tolerance = self.validation.tolerance_hours;
        if !tolerance.is_finite() || tolerance < 0.0 {
            warn!("Ignoring invalid toleranceHours {tolerance}, using {}", defaults.tolerance_hours);
            self.validation.tolerance_hours = defaults.tolerance_hours;
        }
        let decimals = self.validation.efficiency_decimals;
        if decimals > MAX_EFFICIENCY_DECIMALS {
            warn!(
                "Ignoring efficiencyDecimals {decimals} (max {MAX_EFFICIENCY_DECIMALS}), using {}",
                defaults.efficiency_decimals
            );
            self.validation.efficiency_decimals = defaults.efficiency_decimals;
        }
        self
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<UserSettings>(&contents) {
                Ok(settings) => settings.sanitized(),
                Err(err) => {
                    warn!("Unreadable settings in {}, using defaults: {err}", path.display());
                    UserSettings::default()
                }
            }
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn current(&self) -> UserSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        self.current().validation
    }

    pub fn update_validation(&self, policy: ValidationPolicy) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = UserSettings { validation: policy }.sanitized();
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.validation_policy(), ValidationPolicy::default());
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let policy = ValidationPolicy {
            tolerance_hours: 0.05,
            efficiency_decimals: 1,
        };
        store.update_validation(policy).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"toleranceHours\": 0.05"));

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.validation_policy(), policy);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"validation": {"efficiencyDecimals": 3}}"#).unwrap();

        let policy = SettingsStore::new(path).unwrap().validation_policy();
        assert_eq!(policy.efficiency_decimals, 3);
        assert_eq!(policy.tolerance_hours, 0.01);
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.current(), UserSettings::default());
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"validation": {"toleranceHours": -1.0, "efficiencyDecimals": 40}}"#,
        )
        .unwrap();

        let policy = SettingsStore::new(path).unwrap().validation_policy();
        assert_eq!(policy, ValidationPolicy::default());
    }
}
