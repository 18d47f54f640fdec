//! Configuration management for rsp-vu.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (`RSP_VU_BACKEND`, `RSP_VU_VCE_PACKING`, `RSP_VU_VALIDATE`)
//! 2. Project-local config file (`./rsp-vu.toml`)
//! 3. User config file (`~/.config/rsp-vu/config.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # rsp-vu.toml
//!
//! # Vector backend: "auto", "generic" or "accelerated"
//! backend = "auto"
//!
//! # How CFC2 widens VCE: "zero-extended" or "sign-extended"
//! vce_packing = "zero-extended"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::state::VcePacking;

/// Project-local config file name.
const LOCAL_CONFIG: &str = "rsp-vu.toml";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Which vector backend a context should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Best backend the host supports.
    #[default]
    Auto,
    /// Always the portable backend.
    Generic,
    /// Require a host-accelerated backend.
    Accelerated,
}

impl BackendPreference {
    /// Parse the spelling used in config files and the environment.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "generic" | "portable" => Some(Self::Generic),
            "accelerated" | "simd" | "sse2" => Some(Self::Accelerated),
            _ => None,
        }
    }
}

/// rsp-vu configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Backend selection policy.
    pub backend: Option<BackendPreference>,

    /// VCE widening on control register reads.
    pub vce_packing: Option<VcePacking>,

    /// Check the selected backend against the portable one at init.
    pub validate_backend: Option<bool>,
}

impl Config {
    /// Defaults, then config files, then the environment.
    pub fn load() -> Self {
        let mut config = Self::default();
        for path in Self::search_paths() {
            if let Some(file) = Self::read_file(&path) {
                config.merge(file);
            }
        }
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Process-wide configuration, read once.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("rsp-vu config: {:?}", config);
            config
        })
    }

    /// Backend policy, defaulting to auto-detection.
    pub fn backend(&self) -> BackendPreference {
        self.backend.unwrap_or_default()
    }

    /// VCE packing, defaulting to zero extension.
    pub fn vce_packing(&self) -> VcePacking {
        self.vce_packing.unwrap_or_default()
    }

    /// Whether to self-test the backend at init. On by default.
    pub fn validate_backend(&self) -> bool {
        self.validate_backend.unwrap_or(true)
    }

    /// Config files in increasing priority: user, then project-local.
    ///
    /// The project file is looked up in the working directory, falling back
    /// to the crate root when run under cargo.
    fn search_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Self::user_config_path().into_iter().collect();
        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            paths.push(local);
        } else if let Ok(root) = std::env::var("CARGO_MANIFEST_DIR") {
            paths.push(Path::new(&root).join(LOCAL_CONFIG));
        }
        paths
    }

    /// Parse one config file. Missing files are skipped silently; unreadable
    /// or malformed ones are skipped with a warning.
    fn read_file(path: &Path) -> Option<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Cannot read {}: {}", path.display(), e);
                return None;
            }
        };
        toml::from_str(&text)
            .map_err(|e| log::warn!("Ignoring malformed {}: {}", path.display(), e))
            .ok()
            .inspect(|_| log::info!("Read config from {}", path.display()))
    }

    /// Overlay the fields `other` sets.
    fn merge(&mut self, other: Self) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.vce_packing.is_some() {
            self.vce_packing = other.vce_packing;
        }
        if other.validate_backend.is_some() {
            self.validate_backend = other.validate_backend;
        }
    }

    /// Apply overrides from a variable lookup. Unrecognised values are
    /// logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("RSP_VU_BACKEND") {
            match BackendPreference::parse(&value) {
                Some(pref) => {
                    log::info!("Using RSP_VU_BACKEND from environment: {}", value);
                    self.backend = Some(pref);
                }
                None => log::warn!("Ignoring unknown RSP_VU_BACKEND value: {}", value),
            }
        }
        if let Some(value) = lookup("RSP_VU_VCE_PACKING") {
            let packing = match value.trim().to_ascii_lowercase().as_str() {
                "zero" | "zero-extended" => Some(VcePacking::ZeroExtended),
                "sign" | "sign-extended" => Some(VcePacking::SignExtended),
                _ => None,
            };
            match packing {
                Some(packing) => {
                    log::info!("Using RSP_VU_VCE_PACKING from environment: {}", value);
                    self.vce_packing = Some(packing);
                }
                None => log::warn!("Ignoring unknown RSP_VU_VCE_PACKING value: {}", value),
            }
        }
        if let Some(value) = lookup("RSP_VU_VALIDATE") {
            match value.trim() {
                "1" | "true" | "yes" => self.validate_backend = Some(true),
                "0" | "false" | "no" => self.validate_backend = Some(false),
                _ => log::warn!("Ignoring unknown RSP_VU_VALIDATE value: {}", value),
            }
        }
    }

    /// `~/.config/rsp-vu/config.toml` on Linux; platform equivalent elsewhere.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rsp-vu").join("config.toml"))
    }

    /// Commented example file listing every option.
    pub fn sample_config() -> String {
        r#"# rsp-vu configuration
# Place this file at ~/.config/rsp-vu/config.toml or ./rsp-vu.toml

# Vector backend: "auto" picks the fastest one the host supports
backend = "auto"

# How CFC2 widens the 8-bit VCE flag: "zero-extended" or "sign-extended"
# vce_packing = "zero-extended"

# Compare the selected backend with the portable one at startup
# validate_backend = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend(), BackendPreference::Auto);
        assert_eq!(config.vce_packing(), VcePacking::ZeroExtended);
        assert!(config.validate_backend());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config {
            backend: Some(BackendPreference::Generic),
            vce_packing: None,
            validate_backend: Some(true),
        };

        let overlay = Config {
            backend: None,
            vce_packing: Some(VcePacking::SignExtended),
            validate_backend: Some(false),
        };

        base.merge(overlay);

        // backend unchanged (overlay was None)
        assert_eq!(base.backend, Some(BackendPreference::Generic));
        assert_eq!(base.vce_packing, Some(VcePacking::SignExtended));
        assert_eq!(base.validate_backend, Some(false));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RSP_VU_BACKEND", "Generic"),
            ("RSP_VU_VCE_PACKING", "sign"),
            ("RSP_VU_VALIDATE", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.backend(), BackendPreference::Generic);
        assert_eq!(config.vce_packing(), VcePacking::SignExtended);
        assert!(!config.validate_backend());
    }

    #[test]
    fn test_bad_override_is_ignored() {
        let mut config = Config {
            backend: Some(BackendPreference::Accelerated),
            ..Config::default()
        };
        config.apply_overrides(|name| (name == "RSP_VU_BACKEND").then(|| "avx9000".to_string()));
        assert_eq!(config.backend(), BackendPreference::Accelerated);
    }

    #[test]
    fn test_file_format() {
        let config: Config =
            toml::from_str("backend = \"generic\"\nvce_packing = \"sign-extended\"\n")
                .expect("config should parse");
        assert_eq!(config.backend(), BackendPreference::Generic);
        assert_eq!(config.vce_packing(), VcePacking::SignExtended);
        assert_eq!(config.validate_backend, None);
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = Config::sample_config();
        let config: Config = toml::from_str(&sample).expect("Sample config should parse");
        assert_eq!(config.backend(), BackendPreference::Auto);
    }

    #[test]
    fn test_read_file_skips_missing_and_malformed() {
        let dir = std::env::temp_dir().join(format!("rsp-vu-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        assert_eq!(Config::read_file(&dir.join("absent.toml")), None);

        let bad = dir.join("bad.toml");
        std::fs::write(&bad, "backend = [").unwrap();
        assert_eq!(Config::read_file(&bad), None);

        let good = dir.join("good.toml");
        std::fs::write(&good, "validate_backend = false\n").unwrap();
        assert_eq!(Config::read_file(&good).map(|c| c.validate_backend()), Some(false));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
