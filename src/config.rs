use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::data::error::{CatalogError, Result};
use crate::data::proximity::DEFAULT_CUTOFF;

/// Config file picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "kinase-explorer.json";

pub const ENV_CONFIG: &str = "KINASE_EXPLORER_CONFIG";
pub const ENV_RESIDUES: &str = "KINASE_EXPLORER_RESIDUES";
pub const ENV_VARIANTS: &str = "KINASE_EXPLORER_VARIANTS";
pub const ENV_CUTOFF: &str = "KINASE_EXPLORER_CUTOFF";

/// What to do with numeric fields that fail to parse at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Reject the whole source with a malformed-row error.
    #[default]
    Strict,
    /// Counts become 0; coordinates become absent and the residue drops out
    /// of proximity queries.
    Coerce,
}

// ---------------------------------------------------------------------------
// ExplorerConfig
// ---------------------------------------------------------------------------

/// Source locations and query defaults.
///
/// ```json
/// {
///   "residue_source": "HC_clust_output.csv",
///   "variant_source": "combined-individual-mutations.csv",
///   "default_cutoff": 3.0,
///   "coercion": "strict",
///   "banner_image": "group-photo.jpeg"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub residue_source: PathBuf,
    pub variant_source: PathBuf,
    pub default_cutoff: f64,
    pub coercion: CoercionPolicy,
    pub banner_image: Option<PathBuf>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            residue_source: PathBuf::from("HC_clust_output.csv"),
            variant_source: PathBuf::from("combined-individual-mutations.csv"),
            default_cutoff: DEFAULT_CUTOFF,
            coercion: CoercionPolicy::Strict,
            banner_image: Some(PathBuf::from("group-photo.jpeg")),
        }
    }
}

impl ExplorerConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ExplorerConfig = serde_json::from_str(&text)?;
        debug!("read config from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the JSON file (explicit path, `KINASE_EXPLORER_CONFIG`,
    /// or `kinase-explorer.json` if present), then environment overrides.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`resolve`](Self::resolve) with the environment read through `lookup`.
    pub fn resolve_with<F>(explicit: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| lookup(ENV_CONFIG).map(PathBuf::from))
            .or_else(|| {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            });

        let mut config = match path {
            Some(p) => {
                info!("using config file {}", p.display());
                Self::from_file(&p)?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `KINASE_EXPLORER_*` overrides through `lookup` (the process
    /// environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_RESIDUES) {
            self.residue_source = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_VARIANTS) {
            self.variant_source = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_CUTOFF) {
            self.default_cutoff = v.trim().parse::<f64>().map_err(|_| {
                CatalogError::invalid_argument(format!("{ENV_CUTOFF}='{v}' is not a number"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_cutoff.is_finite() || self.default_cutoff < 0.0 {
            return Err(CatalogError::invalid_argument(format!(
                "default_cutoff must be a finite non-negative number, got {}",
                self.default_cutoff
            )));
        }
        Ok(())
    }

    /// Banner image path, only if the file is actually there.
    pub fn existing_banner(&self) -> Option<&Path> {
        self.banner_image.as_deref().filter(|p| p.exists())
    }
}
