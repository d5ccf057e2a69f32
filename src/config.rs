use crate::errors::Result;
use crate::patterns::{SERIALIZE_FIELD, SLOT_ASSET_FIELD, SSS_IDENTIFIERS, SSS_PREFIX};
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Location of `MeshHideAsset.cs`, relative to the project root.
pub const MESH_HIDE_PATH: &str = "Assets/UMA/Core/StandardAssets/UMA/Scripts/MeshHideAsset.cs";

/// Location of `SSS_Utils.cginc`, relative to the project root.
pub const SSS_UTILS_PATH: &str = "Assets/UMA/Content/SkinShaders/Shader/SSS_Utils.cginc";

/// The edit applied to a single target file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    /// Drop `[attribute]` from the line directly above `declaration`.
    StripAttribute {
        attribute: String,
        declaration: String,
    },
    /// Prepend `prefix` to each bare occurrence of every identifier.
    PrefixIdentifiers {
        prefix: String,
        identifiers: Vec<String>,
    },
}

impl Operation {
    /// Short name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::StripAttribute { .. } => "strip_attribute",
            Operation::PrefixIdentifiers { .. } => "prefix_identifiers",
        }
    }
}

/// A file to patch and the operation to run on it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Target {
    /// Path relative to the project root (absolute paths are used as is).
    pub path: PathBuf,
    #[serde(flatten)]
    pub operation: Operation,
}

/// Configuration for a patch run.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PatchConfig {
    /// How many directories above the executable's own directory the project
    /// root sits.
    #[serde(default = "default_root_levels")]
    pub root_levels: usize,
    /// Targets, processed in order.
    pub targets: Vec<Target>,
}

fn default_root_levels() -> usize {
    1
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self::uma_import()
    }
}

impl PatchConfig {
    /// The built-in targets fixing up a fresh UMA import.
    pub fn uma_import() -> Self {
        Self {
            root_levels: default_root_levels(),
            targets: vec![
                Target {
                    path: PathBuf::from(MESH_HIDE_PATH),
                    operation: Operation::StripAttribute {
                        attribute: SERIALIZE_FIELD.to_string(),
                        declaration: SLOT_ASSET_FIELD.to_string(),
                    },
                },
                Target {
                    path: PathBuf::from(SSS_UTILS_PATH),
                    operation: Operation::PrefixIdentifiers {
                        prefix: SSS_PREFIX.to_string(),
                        identifiers: SSS_IDENTIFIERS.iter().map(|s| s.to_string()).collect(),
                    },
                },
            ],
        }
    }
}

/// A utility for locating and loading patch configurations.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. The path as given (absolute, or relative to the current directory).
    /// 2. A path relative to the project root, if one was passed on the command line.
    /// 3. Next to the executable.
    /// 4. In the parent directory of the executable (to handle `target/release` builds).
    /// 5. In the grandparent directory of the executable.
    pub fn find_config(config_path: &Path, root: Option<&Path>) -> Result<PathBuf> {
        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut tried_locations = vec![config_path.display().to_string()];

        if let Some(root) = root {
            let in_root = root.join(config_path);
            if in_root.exists() {
                return Ok(in_root);
            }
            tried_locations.push(in_root.display().to_string());
        }

        if let Ok(exe_path) = env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                for dir in exe_dir.ancestors().take(3) {
                    let candidate = dir.join(config_path);
                    if candidate.exists() {
                        return Ok(candidate);
                    }
                    tried_locations.push(candidate.display().to_string());
                }
            }
        }

        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried_locations.join("\n  - ")
        )
        .into())
    }

    /// Loads a `PatchConfig` from a YAML file.
    pub fn load_patch_config(path: &Path) -> Result<PatchConfig> {
        let file = File::open(path)?;
        let config: PatchConfig = serde_yaml::from_reader(file)?;
        if config.targets.is_empty() {
            return Err(format!("Config file '{}' lists no targets", path.display()).into());
        }
        Ok(config)
    }

    /// Resolves the project root.
    ///
    /// An explicit root wins. Otherwise the root is `root_levels` directories
    /// above the directory holding the running executable.
    pub fn resolve_root(explicit: Option<&Path>, root_levels: usize) -> Result<PathBuf> {
        if let Some(root) = explicit {
            return Ok(root.to_path_buf());
        }

        let exe_path = env::current_exe()?;
        let exe_path = exe_path.canonicalize().unwrap_or(exe_path);
        Self::root_from_install(&exe_path, root_levels)
    }

    /// Walks `root_levels` directories up from the directory containing `exe_path`.
    pub fn root_from_install(exe_path: &Path, root_levels: usize) -> Result<PathBuf> {
        exe_path
            .ancestors()
            .nth(root_levels + 1)
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                format!(
                    "Cannot go {} level(s) above the install directory of {}",
                    root_levels,
                    exe_path.display()
                )
                .into()
            })
    }
}
