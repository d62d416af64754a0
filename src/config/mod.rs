use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use lf_core::Config;

/// Locations searched, in order, when no config path is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./ladderforge.toml",
    "~/.config/ladderforge/config.toml",
    "/etc/ladderforge/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = Config::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // A broken ladder is fatal; everything else is a warning.
    config
        .ladder()
        .with_context(|| format!("Invalid ladder in config file: {:?}", path))?;
    for warning in config.validate() {
        tracing::warn!("{}: {}", path.display(), warning);
    }

    expand_paths(&mut config);
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_CONFIG_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {}", path.display());
            return load_config(path);
        }
    }

    let mut config = Config::default();
    expand_paths(&mut config);
    Ok(config)
}

fn expand_paths(config: &mut Config) {
    config.output.base_dir = expand(&config.output.base_dir);
    if let Some(ref ffmpeg) = config.tools.ffmpeg_path {
        config.tools.ffmpeg_path = Some(expand(ffmpeg));
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}
