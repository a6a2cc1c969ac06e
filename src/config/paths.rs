//! Config file location
//!
//! `KUBECOLLECT_CONFIG_DIR` wins, then `XDG_CONFIG_HOME`, then `~/.config`.

use directories::BaseDirs;
use std::path::PathBuf;

const APP_DIR: &str = "kubecollect";

/// Directory holding `config.yaml`
pub fn config_dir() -> PathBuf {
    resolve_config_dir(
        std::env::var_os("KUBECOLLECT_CONFIG_DIR").map(PathBuf::from),
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
    )
}

fn resolve_config_dir(
    explicit: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = explicit.filter(|dir| !dir.as_os_str().is_empty()) {
        return dir;
    }
    // An empty XDG_CONFIG_HOME counts as unset
    let base = xdg_config_home
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(|| home.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join(APP_DIR)
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}
