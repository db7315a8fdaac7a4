//! Host platform utility functions

use std::path::PathBuf;

/// Environment variable pointing at the root of the software checkout.
pub const SW_ROOT_ENV_VAR: &str = "ALIGN_SW_ROOT";

/// Get the software root directory from the `ALIGN_SW_ROOT` environment variable.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}

/// Get the software root, falling back to the current working directory if the environment
/// variable is not set.
pub fn get_sw_root_or_cwd() -> std::io::Result<PathBuf> {
    match get_sw_root() {
        Ok(p) => Ok(p),
        Err(_) => std::env::current_dir()
    }
}
