//! Search tool discovery.
//!
//! Resolution order mirrors the desktop build of the original frontend: a
//! bundled binary placed next to our executable wins, then whatever the
//! system path provides.

use std::path::PathBuf;

const TOOL_NAME: &str = "rg";

#[cfg(windows)]
const BUNDLED_FILE: &str = "rg.exe";
#[cfg(not(windows))]
const BUNDLED_FILE: &str = "rg";

/// Locate the external search tool.
pub fn resolve_search_tool() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let bundled = dir.join(BUNDLED_FILE);
            if bundled.is_file() {
                log::debug!("using bundled search tool: {}", bundled.display());
                return bundled;
            }
        }
    }
    match which::which(TOOL_NAME) {
        Ok(found) => found,
        Err(_) => PathBuf::from(TOOL_NAME),
    }
}
