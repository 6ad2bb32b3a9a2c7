// ─── Java Runtime ───
// Locates the runtime binary that executes a launch descriptor.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// `<root>/bin/java`, or the macOS bundle layout when that exists instead.
pub fn locate_java_binary(runtime_root: &Path) -> PathBuf {
    let primary = runtime_root.join("bin").join(java_exe());
    if primary.exists() {
        return primary;
    }

    let mac_layout = runtime_root
        .join("Contents")
        .join("Home")
        .join("bin")
        .join(java_exe());
    if mac_layout.exists() {
        return mac_layout;
    }

    primary
}

/// Find a Java binary: the explicit path, then `$JAVA_HOME`, then `PATH`.
pub fn resolve_java_binary(explicit: Option<&Path>) -> LauncherResult<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(LauncherError::JavaNotFound(format!(
            "configured Java binary {path:?} does not exist"
        )));
    }

    if let Some(home) = std::env::var_os("JAVA_HOME") {
        let candidate = locate_java_binary(Path::new(&home));
        if candidate.is_file() {
            debug!("Using Java from JAVA_HOME: {:?}", candidate);
            return Ok(candidate);
        }
    }

    find_on_path(std::env::var_os("PATH").as_deref())
        .ok_or_else(|| LauncherError::JavaNotFound("no `java` on PATH and JAVA_HOME unset".into()))
}

fn find_on_path(path_var: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    std::env::split_paths(path_var?)
        .map(|dir| dir.join(java_exe()))
        .find(|candidate| candidate.is_file())
}
