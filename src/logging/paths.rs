use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the log directory, creating it and its `archives/` subdirectory
///
/// Resolution order:
/// 1. Custom directory from parameter (if provided)
/// 2. WORDCRAFT_LOG_DIR environment variable
/// 3. The per-user data directory (`<data_local_dir>/wordcraft/logs`)
/// 4. Temp directory as last resort
pub fn get_log_directory(custom_dir: Option<&str>) -> Result<PathBuf, std::io::Error> {
    if let Some(dir) = custom_dir {
        return ensure_directory_exists(PathBuf::from(dir));
    }

    if let Ok(dir) = env::var("WORDCRAFT_LOG_DIR") {
        if !dir.trim().is_empty() {
            return ensure_directory_exists(PathBuf::from(dir));
        }
    }

    let candidate = dirs::data_local_dir()
        .map(|d| d.join("wordcraft").join("logs"))
        .filter(|p| can_create(p));

    match candidate {
        Some(path) => ensure_directory_exists(path),
        None => ensure_directory_exists(env::temp_dir().join("wordcraft_logs")),
    }
}

/// Check if a directory is writable
fn is_writable(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let marker = path.join(".write_test");
    let ok = fs::write(&marker, "test").is_ok();
    let _ = fs::remove_file(&marker);
    ok
}

/// True when `path` exists and is writable, or its nearest existing ancestor is
fn can_create(path: &Path) -> bool {
    path.ancestors()
        .find(|p| p.exists())
        .map(is_writable)
        .unwrap_or(false)
}

fn ensure_directory_exists(path: PathBuf) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(path.join("archives"))?;
    Ok(path)
}
