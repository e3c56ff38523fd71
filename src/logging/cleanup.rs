use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::time::sleep;

use super::config::LogConfig;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);
const DAY: Duration = Duration::from_secs(86400);

/// Base names of the files written by the rolling appenders
const LOG_STEMS: [&str; 2] = ["access.log.", "application.log."];

/// Background task that periodically cleans up old logs
///
/// Each hour, rotated daily files are moved into `archives/` (gzipped when
/// compression is enabled), archives past the retention period are deleted,
/// and the oldest archives are dropped while the total exceeds the size cap.
pub async fn cleanup_task(log_dir: PathBuf, config: LogConfig) {
    loop {
        sleep(CLEANUP_INTERVAL).await;

        if let Err(e) = perform_cleanup(&log_dir, &config) {
            tracing::error!(
                error = %e,
                log_dir = ?log_dir,
                "Log cleanup failed"
            );
        }
    }
}

fn perform_cleanup(log_dir: &Path, config: &LogConfig) -> io::Result<()> {
    tracing::debug!("Starting log cleanup cycle");

    let archives_dir = log_dir.join("archives");
    fs::create_dir_all(&archives_dir)?;

    archive_rotated_logs(log_dir, &archives_dir, config.compression_enabled)?;
    delete_old_logs(&archives_dir, config.retention_days)?;
    enforce_disk_limit(&archives_dir, config.max_total_size_mb)?;

    tracing::debug!("Log cleanup cycle completed");
    Ok(())
}

fn is_rotated_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| LOG_STEMS.iter().any(|stem| name.starts_with(stem)))
        .unwrap_or(false)
}

/// Move rotated files untouched for a day into the archives directory
fn archive_rotated_logs(log_dir: &Path, archives_dir: &Path, compress: bool) -> io::Result<()> {
    let cutoff = SystemTime::now() - DAY;

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if !metadata.is_file() || !is_rotated_log(&path) || metadata.modified()? >= cutoff {
            continue;
        }

        let result = if compress {
            compress_file(&path, archives_dir).and_then(|archived| {
                fs::remove_file(&path)?;
                Ok(archived)
            })
        } else {
            let target = archives_dir.join(entry.file_name());
            fs::rename(&path, &target).map(|_| target)
        };

        match result {
            Ok(archived) => tracing::info!(
                original = ?path,
                archived = ?archived,
                "Log file archived"
            ),
            Err(e) => tracing::warn!(
                path = ?path,
                error = %e,
                "Failed to archive log file"
            ),
        }
    }

    Ok(())
}

/// Gzip a file into `archives_dir`, returning the archive path
fn compress_file(path: &Path, archives_dir: &Path) -> io::Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?
        .to_os_string();
    name.push(".gz");
    let compressed_path = archives_dir.join(name);

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&compressed_path)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    Ok(compressed_path)
}

/// Delete archives older than the retention period
fn delete_old_logs(archives_dir: &Path, retention_days: u32) -> io::Result<()> {
    let cutoff = SystemTime::now() - DAY * retention_days;

    let mut deleted_count = 0;
    let mut deleted_bytes = 0u64;

    for entry in fs::read_dir(archives_dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if !metadata.is_file() || metadata.modified()? >= cutoff {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(_) => {
                deleted_count += 1;
                deleted_bytes += metadata.len();
            }
            Err(e) => tracing::warn!(
                path = ?path,
                error = %e,
                "Failed to delete old log file"
            ),
        }
    }

    if deleted_count > 0 {
        tracing::info!(
            deleted_files = deleted_count,
            freed_bytes = deleted_bytes,
            "Expired log archives removed"
        );
    }

    Ok(())
}

/// Delete the oldest archives until the directory fits in `max_size_mb`
fn enforce_disk_limit(archives_dir: &Path, max_size_mb: u64) -> io::Result<()> {
    let mut files: Vec<(PathBuf, SystemTime, u64)> = Vec::new();
    let mut total_size = 0u64;

    for entry in fs::read_dir(archives_dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;

        if metadata.is_file() {
            total_size += metadata.len();
            files.push((entry.path(), metadata.modified()?, metadata.len()));
        }
    }

    let max_size_bytes = max_size_mb * 1024 * 1024;
    if total_size <= max_size_bytes {
        return Ok(());
    }

    tracing::warn!(
        total_size_mb = total_size / (1024 * 1024),
        max_size_mb,
        "Log archives exceed size limit, deleting oldest files"
    );

    files.sort_by_key(|(_, modified, _)| *modified);

    for (path, _, size) in files {
        if total_size <= max_size_bytes {
            break;
        }

        match fs::remove_file(&path) {
            Ok(_) => total_size -= size,
            Err(e) => tracing::warn!(
                path = ?path,
                error = %e,
                "Failed to delete log file"
            ),
        }
    }

    Ok(())
}
