//! Discovery of the external office-conversion tool (LibreOffice `soffice`).
//!
//! Resolution order, first match wins:
//!
//! 1. A short fixed list of well-known install paths for the current
//!    platform family. Checking a handful of paths is microseconds and
//!    catches the overwhelming majority of desktop installs.
//! 2. On Linux, assume the package manager put `soffice` on the search path
//!    and return the bare command name without filesystem verification.
//! 3. Spawn the platform's search-path lookup utility (`which` / `where`)
//!    with a short timeout, as a last resort. Spawning a subprocess is the
//!    slowest and least reliable probe, which is why it runs last.
//!
//! The first successful resolution is memoized for the process lifetime;
//! repeated `locate` calls return the cached value without re-probing. An
//! explicit [`crate::config::ConversionConfig::office_tool`] override
//! bypasses both discovery and the cache.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Command name the tool registers under on every platform.
const TOOL_COMMAND: &str = "soffice";

/// A resolved tool location and how it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolPath {
    /// Absolute path, or the bare command name for search-path resolution.
    pub command: PathBuf,
    pub method: ResolutionMethod,
}

/// Which resolution strategy produced a [`ToolPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionMethod {
    /// Caller supplied the path explicitly.
    Configured,
    /// Found at a well-known install location.
    WellKnown,
    /// Assumed resolvable via the process's command search path.
    SearchPath,
    /// Reported by the platform's `which`/`where` utility.
    PathLookup,
}

static CACHED: OnceCell<ToolPath> = OnceCell::const_new();

/// Locate the office-conversion tool, memoized after the first success.
pub async fn locate(config: &ConversionConfig) -> Result<ToolPath, ConvertError> {
    if let Some(ref path) = config.office_tool {
        return Ok(ToolPath {
            command: path.clone(),
            method: ResolutionMethod::Configured,
        });
    }

    let timeout = Duration::from_secs(config.locate_timeout_secs);
    CACHED
        .get_or_try_init(|| async {
            let tool = resolve(
                &well_known_candidates(),
                cfg!(target_os = "linux"),
                || search_path_lookup(timeout),
            )
            .await?;
            info!(
                "office tool resolved via {:?}: {}",
                tool.method,
                tool.command.display()
            );
            Ok(tool)
        })
        .await
        .cloned()
}

/// Discovery core with injectable inputs, so tests can simulate platforms.
async fn resolve<F, Fut>(
    candidates: &[PathBuf],
    assume_on_search_path: bool,
    lookup: F,
) -> Result<ToolPath, ConvertError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<PathBuf>>,
{
    for candidate in candidates {
        if candidate.is_file() {
            return Ok(ToolPath {
                command: candidate.clone(),
                method: ResolutionMethod::WellKnown,
            });
        }
        debug!("not at well-known path: {}", candidate.display());
    }

    if assume_on_search_path {
        return Ok(ToolPath {
            command: PathBuf::from(TOOL_COMMAND),
            method: ResolutionMethod::SearchPath,
        });
    }

    if let Some(found) = lookup().await {
        return Ok(ToolPath {
            command: found,
            method: ResolutionMethod::PathLookup,
        });
    }

    Err(ConvertError::ToolNotFound)
}

/// Ask the platform's lookup utility (`which`/`where`) where `command`
/// lives.
///
/// Returns the first output line on a successful, non-empty result; `None`
/// on failure, empty output, or timeout. Shared with the HTML renderer
/// probe.
pub(crate) async fn which_lookup(command: &str, timeout: Duration) -> Option<PathBuf> {
    let finder = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    let result = tokio::time::timeout(
        timeout,
        Command::new(finder).arg(command).kill_on_drop(true).output(),
    )
    .await;

    match result {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let first = stdout.lines().next().map(str::trim).unwrap_or("");
            if first.is_empty() {
                None
            } else {
                Some(PathBuf::from(first))
            }
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            debug!("{finder} could not be spawned: {e}");
            None
        }
        Err(_) => {
            debug!("{finder} lookup for {command} timed out");
            None
        }
    }
}

/// Well-known install locations for the current platform family.
fn well_known_candidates() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let mut paths = vec![
            PathBuf::from(r"C:\Program Files\LibreOffice\program\soffice.exe"),
            PathBuf::from(r"C:\Program Files (x86)\LibreOffice\program\soffice.exe"),
        ];
        // Installer honours a relocated program directory; ProgramFiles
        // points at it.
        if let Ok(root) = std::env::var("ProgramFiles") {
            paths.push(
                PathBuf::from(root)
                    .join("LibreOffice")
                    .join("program")
                    .join("soffice.exe"),
            );
        }
        paths
    }

    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"),
            PathBuf::from("/opt/homebrew/bin/soffice"),
            PathBuf::from("/usr/local/bin/soffice"),
        ]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/bin/soffice"),
            PathBuf::from("/usr/local/bin/soffice"),
            PathBuf::from("/opt/libreoffice/program/soffice"),
        ]
    }
}

/// Ask the platform's lookup utility where the office tool lives.
async fn search_path_lookup(timeout: Duration) -> Option<PathBuf> {
    which_lookup(TOOL_COMMAND, timeout).await
}
