// SPDX-License-Identifier: Apache-2.0

//! Fetching sources and running containerized builds.
//!
//! Every call takes its working directory explicitly; nothing here changes
//! the process's current directory.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::digest::sha256_file;
use crate::error::BuildError;

/// Default limit on a single containerized build.
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// A source tree ready to build.
///
/// Trees fetched into a temporary directory are removed by [`Checkout::cleanup`]
/// (or on drop); a caller-supplied tree is left alone.
#[derive(Debug)]
pub struct Checkout {
    root: PathBuf,
    temp_dir: Option<TempDir>,
}

impl Checkout {
    /// A tree the caller owns.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            temp_dir: None,
        }
    }

    /// A tree fetched into `dir`, removed after the build.
    pub fn temporary(dir: TempDir) -> Self {
        Self {
            root: dir.path().to_path_buf(),
            temp_dir: Some(dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Removes a temporary tree. Failures are logged, not returned: some
    /// toolchains leave files behind that the caller cannot remove.
    pub fn cleanup(self) {
        if let Some(dir) = self.temp_dir {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(path = %path.display(), error = %e, "failed to remove checkout");
            }
        }
    }
}

/// The external collaborator that fetches sources and runs builds.
pub trait BuildExecutor {
    /// Uses `local_path` if given, failing unless its HEAD is `commit_hash`;
    /// otherwise clones `remote_uri` into a fresh directory and checks out `commit_hash`.
    fn checkout_or_fetch(
        &self,
        local_path: Option<&Path>,
        remote_uri: &str,
        commit_hash: &str,
    ) -> impl Future<Output = Result<Checkout, BuildError>> + Send;

    /// Runs `command` in `builder_image` with `root` mounted as the workspace.
    ///
    /// Fails if `output_path` exists before the run or is missing after it.
    fn run_containerized_build(
        &self,
        root: &Path,
        builder_image: &str,
        command: &[String],
        output_path: &Path,
    ) -> impl Future<Output = Result<(), BuildError>> + Send;

    /// Hex sha256 of the file at `path`.
    fn digest(&self, path: &Path) -> Result<String, BuildError> {
        Ok(sha256_file(path)?)
    }
}

/// [`BuildExecutor`] backed by the `git` and `docker` command line tools.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    timeout: Duration,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_TIMEOUT)
    }
}

impl ProcessExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

async fn git(dir: &Path, args: &[&str], operation: &'static str) -> Result<String, BuildError> {
    debug!(dir = %dir.display(), ?args, "running git");
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .await?;
    if !output.status.success() {
        return Err(BuildError::Git {
            operation,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

impl BuildExecutor for ProcessExecutor {
    async fn checkout_or_fetch(
        &self,
        local_path: Option<&Path>,
        remote_uri: &str,
        commit_hash: &str,
    ) -> Result<Checkout, BuildError> {
        if let Some(path) = local_path {
            let head = git(path, &["rev-parse", "HEAD"], "rev-parse").await?;
            if head != commit_hash {
                return Err(BuildError::CommitMismatch {
                    path: path.to_path_buf(),
                    expected: commit_hash.to_string(),
                    actual: head,
                });
            }
            info!(path = %path.display(), commit = commit_hash, "using local checkout");
            return Ok(Checkout::local(path));
        }

        let dir = tempfile::Builder::new()
            .prefix("provenance-checkout-")
            .tempdir()?;
        info!(remote = remote_uri, dir = %dir.path().display(), "cloning sources");
        git(dir.path(), &["clone", remote_uri, "."], "clone").await?;
        git(dir.path(), &["checkout", commit_hash], "checkout").await?;
        Ok(Checkout::temporary(dir))
    }

    async fn run_containerized_build(
        &self,
        root: &Path,
        builder_image: &str,
        command: &[String],
        output_path: &Path,
    ) -> Result<(), BuildError> {
        if tokio::fs::try_exists(output_path).await? {
            return Err(BuildError::StaleOutput(output_path.to_path_buf()));
        }

        // Build logs can be large; keep them on disk and point at them from errors.
        let (log_file, log) = tempfile::Builder::new()
            .prefix("provenance-build-")
            .suffix(".log")
            .tempfile()?
            .keep()
            .map_err(|e| e.error)?;
        let stdout = log_file.try_clone()?;

        info!(image = builder_image, ?command, log = %log.display(), "starting containerized build");
        let mut child = Command::new("docker")
            .arg("run")
            .arg("--rm")
            .arg("--volume")
            .arg(format!("{}:/workspace", root.display()))
            .arg("--workdir")
            .arg("/workspace")
            .arg(builder_image)
            .args(command)
            .current_dir(root)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(log_file))
            .kill_on_drop(true)
            .spawn()?;

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill timed out build");
                }
                return Err(BuildError::Timeout {
                    image: builder_image.to_string(),
                    seconds: self.timeout.as_secs(),
                    log,
                });
            }
        };

        if !status.success() {
            return Err(BuildError::ContainerRun {
                image: builder_image.to_string(),
                status: status.to_string(),
                log,
            });
        }
        if !tokio::fs::try_exists(output_path).await? {
            return Err(BuildError::MissingOutput(output_path.to_path_buf()));
        }
        info!(output = %output_path.display(), "build finished");
        Ok(())
    }
}
