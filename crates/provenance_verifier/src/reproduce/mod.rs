// SPDX-License-Identifier: Apache-2.0

//! Reproducible build verification.
//!
//! Rebuilds the binary a provenance describes and compares the digest of
//! the result with the digest the provenance claims. This is the only part
//! of the crate with side effects (checkouts, containers, temp files).

mod executor;

use std::path::PathBuf;

use tracing::info;

pub use executor::{BuildExecutor, Checkout, DEFAULT_BUILD_TIMEOUT, ProcessExecutor};

use crate::dispatch::ProvenanceFormat;
use crate::error::BuildError;
use crate::mapping::decode_container_build;
use crate::provenance::ParsedProvenance;
use crate::verifier::VerificationResult;

/// Everything needed to rerun a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// URI to clone the sources from.
    pub repo_uri: String,
    pub commit_hash: String,
    /// Image reference pinned by digest, `<repository>@sha256:<digest>`.
    pub builder_image: String,
    pub command: Vec<String>,
    /// Output artifact, relative to the source root.
    pub output_path: PathBuf,
}

impl BuildSpec {
    /// Derives a build spec from a container-based provenance.
    pub fn from_provenance(provenance: &ParsedProvenance) -> Result<Self, BuildError> {
        const CONFIG: &str = "container-based build configuration";

        if !matches!(
            ProvenanceFormat::detect(provenance.statement()),
            Ok(ProvenanceFormat::ContainerBased)
        ) {
            return Err(BuildError::MissingBuildInput(CONFIG));
        }
        let build = decode_container_build(provenance.statement())
            .map_err(|_| BuildError::MissingBuildInput(CONFIG))?;
        let ir = provenance.ir();

        let repo_uri = ir
            .source_repo_uris()
            .and_then(|uris| uris.first())
            .ok_or(BuildError::MissingBuildInput("source repository"))?;
        let commit_hash = ir
            .commit_sha1_digest()
            .ok_or(BuildError::MissingBuildInput("commit"))?;
        let image_digest = ir
            .builder_image_sha256_digest()
            .ok_or(BuildError::MissingBuildInput("builder image digest"))?;
        let command = ir
            .build_command()
            .filter(|c| !c.is_empty())
            .ok_or(BuildError::MissingBuildInput("build command"))?;
        let image_repository = build
            .builder_image
            .as_ref()
            .map(|m| image_repository(&m.uri))
            .filter(|r| !r.is_empty())
            .ok_or(BuildError::MissingBuildInput("builder image"))?;

        Ok(Self {
            repo_uri: clone_uri(repo_uri),
            commit_hash: commit_hash.to_string(),
            builder_image: format!("{image_repository}@sha256:{image_digest}"),
            command: command.to_vec(),
            output_path: PathBuf::from(build.output_path),
        })
    }
}

/// Turns a provenance repo reference into something `git clone` accepts:
/// drops a `git+` prefix and an `@ref` suffix on the path.
fn clone_uri(uri: &str) -> String {
    let uri = uri.strip_prefix("git+").unwrap_or(uri);
    if let Some((scheme, rest)) = uri.split_once("://") {
        if let Some(slash) = rest.find('/') {
            if let Some(at) = rest[slash..].find('@') {
                return format!("{scheme}://{}", &rest[..slash + at]);
            }
        }
    }
    uri.to_string()
}

/// `gcr.io/project/image@sha256:...` -> `gcr.io/project/image`.
fn image_repository(uri: &str) -> &str {
    uri.split_once('@').map_or(uri, |(repository, _)| repository)
}

/// Rebuilds provenances with a [`BuildExecutor`] and checks the output digest.
pub struct ReproducibleBuildVerifier<E> {
    executor: E,
    git_root: Option<PathBuf>,
}

impl<E: BuildExecutor> ReproducibleBuildVerifier<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            git_root: None,
        }
    }

    /// Build from an existing checkout instead of cloning.
    /// The checkout must already be at the provenance's commit.
    pub fn with_git_root(mut self, git_root: impl Into<PathBuf>) -> Self {
        self.git_root = Some(git_root.into());
        self
    }

    /// Rebuilds `provenance` and compares digests.
    ///
    /// A digest mismatch is an unverified result; failing to build at all is an error.
    pub async fn verify(&self, provenance: &ParsedProvenance) -> Result<VerificationResult, BuildError> {
        let spec = BuildSpec::from_provenance(provenance)?;
        info!(
            repo = %spec.repo_uri,
            commit = %spec.commit_hash,
            image = %spec.builder_image,
            "reproducing build"
        );

        let checkout = self
            .executor
            .checkout_or_fetch(self.git_root.as_deref(), &spec.repo_uri, &spec.commit_hash)
            .await?;
        let result = self
            .build_and_compare(&spec, &checkout, provenance.ir().binary_sha256_digest())
            .await;
        checkout.cleanup();
        result
    }

    async fn build_and_compare(
        &self,
        spec: &BuildSpec,
        checkout: &Checkout,
        expected: &str,
    ) -> Result<VerificationResult, BuildError> {
        let output = checkout.root().join(&spec.output_path);
        if tokio::fs::try_exists(&output).await? {
            return Err(BuildError::StaleOutput(output));
        }

        self.executor
            .run_containerized_build(checkout.root(), &spec.builder_image, &spec.command, &output)
            .await?;

        let actual = self.executor.digest(&output)?;
        info!(%actual, %expected, "computed digest of rebuilt binary");
        if actual == expected {
            Ok(VerificationResult::verified())
        } else {
            Ok(VerificationResult::failed(format!(
                "the digest of the built binary ({actual}) does not match the expected digest ({expected})"
            )))
        }
    }
}
