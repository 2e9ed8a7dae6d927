// SPDX-License-Identifier: Apache-2.0

//! Checks an IR against reference values.
//!
//! Every dimension is checked independently and the partial results are
//! AND-combined, so one call reports every mismatch rather than the first.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::VerifyError;
use crate::ir::ProvenanceIr;
use crate::reference::ReferenceValues;

/// Outcome of a verification: verified until a check says otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    is_verified: bool,
    justifications: Vec<String>,
}

impl Default for VerificationResult {
    fn default() -> Self {
        Self::verified()
    }
}

impl VerificationResult {
    pub fn verified() -> Self {
        Self {
            is_verified: true,
            justifications: Vec::new(),
        }
    }

    /// A failed result with a single reason.
    pub fn failed(justification: impl Into<String>) -> Self {
        Self {
            is_verified: false,
            justifications: vec![justification.into()],
        }
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    /// Reasons for failure, in the order the checks ran.
    pub fn justifications(&self) -> &[String] {
        &self.justifications
    }

    /// ANDs the verdicts and appends `other`'s justifications after ours.
    pub fn combine(mut self, other: Self) -> Self {
        self.merge(other);
        self
    }

    /// In-place form of [`VerificationResult::combine`].
    pub fn merge(&mut self, other: Self) {
        self.is_verified &= other.is_verified;
        self.justifications.extend(other.justifications);
    }

    /// Records a failure.
    pub fn fail(&mut self, justification: impl Into<String>) {
        self.is_verified = false;
        self.justifications.push(justification.into());
    }
}

impl FromIterator<VerificationResult> for VerificationResult {
    fn from_iter<I: IntoIterator<Item = VerificationResult>>(iter: I) -> Self {
        iter.into_iter().fold(Self::verified(), Self::combine)
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_verified {
            return f.write_str("verified");
        }
        write!(f, "not verified: {}", self.justifications.join("; "))
    }
}

/// Verifies `got` against `want`.
///
/// Dimensions whose reference value is absent are skipped, as are
/// dimensions the provenance carries no evidence for (except the build
/// command, which `want_build_cmds` requires to be present). An error means
/// the reference values themselves are malformed.
pub fn verify(got: &ProvenanceIr, want: &ReferenceValues) -> Result<VerificationResult, VerifyError> {
    want.validate()?;

    Ok([
        verify_binary_digest(got, want),
        verify_build_command(got, want),
        verify_builder_image_digest(got, want),
        verify_repo_uri(got, want),
        verify_trusted_builder(got, want),
    ]
    .into_iter()
    .collect())
}

fn verify_binary_digest(got: &ProvenanceIr, want: &ReferenceValues) -> VerificationResult {
    let Some(digests) = want
        .binary_sha256_digests
        .as_ref()
        .filter(|digests| !digests.is_empty())
    else {
        debug!("no reference binary digests, skipping");
        return VerificationResult::verified();
    };
    let actual = got.binary_sha256_digest();
    if digests.iter().any(|d| d == actual) {
        return VerificationResult::verified();
    }
    VerificationResult::failed(format!(
        "reference digests ({}) do not contain actual digest ({actual})",
        digests.join(", ")
    ))
}

fn verify_build_command(got: &ProvenanceIr, want: &ReferenceValues) -> VerificationResult {
    if !want.want_build_cmds {
        return VerificationResult::verified();
    }
    match got.build_command() {
        Some(command) if !command.is_empty() => VerificationResult::verified(),
        _ => VerificationResult::failed("no build cmd found"),
    }
}

fn verify_builder_image_digest(got: &ProvenanceIr, want: &ReferenceValues) -> VerificationResult {
    let (Some(actual), Some(digests)) = (
        got.builder_image_sha256_digest(),
        &want.builder_image_sha256_digests,
    ) else {
        debug!("builder image digest not checked");
        return VerificationResult::verified();
    };
    if digests.iter().any(|d| d == actual) {
        return VerificationResult::verified();
    }
    VerificationResult::failed(format!(
        "reference builder image digests ({}) do not contain actual ({actual})",
        digests.join(", ")
    ))
}

/// Every URI in the provenance must contain the reference repo URI.
///
/// Containment rather than equality, because provenances spell the same
/// repository differently (`git+https://...@refs/heads/main` vs `https://...`).
fn verify_repo_uri(got: &ProvenanceIr, want: &ReferenceValues) -> VerificationResult {
    let (Some(uris), Some(repo_uri)) = (
        got.source_repo_uris(),
        want.repo_uri.as_deref().filter(|u| !u.is_empty()),
    ) else {
        debug!("source repo URIs not checked");
        return VerificationResult::verified();
    };
    if uris.is_empty() {
        debug!("provenance lists no source repo URIs; nothing violates {repo_uri}");
    }
    uris.iter()
        .filter(|uri| !uri.contains(repo_uri))
        .map(|uri| {
            VerificationResult::failed(format!(
                "URI from provenance ({uri}) does not contain repo URI ({repo_uri})"
            ))
        })
        .collect()
}

fn verify_trusted_builder(got: &ProvenanceIr, want: &ReferenceValues) -> VerificationResult {
    let (Some(actual), Some(builders)) = (got.trusted_builder_id(), &want.trusted_builders) else {
        debug!("trusted builder not checked");
        return VerificationResult::verified();
    };
    if builders.iter().any(|b| b == actual) {
        return VerificationResult::verified();
    }
    VerificationResult::failed(format!(
        "reference trusted builders ({}) do not contain actual ({actual})",
        builders.join(", ")
    ))
}

/// Checks that every IR in a batch claims the same binary as the first.
///
/// Only binary name and digest are compared.
pub fn verify_consistency<'a>(irs: impl IntoIterator<Item = &'a ProvenanceIr>) -> VerificationResult {
    let mut irs = irs.into_iter();
    let Some(first) = irs.next() else {
        return VerificationResult::verified();
    };

    let mut result = VerificationResult::verified();
    for (offset, ir) in irs.enumerate() {
        let index = offset + 1;
        if ir.binary_name() != first.binary_name() {
            result.fail(format!(
                "provenance #{index} has binary name ({}), expected ({}) from provenance #0",
                ir.binary_name(),
                first.binary_name()
            ));
        }
        if ir.binary_sha256_digest() != first.binary_sha256_digest() {
            result.fail(format!(
                "provenance #{index} has binary digest ({}), expected ({}) from provenance #0",
                ir.binary_sha256_digest(),
                first.binary_sha256_digest()
            ));
        }
    }
    result
}
