// SPDX-License-Identifier: Apache-2.0

//! Error types for parsing, mapping, loading and reproducing provenances.
//!
//! A failed policy check is not an error: it is reported through
//! [`crate::verifier::VerificationResult`]. Everything here means the
//! verification could not run.

use std::path::PathBuf;

/// The raw bytes could not be turned into a valid statement.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Input is not well-formed JSON, or does not have the statement shape.
    #[error("malformed statement JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The statement must carry exactly one subject.
    #[error("statement must have exactly one subject, found {0}")]
    SubjectCount(usize),

    /// The sole subject has no `sha256` digest entry.
    #[error("subject `{name}` has no sha256 digest")]
    MissingSha256 {
        /// Name of the offending subject.
        name: String,
    },

    /// The envelope payload is not valid base64.
    #[error("envelope payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The enveloped payload could not be decoded as a statement.
    #[error("failed to decode enveloped statement")]
    Enveloped(#[source] Box<ParseError>),
}

/// No mapper exists for the statement's format.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The predicate type is not one we know how to map.
    #[error("unsupported predicate type `{0}`")]
    UnsupportedPredicateType(String),

    /// The predicate type is known but the build type is not.
    #[error("unsupported build type `{build_type}` for predicate type `{predicate_type}`")]
    UnsupportedBuildType {
        /// Predicate type of the statement.
        predicate_type: String,
        /// Build type found inside the predicate.
        build_type: String,
    },

    /// The predicate has no readable build type discriminator.
    #[error("predicate of type `{predicate_type}` has no build type")]
    MissingBuildType {
        /// Predicate type of the statement.
        predicate_type: String,
        /// Why the discriminator could not be read.
        #[source]
        source: serde_json::Error,
    },
}

/// A mapper could not extract a field its schema always provides.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The predicate does not decode as the schema of its build type.
    #[error("predicate does not match the `{build_type}` schema: {source}")]
    Predicate {
        /// Build type being mapped.
        build_type: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A schema-guaranteed field is absent or empty.
    #[error("`{build_type}` provenance is missing required field `{field}`")]
    MissingField {
        /// Build type being mapped.
        build_type: String,
        /// Dotted path of the missing field.
        field: &'static str,
    },
}

/// Failure to turn raw bytes into a [`crate::provenance::ParsedProvenance`].
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// Statement parsing failed.
    #[error("failed to parse statement")]
    Parse(#[from] ParseError),

    /// No mapper matched.
    #[error("failed to dispatch provenance format")]
    Dispatch(#[from] DispatchError),

    /// The matched mapper failed.
    #[error("failed to map provenance")]
    Mapping(#[from] MappingError),
}

/// The reference values file is unreadable or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read reference values from {}", path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid reference values JSON.
    #[error("malformed reference values: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry is syntactically valid JSON but not a valid value.
    #[error("invalid `{field}` entry `{value}`: {reason}")]
    InvalidEntry {
        /// Reference value key.
        field: &'static str,
        /// Offending entry.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Verification could not run because the reference values are corrupt.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// An allow-list entry is malformed.
    #[error("malformed reference value")]
    MalformedReference(#[from] ConfigError),
}

/// Provenance bytes could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Reading a local file failed.
    #[error("failed to read provenance file {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request failed or returned a non-success status.
    #[error("failed to fetch provenance from `{uri}`")]
    Http {
        /// Requested URI.
        uri: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The URI scheme is neither `file`, `http` nor `https`.
    #[error("unsupported provenance URI scheme in `{0}`")]
    UnsupportedScheme(String),
}

/// The reproducible build could not be carried out.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The provenance does not carry enough information to rebuild.
    #[error("provenance has no {0} to build from")]
    MissingBuildInput(&'static str),

    /// A local checkout is not at the commit the provenance names.
    #[error("checkout at {} is at commit {actual}, expected {expected}", path.display())]
    CommitMismatch {
        /// Local checkout root.
        path: PathBuf,
        /// Commit from the provenance.
        expected: String,
        /// HEAD of the checkout.
        actual: String,
    },

    /// A git invocation failed.
    #[error("git {operation} failed: {stderr}")]
    Git {
        /// Which git operation ran.
        operation: &'static str,
        /// Captured standard error.
        stderr: String,
    },

    /// The build output already exists before the build ran.
    #[error("build output {} already exists before the build", .0.display())]
    StaleOutput(PathBuf),

    /// The build finished but did not produce its output.
    #[error("build output {} is missing after the build", .0.display())]
    MissingOutput(PathBuf),

    /// The containerized build exited unsuccessfully.
    #[error("containerized build with `{image}` failed ({status}); logs at {}", log.display())]
    ContainerRun {
        /// Builder image reference.
        image: String,
        /// Exit status description.
        status: String,
        /// Where the build output was saved.
        log: PathBuf,
    },

    /// The containerized build did not finish in time.
    #[error("containerized build with `{image}` timed out after {seconds}s; logs at {}", log.display())]
    Timeout {
        /// Builder image reference.
        image: String,
        /// Configured limit.
        seconds: u64,
        /// Where the build output was saved.
        log: PathBuf,
    },

    /// Filesystem or process I/O failed.
    #[error("build I/O error: {0}")]
    Io(#[from] std::io::Error),
}
