// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DispatchError, MappingError, ProvenanceError};
use crate::ir::{IrField, ProvenanceIr};
use crate::mapping;
use crate::models::slsa::{PREDICATE_TYPE_SLSA_V02, PREDICATE_TYPE_SLSA_V1};
use crate::statement::ValidatedStatement;

/// Build type of container-based SLSA v0.2 provenances.
pub const BUILD_TYPE_CONTAINER_BASED: &str = "https://slsa.dev/container-based-build/v0.1?draft";
/// Legacy tag for the same container-based schema.
pub const BUILD_TYPE_AMBER_V1: &str =
    "https://github.com/project-oak/transparent-release/schema/amber-slsa-buildtype/v1/provenance.json";
/// Build type of the SLSA GitHub generator's generic workflow (v0.2).
pub const BUILD_TYPE_GENERIC_GITHUB_GENERATOR: &str =
    "https://github.com/slsa-framework/slsa-github-generator/generic@v1";
/// Build type of GitHub Actions workflows (v1).
pub const BUILD_TYPE_GITHUB_ACTIONS_WORKFLOW: &str =
    "https://slsa-framework.github.io/github-actions-buildtypes/workflow/v1";

/// A supported (predicate type, build type) family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvenanceFormat {
    /// SLSA v0.2 with a container-based `buildConfig`.
    ContainerBased,
    /// SLSA v0.2 from the generic SLSA GitHub generator.
    GenericGithubGenerator,
    /// SLSA v1 from a GitHub Actions workflow.
    GithubActionsWorkflow,
}

// Only the discriminator is decoded here; the matched mapper does the full decode.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildTypeV02 {
    build_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildTypeV1 {
    build_definition: BuildTypeV02,
}

impl ProvenanceFormat {
    pub const ALL: [ProvenanceFormat; 3] = [
        ProvenanceFormat::ContainerBased,
        ProvenanceFormat::GenericGithubGenerator,
        ProvenanceFormat::GithubActionsWorkflow,
    ];

    /// Determines the format of a statement from its predicate type and build type.
    pub fn detect(statement: &ValidatedStatement) -> Result<Self, DispatchError> {
        let predicate_type = statement.predicate_type();
        let build_type = match predicate_type {
            PREDICATE_TYPE_SLSA_V02 => BuildTypeV02::deserialize(statement.predicate())
                .map(|p| p.build_type),
            PREDICATE_TYPE_SLSA_V1 => BuildTypeV1::deserialize(statement.predicate())
                .map(|p| p.build_definition.build_type),
            unknown_type => {
                warn!(predicate_type = unknown_type, "unrecognized predicate type");
                return Err(DispatchError::UnsupportedPredicateType(unknown_type.to_string()));
            }
        }
        .map_err(|source| DispatchError::MissingBuildType {
            predicate_type: predicate_type.to_string(),
            source,
        })?;

        match (predicate_type, build_type.as_str()) {
            (PREDICATE_TYPE_SLSA_V02, BUILD_TYPE_CONTAINER_BASED | BUILD_TYPE_AMBER_V1) => {
                Ok(Self::ContainerBased)
            }
            (PREDICATE_TYPE_SLSA_V02, BUILD_TYPE_GENERIC_GITHUB_GENERATOR) => {
                Ok(Self::GenericGithubGenerator)
            }
            (PREDICATE_TYPE_SLSA_V1, BUILD_TYPE_GITHUB_ACTIONS_WORKFLOW) => {
                Ok(Self::GithubActionsWorkflow)
            }
            _ => Err(DispatchError::UnsupportedBuildType {
                predicate_type: predicate_type.to_string(),
                build_type,
            }),
        }
    }

    /// Runs this format's mapper.
    pub fn map(self, statement: &ValidatedStatement) -> Result<ProvenanceIr, MappingError> {
        match self {
            Self::ContainerBased => mapping::map_container_based(statement),
            Self::GenericGithubGenerator => mapping::map_generic_github_generator(statement),
            Self::GithubActionsWorkflow => mapping::map_github_actions_workflow(statement),
        }
    }

    /// Optional IR fields this format's schema can carry.
    pub fn expressible_fields(self) -> &'static [IrField] {
        match self {
            Self::ContainerBased => &IrField::ALL,
            Self::GenericGithubGenerator | Self::GithubActionsWorkflow => &[
                IrField::SourceRepoUris,
                IrField::TrustedBuilderId,
                IrField::CommitDigest,
            ],
        }
    }
}

/// Maps a validated statement to the internal representation.
///
/// Unknown formats are an error; nothing falls back to a default mapper.
pub fn map_to_ir(statement: &ValidatedStatement) -> Result<ProvenanceIr, ProvenanceError> {
    let format = ProvenanceFormat::detect(statement)?;
    debug!(?format, binary = statement.binary_name(), "dispatching provenance");
    Ok(format.map(statement)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::parse_statement;
    use serde_json::{Value, json};

    fn statement(predicate_type: &str, predicate: Value) -> ValidatedStatement {
        let value = json!({
            "subject": [{ "name": "bin", "digest": { "sha256": "ab" } }],
            "predicateType": predicate_type,
            "predicate": predicate,
        });
        parse_statement(&serde_json::to_vec(&value).unwrap()).unwrap()
    }

    #[test]
    fn detects_v02_build_types() {
        for (build_type, expected) in [
            (BUILD_TYPE_CONTAINER_BASED, ProvenanceFormat::ContainerBased),
            (BUILD_TYPE_AMBER_V1, ProvenanceFormat::ContainerBased),
            (BUILD_TYPE_GENERIC_GITHUB_GENERATOR, ProvenanceFormat::GenericGithubGenerator),
        ] {
            let s = statement(PREDICATE_TYPE_SLSA_V02, json!({ "buildType": build_type }));
            assert_eq!(ProvenanceFormat::detect(&s).unwrap(), expected);
        }
    }

    #[test]
    fn detects_v1_build_type() {
        let s = statement(
            PREDICATE_TYPE_SLSA_V1,
            json!({ "buildDefinition": { "buildType": BUILD_TYPE_GITHUB_ACTIONS_WORKFLOW } }),
        );
        assert_eq!(
            ProvenanceFormat::detect(&s).unwrap(),
            ProvenanceFormat::GithubActionsWorkflow
        );
    }

    #[test]
    fn rejects_unknown_predicate_type() {
        let s = statement("https://example.com/predicate/v1", json!({}));
        assert!(matches!(
            ProvenanceFormat::detect(&s),
            Err(DispatchError::UnsupportedPredicateType(t)) if t == "https://example.com/predicate/v1"
        ));
    }

    #[test]
    fn rejects_unknown_build_type() {
        let s = statement(PREDICATE_TYPE_SLSA_V02, json!({ "buildType": "https://example.com/b" }));
        assert!(matches!(
            ProvenanceFormat::detect(&s),
            Err(DispatchError::UnsupportedBuildType { build_type, .. }) if build_type == "https://example.com/b"
        ));
    }

    #[test]
    fn v1_build_type_is_not_accepted_under_v02() {
        let s = statement(
            PREDICATE_TYPE_SLSA_V02,
            json!({ "buildType": BUILD_TYPE_GITHUB_ACTIONS_WORKFLOW }),
        );
        assert!(matches!(
            ProvenanceFormat::detect(&s),
            Err(DispatchError::UnsupportedBuildType { .. })
        ));
    }

    #[test]
    fn missing_build_type_is_a_dispatch_error() {
        let s = statement(PREDICATE_TYPE_SLSA_V1, json!({ "runDetails": {} }));
        let err = map_to_ir(&s).unwrap_err();
        assert!(matches!(
            err,
            ProvenanceError::Dispatch(DispatchError::MissingBuildType { .. })
        ));
    }
}
