// SPDX-License-Identifier: Apache-2.0

//! One mapper per supported provenance format.
//!
//! Mappers only set IR fields they actually find. A field the schema always
//! carries but that cannot be read makes the provenance malformed and is a
//! [`MappingError`]; any other missing field is simply left unset.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::MappingError;
use crate::ir::ProvenanceIr;
use crate::models::slsa::{
    ContainerBuildConfig, Material, SlsaV02Predicate, SlsaV1Predicate, WorkflowParameters,
};
use crate::statement::ValidatedStatement;

/// Decodes the predicate as `T`, naming `build_type` on failure.
fn decode_predicate<T: DeserializeOwned>(
    statement: &ValidatedStatement,
    build_type: &str,
) -> Result<T, MappingError> {
    T::deserialize(statement.predicate()).map_err(|source| MappingError::Predicate {
        build_type: build_type.to_string(),
        source,
    })
}

fn ir_builder(statement: &ValidatedStatement, build_type: &str) -> crate::ir::ProvenanceIrBuilder {
    ProvenanceIr::builder(
        statement.binary_sha256(),
        build_type,
        statement.binary_name(),
    )
}

/// Everything a container-based provenance says about how to rebuild it.
#[derive(Debug, Clone)]
pub struct ContainerBuild {
    pub build_type: String,
    pub command: Vec<String>,
    pub output_path: String,
    /// The material carrying a sha256 digest.
    pub builder_image: Option<Material>,
    /// The material carrying a sha1 (git commit) digest.
    pub source: Option<Material>,
    pub builder_id: Option<String>,
}

/// Decodes a container-based SLSA v0.2 predicate.
pub fn decode_container_build(statement: &ValidatedStatement) -> Result<ContainerBuild, MappingError> {
    let predicate: SlsaV02Predicate =
        decode_predicate(statement, crate::dispatch::BUILD_TYPE_CONTAINER_BASED)?;
    let build_type = predicate.build_type;
    let missing = |field| MappingError::MissingField {
        build_type: build_type.clone(),
        field,
    };

    let config_value = predicate.build_config.ok_or_else(|| missing("buildConfig"))?;
    let config =
        ContainerBuildConfig::deserialize(&config_value).map_err(|source| MappingError::Predicate {
            build_type: build_type.clone(),
            source,
        })?;
    let command = config
        .command
        .filter(|c| !c.is_empty())
        .ok_or_else(|| missing("buildConfig.command"))?;
    let output_path = config
        .output_path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| missing("buildConfig.outputPath"))?;

    let materials = predicate.materials.unwrap_or_default();
    let builder_image = materials
        .iter()
        .find(|m| m.digest.contains_key("sha256"))
        .cloned();
    let source = materials
        .iter()
        .find(|m| m.digest.contains_key("sha1"))
        .cloned();
    let builder_id = predicate.builder.map(|b| b.id).filter(|id| !id.is_empty());

    Ok(ContainerBuild {
        build_type,
        command,
        output_path,
        builder_image,
        source,
        builder_id,
    })
}

/// Maps a container-based SLSA v0.2 provenance.
pub fn map_container_based(statement: &ValidatedStatement) -> Result<ProvenanceIr, MappingError> {
    let build = decode_container_build(statement)?;
    let mut builder = ir_builder(statement, &build.build_type).with_build_command(build.command);

    if let Some(digest) = build
        .builder_image
        .as_ref()
        .and_then(|m| m.digest.get("sha256"))
    {
        builder = builder.with_builder_image_sha256_digest(digest.clone());
    }
    if let Some(source) = build.source {
        if let Some(commit) = source.digest.get("sha1") {
            builder = builder.with_commit_sha1_digest(commit.clone());
        }
        builder = builder.with_source_repo_uris(vec![source.uri]);
    }
    if let Some(id) = build.builder_id {
        builder = builder.with_trusted_builder_id(id);
    }

    Ok(builder.build())
}

/// Maps a v0.2 provenance produced by the generic SLSA GitHub generator.
pub fn map_generic_github_generator(
    statement: &ValidatedStatement,
) -> Result<ProvenanceIr, MappingError> {
    let predicate: SlsaV02Predicate =
        decode_predicate(statement, crate::dispatch::BUILD_TYPE_GENERIC_GITHUB_GENERATOR)?;

    let builder_id = predicate
        .builder
        .map(|b| b.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MappingError::MissingField {
            build_type: predicate.build_type.clone(),
            field: "builder.id",
        })?;

    let mut builder =
        ir_builder(statement, &predicate.build_type).with_trusted_builder_id(builder_id);

    let config_source = predicate
        .invocation
        .and_then(|i| i.config_source)
        .unwrap_or_default();

    if predicate.materials.is_some() || config_source.uri.is_some() {
        let materials = predicate.materials.as_deref().unwrap_or_default();
        let uris = materials
            .iter()
            .map(|m| m.uri.clone())
            .chain(config_source.uri.clone())
            .collect();
        builder = builder.with_source_repo_uris(uris);
    }

    let commit = config_source
        .digest
        .as_ref()
        .and_then(|d| d.get("sha1"))
        .or_else(|| {
            predicate
                .materials
                .iter()
                .flatten()
                .find_map(|m| m.digest.get("sha1"))
        });
    if let Some(commit) = commit {
        builder = builder.with_commit_sha1_digest(commit.clone());
    }

    Ok(builder.build())
}

/// Maps a SLSA v1 provenance produced by a GitHub Actions workflow.
pub fn map_github_actions_workflow(
    statement: &ValidatedStatement,
) -> Result<ProvenanceIr, MappingError> {
    let predicate: SlsaV1Predicate =
        decode_predicate(statement, crate::dispatch::BUILD_TYPE_GITHUB_ACTIONS_WORKFLOW)?;
    let definition = predicate.build_definition;
    let build_type = definition.build_type;

    let builder_id = predicate
        .run_details
        .builder
        .map(|b| b.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MappingError::MissingField {
            build_type: build_type.clone(),
            field: "runDetails.builder.id",
        })?;

    let parameters = if definition.external_parameters.is_null() {
        WorkflowParameters::default()
    } else {
        WorkflowParameters::deserialize(&definition.external_parameters).map_err(|source| {
            MappingError::Predicate {
                build_type: build_type.clone(),
                source,
            }
        })?
    };
    let repository = parameters.workflow.and_then(|w| w.repository);

    let mut builder = ir_builder(statement, &build_type).with_trusted_builder_id(builder_id);

    let dependencies = definition.resolved_dependencies;
    if repository.is_some() || dependencies.is_some() {
        let uris = repository
            .into_iter()
            .chain(dependencies.iter().flatten().filter_map(|d| d.uri.clone()))
            .collect();
        builder = builder.with_source_repo_uris(uris);
    }

    let commit = dependencies.iter().flatten().find_map(|d| {
        d.digest
            .get("gitCommit")
            .or_else(|| d.digest.get("sha1"))
    });
    if let Some(commit) = commit {
        builder = builder.with_commit_sha1_digest(commit.clone());
    }

    Ok(builder.build())
}
