// SPDX-License-Identifier: Apache-2.0

//! SLSA provenance predicates, decoded only as far as the mappers need.
//!
//! Fields a schema marks as required are still `Option` or defaulted here:
//! the mappers decide which absences are fatal so the error can name the
//! field instead of surfacing a generic serde message.

use serde::{Deserialize, Serialize};

use super::statement::DigestSet;

/// Predicate type of SLSA v0.2 provenance.
pub const PREDICATE_TYPE_SLSA_V02: &str = "https://slsa.dev/provenance/v0.2";
/// Predicate type of SLSA v1 provenance.
pub const PREDICATE_TYPE_SLSA_V1: &str = "https://slsa.dev/provenance/v1";

/// SLSA v0.2 predicate.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlsaV02Predicate {
    #[serde(default)]
    pub builder: Option<Builder>,
    pub build_type: String,
    #[serde(default)]
    pub invocation: Option<Invocation>,
    /// Schema depends on `build_type`.
    #[serde(default)]
    pub build_config: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub materials: Option<Vec<Material>>,
}

/// Identity of the build platform.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Builder {
    #[serde(default)]
    pub id: String,
}

/// How the build was started.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default)]
    pub config_source: Option<ConfigSource>,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    #[serde(default)]
    pub environment: Option<serde_json::Value>,
}

/// Where the build recipe came from.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub digest: Option<DigestSet>,
    #[serde(default)]
    pub entry_point: Option<String>,
}

/// An input artifact of the build.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Material {
    pub uri: String,
    #[serde(default)]
    pub digest: DigestSet,
}

/// `buildConfig` of container-based builds.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerBuildConfig {
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub output_path: Option<String>,
}

/// SLSA v1 predicate.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlsaV1Predicate {
    pub build_definition: BuildDefinition,
    #[serde(default)]
    pub run_details: RunDetails,
}

/// What was built and from which inputs.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildDefinition {
    pub build_type: String,
    #[serde(default)]
    pub external_parameters: serde_json::Value,
    #[serde(default)]
    pub internal_parameters: Option<serde_json::Value>,
    #[serde(default)]
    pub resolved_dependencies: Option<Vec<ResourceDescriptor>>,
}

/// A v1 resource reference.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub digest: DigestSet,
}

/// Who ran the build.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunDetails {
    #[serde(default)]
    pub builder: Option<Builder>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// `externalParameters` of the GitHub Actions workflow build type.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct WorkflowParameters {
    #[serde(default)]
    pub workflow: Option<Workflow>,
}

/// The workflow that ran the build.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Workflow {
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}
