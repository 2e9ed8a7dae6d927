// SPDX-License-Identifier: Apache-2.0

//! Policy-supplied reference values.
//!
//! Every field is optional. An absent field means the dimension is not
//! checked; it never means "expect empty".

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::digest::is_sha256_hex;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceValues {
    /// Acceptable binary digests. Empty means not checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_sha256_digests: Option<Vec<String>>,
    /// Require the provenance to carry a non-empty build command.
    #[serde(default)]
    pub want_build_cmds: bool,
    /// Acceptable builder image digests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_image_sha256_digests: Option<Vec<String>>,
    /// Substring every source repo URI must contain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_uri: Option<String>,
    /// Acceptable builder identities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_builders: Option<Vec<String>>,
}

impl ReferenceValues {
    /// Loads reference values from a JSON file and validates them.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let values: Self = serde_json::from_str(data)?;
        values.validate()?;
        Ok(values)
    }

    /// Checks that every allow-list entry is well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, digests) in [
            ("binary_sha256_digests", &self.binary_sha256_digests),
            ("builder_image_sha256_digests", &self.builder_image_sha256_digests),
        ] {
            for digest in digests.iter().flatten() {
                if !is_sha256_hex(digest) {
                    return Err(ConfigError::InvalidEntry {
                        field,
                        value: digest.clone(),
                        reason: "not a 64 character hex sha256 digest",
                    });
                }
            }
        }
        for builder in self.trusted_builders.iter().flatten() {
            if builder.trim().is_empty() {
                return Err(ConfigError::InvalidEntry {
                    field: "trusted_builders",
                    value: builder.clone(),
                    reason: "empty builder identity",
                });
            }
        }
        Ok(())
    }
}

/// Loads reference values from `path`.
pub fn load_reference_values(path: &Path) -> Result<ReferenceValues, ConfigError> {
    ReferenceValues::from_file(path)
}
