// SPDX-License-Identifier: Apache-2.0

//! Format-independent record of the build facts a provenance claims.
//!
//! A [`ProvenanceIr`] always has a binary digest, build type and binary name.
//! Every other field is independently present or absent: an absent field
//! means the provenance carried no evidence about it, which is not the same
//! as carrying an empty value. Instances are immutable once built.

use std::fmt;

/// Names of the optional IR fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IrField {
    BuildCommand,
    BuilderImageDigest,
    SourceRepoUris,
    TrustedBuilderId,
    CommitDigest,
}

impl IrField {
    pub const ALL: [IrField; 5] = [
        IrField::BuildCommand,
        IrField::BuilderImageDigest,
        IrField::SourceRepoUris,
        IrField::TrustedBuilderId,
        IrField::CommitDigest,
    ];
}

impl fmt::Display for IrField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IrField::BuildCommand => "build command",
            IrField::BuilderImageDigest => "builder image digest",
            IrField::SourceRepoUris => "source repo URIs",
            IrField::TrustedBuilderId => "trusted builder ID",
            IrField::CommitDigest => "commit digest",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceIr {
    binary_sha256_digest: String,
    build_type: String,
    binary_name: String,
    build_command: Option<Vec<String>>,
    builder_image_sha256_digest: Option<String>,
    source_repo_uris: Option<Vec<String>>,
    trusted_builder_id: Option<String>,
    commit_sha1_digest: Option<String>,
}

impl ProvenanceIr {
    /// Starts building an IR from its required fields.
    pub fn builder(
        binary_sha256_digest: impl Into<String>,
        build_type: impl Into<String>,
        binary_name: impl Into<String>,
    ) -> ProvenanceIrBuilder {
        ProvenanceIrBuilder {
            ir: ProvenanceIr {
                binary_sha256_digest: binary_sha256_digest.into(),
                build_type: build_type.into(),
                binary_name: binary_name.into(),
                build_command: None,
                builder_image_sha256_digest: None,
                source_repo_uris: None,
                trusted_builder_id: None,
                commit_sha1_digest: None,
            },
        }
    }

    pub fn binary_sha256_digest(&self) -> &str {
        &self.binary_sha256_digest
    }

    /// Build type of the provenance this IR came from. Diagnostic only.
    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    pub fn has_build_command(&self) -> bool {
        self.build_command.is_some()
    }

    /// The build command, or `None` if the provenance did not record one.
    pub fn build_command(&self) -> Option<&[String]> {
        self.build_command.as_deref()
    }

    pub fn has_builder_image_sha256_digest(&self) -> bool {
        self.builder_image_sha256_digest.is_some()
    }

    pub fn builder_image_sha256_digest(&self) -> Option<&str> {
        self.builder_image_sha256_digest.as_deref()
    }

    pub fn has_source_repo_uris(&self) -> bool {
        self.source_repo_uris.is_some()
    }

    /// Every URI the provenance uses to reference the source repository.
    /// The same repository may appear more than once in different forms.
    pub fn source_repo_uris(&self) -> Option<&[String]> {
        self.source_repo_uris.as_deref()
    }

    pub fn has_trusted_builder_id(&self) -> bool {
        self.trusted_builder_id.is_some()
    }

    pub fn trusted_builder_id(&self) -> Option<&str> {
        self.trusted_builder_id.as_deref()
    }

    pub fn has_commit_sha1_digest(&self) -> bool {
        self.commit_sha1_digest.is_some()
    }

    pub fn commit_sha1_digest(&self) -> Option<&str> {
        self.commit_sha1_digest.as_deref()
    }

    /// Whether `field` is set.
    pub fn has(&self, field: IrField) -> bool {
        match field {
            IrField::BuildCommand => self.has_build_command(),
            IrField::BuilderImageDigest => self.has_builder_image_sha256_digest(),
            IrField::SourceRepoUris => self.has_source_repo_uris(),
            IrField::TrustedBuilderId => self.has_trusted_builder_id(),
            IrField::CommitDigest => self.has_commit_sha1_digest(),
        }
    }
}

/// Applies optional fields to a [`ProvenanceIr`] before it is frozen.
#[derive(Debug, Clone)]
#[must_use]
pub struct ProvenanceIrBuilder {
    ir: ProvenanceIr,
}

impl ProvenanceIrBuilder {
    pub fn with_build_command(mut self, command: Vec<String>) -> Self {
        self.ir.build_command = Some(command);
        self
    }

    pub fn with_builder_image_sha256_digest(mut self, digest: impl Into<String>) -> Self {
        self.ir.builder_image_sha256_digest = Some(digest.into());
        self
    }

    pub fn with_source_repo_uris(mut self, uris: Vec<String>) -> Self {
        self.ir.source_repo_uris = Some(uris);
        self
    }

    pub fn with_trusted_builder_id(mut self, id: impl Into<String>) -> Self {
        self.ir.trusted_builder_id = Some(id.into());
        self
    }

    pub fn with_commit_sha1_digest(mut self, digest: impl Into<String>) -> Self {
        self.ir.commit_sha1_digest = Some(digest.into());
        self
    }

    pub fn build(self) -> ProvenanceIr {
        self.ir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_only() {
        let ir = ProvenanceIr::builder("abc", "type", "bin").build();
        assert_eq!(ir.binary_sha256_digest(), "abc");
        assert_eq!(ir.build_type(), "type");
        assert_eq!(ir.binary_name(), "bin");
        for field in IrField::ALL {
            assert!(!ir.has(field), "{field} should be unset");
        }
        assert_eq!(ir.build_command(), None);
        assert_eq!(ir.source_repo_uris(), None);
    }

    #[test]
    fn empty_values_are_present() {
        let ir = ProvenanceIr::builder("abc", "type", "bin")
            .with_build_command(vec![])
            .with_source_repo_uris(vec![])
            .build();
        assert!(ir.has_build_command());
        assert_eq!(ir.build_command(), Some(&[][..]));
        assert!(ir.has_source_repo_uris());
        assert_eq!(ir.source_repo_uris(), Some(&[][..]));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// `has_x` is true exactly when `with_x` was applied, and the getter returns the supplied value.
            #[test]
            fn options_round_trip(
                command in prop::option::of(prop::collection::vec("[a-z-]{1,8}", 0..4)),
                image in prop::option::of("[0-9a-f]{64}"),
                uris in prop::option::of(prop::collection::vec("[a-z:/.]{1,20}", 0..4)),
                builder in prop::option::of("[a-z:/.@]{1,30}"),
                commit in prop::option::of("[0-9a-f]{40}"),
            ) {
                let mut b = ProvenanceIr::builder("d", "t", "n");
                if let Some(c) = &command { b = b.with_build_command(c.clone()); }
                if let Some(i) = &image { b = b.with_builder_image_sha256_digest(i.clone()); }
                if let Some(u) = &uris { b = b.with_source_repo_uris(u.clone()); }
                if let Some(t) = &builder { b = b.with_trusted_builder_id(t.clone()); }
                if let Some(c) = &commit { b = b.with_commit_sha1_digest(c.clone()); }
                let ir = b.build();

                prop_assert_eq!(ir.has_build_command(), command.is_some());
                prop_assert_eq!(ir.build_command(), command.as_deref());
                prop_assert_eq!(ir.has_builder_image_sha256_digest(), image.is_some());
                prop_assert_eq!(ir.builder_image_sha256_digest(), image.as_deref());
                prop_assert_eq!(ir.has_source_repo_uris(), uris.is_some());
                prop_assert_eq!(ir.source_repo_uris(), uris.as_deref());
                prop_assert_eq!(ir.has_trusted_builder_id(), builder.is_some());
                prop_assert_eq!(ir.trusted_builder_id(), builder.as_deref());
                prop_assert_eq!(ir.has_commit_sha1_digest(), commit.is_some());
                prop_assert_eq!(ir.commit_sha1_digest(), commit.as_deref());
            }
        }
    }
}
