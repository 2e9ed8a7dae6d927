// SPDX-License-Identifier: Apache-2.0

//! Build provenance verification.
//!
//! Provenances in several SLSA formats are parsed ([`statement`]), routed to
//! a format-specific mapper ([`dispatch`], [`mapping`]) and normalized into a
//! [`ir::ProvenanceIr`]. The IR is then checked against policy
//! [`reference::ReferenceValues`] by the side-effect free [`verifier`], or
//! rebuilt from source by the [`reproduce`] module.

pub mod digest;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod ir;
pub mod mapping;
pub mod models;
pub mod provenance;
pub mod reference;
pub mod reproduce;
pub mod statement;
pub mod verifier;

pub use error::{
    BuildError, ConfigError, DispatchError, FetchError, MappingError, ParseError, ProvenanceError,
    VerifyError,
};
pub use ir::{IrField, ProvenanceIr};
pub use provenance::{ParsedProvenance, parse_provenance};
pub use reference::{ReferenceValues, load_reference_values};
pub use statement::{ValidatedStatement, parse_statement};
pub use verifier::{VerificationResult, verify, verify_consistency};
