// SPDX-License-Identifier: Apache-2.0

use tracing::info;

use crate::dispatch::map_to_ir;
use crate::error::ProvenanceError;
use crate::ir::ProvenanceIr;
use crate::statement::{ValidatedStatement, parse_statement};

/// A provenance statement together with the IR mapped from it.
///
/// The statement is kept because rebuilding needs schema-specific inputs
/// (builder image repository, output path) the IR does not model.
#[derive(Debug, Clone)]
pub struct ParsedProvenance {
    statement: ValidatedStatement,
    ir: ProvenanceIr,
}

impl ParsedProvenance {
    pub fn statement(&self) -> &ValidatedStatement {
        &self.statement
    }

    pub fn ir(&self) -> &ProvenanceIr {
        &self.ir
    }
}

/// Parses raw provenance bytes and maps them to the IR.
pub fn parse_provenance(bytes: &[u8]) -> Result<ParsedProvenance, ProvenanceError> {
    let statement = parse_statement(bytes)?;
    let ir = map_to_ir(&statement)?;
    info!(
        binary = ir.binary_name(),
        digest = ir.binary_sha256_digest(),
        build_type = ir.build_type(),
        "parsed provenance"
    );
    Ok(ParsedProvenance { statement, ir })
}
