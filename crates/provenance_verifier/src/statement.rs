// SPDX-License-Identifier: Apache-2.0

//! Decoding raw bytes into a validated in-toto statement.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;
use crate::models::dsse::{DsseEnvelope, SigstoreBundle};
use crate::models::statement::{InTotoStatement, Subject};

/// A statement with exactly one subject that carries a sha256 digest.
///
/// Only the validated subject is exposed, so code downstream of the parser
/// can rely on [`ValidatedStatement::binary_sha256`] being present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedStatement {
    statement_type: Option<String>,
    subject: Subject,
    binary_sha256: String,
    predicate_type: String,
    predicate: Value,
}

impl ValidatedStatement {
    /// The single subject of the statement.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn binary_name(&self) -> &str {
        &self.subject.name
    }

    /// Hex sha256 digest of the subject.
    pub fn binary_sha256(&self) -> &str {
        &self.binary_sha256
    }

    pub fn predicate_type(&self) -> &str {
        &self.predicate_type
    }

    pub fn predicate(&self) -> &Value {
        &self.predicate
    }

    /// Converts back to the wire shape.
    pub fn to_statement(&self) -> InTotoStatement {
        InTotoStatement {
            statement_type: self.statement_type.clone(),
            subject: vec![self.subject.clone()],
            predicate_type: self.predicate_type.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl TryFrom<InTotoStatement> for ValidatedStatement {
    type Error = ParseError;

    fn try_from(statement: InTotoStatement) -> Result<Self, Self::Error> {
        let InTotoStatement {
            statement_type,
            mut subject,
            predicate_type,
            predicate,
        } = statement;

        if subject.len() != 1 {
            return Err(ParseError::SubjectCount(subject.len()));
        }
        let subject = subject.remove(0);
        let binary_sha256 = subject
            .digest
            .get("sha256")
            .cloned()
            .ok_or_else(|| ParseError::MissingSha256 {
                name: subject.name.clone(),
            })?;

        Ok(Self {
            statement_type,
            subject,
            binary_sha256,
            predicate_type,
            predicate,
        })
    }
}

/// Parses a statement, a DSSE envelope around one, or a Sigstore bundle
/// around such an envelope.
///
/// Direct decoding is attempted first. If it fails and the input has the
/// shape of an envelope or bundle, the enveloped payload is decoded instead
/// and its error is reported; otherwise the direct error is reported.
pub fn parse_statement(bytes: &[u8]) -> Result<ValidatedStatement, ParseError> {
    let value: Value = serde_json::from_slice(bytes)?;

    let direct_err = match decode_statement(&value) {
        Ok(statement) => return Ok(statement),
        Err(e) => e,
    };

    match enveloped_payload(&value) {
        Some(payload) => {
            let statement = payload
                .and_then(|bytes| {
                    let value: Value = serde_json::from_slice(&bytes)?;
                    decode_statement(&value)
                })
                .map_err(|e| ParseError::Enveloped(Box::new(e)))?;
            debug!(
                predicate_type = statement.predicate_type(),
                "decoded enveloped statement"
            );
            Ok(statement)
        }
        None => Err(direct_err),
    }
}

fn decode_statement(value: &Value) -> Result<ValidatedStatement, ParseError> {
    let statement = InTotoStatement::deserialize(value)?;
    ValidatedStatement::try_from(statement)
}

/// Returns the decoded envelope payload if `value` looks like an envelope or bundle.
fn enveloped_payload(value: &Value) -> Option<Result<Vec<u8>, ParseError>> {
    let envelope = if value.get("dsseEnvelope").is_some() {
        SigstoreBundle::deserialize(value).map(|bundle| bundle.dsse_envelope)
    } else if value.get("payload").is_some() && value.get("payloadType").is_some() {
        DsseEnvelope::deserialize(value)
    } else {
        return None;
    };

    Some(
        envelope
            .map_err(ParseError::from)
            .and_then(|envelope| {
                debug!(payload_type = %envelope.payload_type, "found DSSE envelope");
                STANDARD.decode(envelope.payload).map_err(ParseError::from)
            }),
    )
}
