// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Map from digest algorithm name to hex-encoded digest.
pub type DigestSet = BTreeMap<String, String>;

/// Represents the in-toto statement structure.
///
/// This is the unvalidated wire shape; [`crate::statement::parse_statement`]
/// turns it into a [`crate::statement::ValidatedStatement`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InTotoStatement {
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub statement_type: Option<String>,
    pub subject: Vec<Subject>,
    pub predicate_type: String,
    pub predicate: serde_json::Value,
}

/// An artifact the statement is about.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub digest: DigestSet,
}
