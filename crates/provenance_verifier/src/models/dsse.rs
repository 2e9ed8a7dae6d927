// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Sigstore bundle wrapping a DSSE envelope.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SigstoreBundle {
    #[serde(default)]
    pub media_type: Option<String>,
    pub dsse_envelope: DsseEnvelope,
    // verificationMaterial, tlogEntries are not consumed: signatures are checked elsewhere.
}

/// DSSE envelope carrying a base64 encoded in-toto statement.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DsseEnvelope {
    pub payload: String,      // Base64 encoded payload (in-toto statement)
    pub payload_type: String, // e.g., application/vnd.in-toto+json
    #[serde(default)]
    pub signatures: Vec<SignatureData>,
}

/// A single envelope signature.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignatureData {
    pub sig: String, // Base64 encoded signature
    #[serde(default)]
    pub keyid: Option<String>,
}
