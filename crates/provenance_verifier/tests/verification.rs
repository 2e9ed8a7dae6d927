// SPDX-License-Identifier: Apache-2.0

//! End-to-end: bytes -> statement -> IR -> verdict.

use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use provenance_verifier::{
    ParsedProvenance, ReferenceValues, load_reference_values, parse_provenance, verify,
    verify_consistency,
};
use serde_json::{Value, json};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn load(name: &str) -> ParsedProvenance {
    let bytes = std::fs::read(testdata(name)).expect("read fixture");
    parse_provenance(&bytes).expect("parse fixture")
}

fn repo(uri: &str) -> ReferenceValues {
    ReferenceValues {
        repo_uri: Some(uri.to_owned()),
        ..Default::default()
    }
}

#[test]
fn generic_provenance_matches_its_repository() {
    let provenance = load("generic_slsa_v02.json");
    let result = verify(provenance.ir(), &repo("github.com/project-oak/oak")).unwrap();
    assert!(result.is_verified(), "{result}");
}

#[test]
fn generic_provenance_rejects_other_repository() {
    let provenance = load("generic_slsa_v02.json");
    let result = verify(
        provenance.ir(),
        &repo("github.com/project-oak/transparent-release"),
    )
    .unwrap();
    assert!(!result.is_verified());
    // the repo appears twice in the provenance, so both references fail
    assert_eq!(result.justifications().len(), 2);
    for justification in result.justifications() {
        assert!(justification.contains("git+https://github.com/project-oak/oak@refs/heads/main"));
        assert!(justification.contains("github.com/project-oak/transparent-release"));
    }
}

#[test]
fn reference_values_fixture_accepts_generic_provenance() {
    let want = load_reference_values(&testdata("reference_values.json")).unwrap();
    let provenance = load("generic_slsa_v02.json");
    assert!(verify(provenance.ir(), &want).unwrap().is_verified());
}

#[test]
fn container_based_provenance_against_full_policy() {
    let provenance = load("container_based_v02.json");
    let want = ReferenceValues {
        binary_sha256_digests: Some(vec![
            "15dc16c42a4ac9ed77f337a4a3065a63e444c29c18c8cf69d6a6b4ae678dca5c".to_owned(),
        ]),
        want_build_cmds: true,
        builder_image_sha256_digests: Some(vec![
            "53ca44b5889e2265c3ae9e542d7097b7de12ea4c6a33785da8478c7333b9a320".to_owned(),
        ]),
        repo_uri: Some("github.com/project-oak/oak".to_owned()),
        trusted_builders: Some(vec![
            "https://github.com/project-oak/transparent-release".to_owned(),
        ]),
    };
    let result = verify(provenance.ir(), &want).unwrap();
    assert!(result.is_verified(), "{result}");
}

#[test]
fn v1_provenance_without_build_command_fails_when_required() {
    let provenance = load("github_workflow_v1.json");
    let want = ReferenceValues {
        want_build_cmds: true,
        repo_uri: Some("github.com/project-oak/oak".to_owned()),
        ..Default::default()
    };
    let result = verify(provenance.ir(), &want).unwrap();
    assert!(!result.is_verified());
    assert_eq!(result.justifications(), ["no build cmd found"]);
}

#[test]
fn enveloped_provenance_verifies_like_the_bare_statement() {
    let statement = std::fs::read(testdata("generic_slsa_v02.json")).unwrap();
    let bundle = json!({
        "mediaType": "application/vnd.dev.sigstore.bundle.v0.3+json",
        "dsseEnvelope": {
            "payloadType": "application/vnd.in-toto+json",
            "payload": STANDARD.encode(&statement),
            "signatures": [{ "sig": "MEUCIQ==" }]
        }
    });
    let enveloped = parse_provenance(&serde_json::to_vec(&bundle).unwrap()).unwrap();
    let bare = load("generic_slsa_v02.json");
    assert_eq!(enveloped.ir(), bare.ir());
}

#[test]
fn batch_with_same_binary_is_consistent_despite_different_commands() {
    let mut value: Value =
        serde_json::from_slice(&std::fs::read(testdata("container_based_v02.json")).unwrap())
            .unwrap();
    let first = parse_provenance(&serde_json::to_vec(&value).unwrap()).unwrap();
    value["predicate"]["buildConfig"]["command"] = json!(["make", "release"]);
    let second = parse_provenance(&serde_json::to_vec(&value).unwrap()).unwrap();

    assert_ne!(first.ir().build_command(), second.ir().build_command());
    assert!(verify_consistency([first.ir(), second.ir()]).is_verified());
}

#[test]
fn batch_with_different_digests_is_inconsistent() {
    let container = load("container_based_v02.json");
    let amber = load("amber_v02.json");
    let generic = load("generic_slsa_v02.json");

    let result = verify_consistency([container.ir(), amber.ir(), generic.ir()]);
    assert!(!result.is_verified());
    let digest_failures: Vec<_> = result
        .justifications()
        .iter()
        .filter(|j| j.contains("binary digest"))
        .collect();
    assert_eq!(digest_failures.len(), 1);
    assert!(digest_failures[0].starts_with("provenance #2"));
    assert!(digest_failures[0].contains(container.ir().binary_sha256_digest()));
    assert!(digest_failures[0].contains(generic.ir().binary_sha256_digest()));
}
