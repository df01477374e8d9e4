//! End-to-end apportionment runs over JSON bundles: the reference worked
//! example, national-threshold exclusion, incompatible election type, and
//! the quota pass with exhausted alternates.

use ap_algo::StrategyError;
use ap_io::loader::load_bundle_from_slice;
use ap_pipeline::{run_apportionment, ApportionCtx, EngineMeta, PipelineError};

fn run(bundle: &str) -> Result<ap_pipeline::ResultDoc, PipelineError> {
    let loaded = load_bundle_from_slice(bundle.as_bytes())?;
    run_apportionment(&ApportionCtx { loaded, engine_meta: EngineMeta::default() })
}

fn nominees(genders: &[&str]) -> String {
    let items: Vec<String> = genders
        .iter()
        .enumerate()
        .map(|(i, g)| format!(r#"{{"position": {i}, "name": "n{i}", "gender": "{g}"}}"#))
        .collect();
    format!("[{}]", items.join(","))
}

fn all_male(n: usize) -> String {
    nominees(&vec!["male"; n])
}

#[test]
fn largest_remainder_worked_example() {
    // 5 seats, expressed 10000, A=4500/B=3500/C=2000, no thresholds.
    // Q=2000: floors A2/B1/C1, remainders A500/B1500/C0, leftover to B.
    let bundle = format!(
        r#"{{
          "election": {{
            "election_id": "EL:2027",
            "name": "Legislative 2027",
            "kind": "legislative_proportional",
            "constituencies": [
              {{"constituency_id": "CIR:001", "name": "First", "seats": 5, "candidacies": [
                {{"candidacy_id": "CAND:a", "label": "List A", "nominees": {n}}},
                {{"candidacy_id": "CAND:b", "label": "List B", "nominees": {n}}},
                {{"candidacy_id": "CAND:c", "label": "List C", "nominees": {n}}}
              ]}}
            ]
          }},
          "params": {{}},
          "tally": {{"constituencies": [
            {{"constituency_id": "CIR:001", "expressed": 10000,
              "votes": {{"CAND:a": 4500, "CAND:b": 3500, "CAND:c": 2000}}}}
          ]}}
        }}"#,
        n = all_male(6)
    );

    let doc = run(&bundle).unwrap();
    let cons = &doc.constituencies["CIR:001"];
    assert_eq!(cons.by_candidacy["CAND:a"].seats, 2);
    assert_eq!(cons.by_candidacy["CAND:b"].seats, 2);
    assert_eq!(cons.by_candidacy["CAND:c"].seats, 1);
    assert_eq!(doc.total_seats, 5);
    assert_eq!(doc.strategy.name, "standard");
    assert!(doc.quota_unmet.is_none());
    assert!(doc.id.starts_with("RES:"));
}

fn two_constituency_bundle(params: &str) -> String {
    // National picture: A 13500 (54%), B 9500 (38%), C 2000 (8%).
    format!(
        r#"{{
          "election": {{
            "election_id": "EL:2027",
            "name": "Legislative 2027",
            "kind": "legislative_proportional",
            "constituencies": [
              {{"constituency_id": "CIR:001", "name": "First", "seats": 5, "candidacies": [
                {{"candidacy_id": "CAND:a", "label": "List A", "nominees": {n}}},
                {{"candidacy_id": "CAND:b", "label": "List B", "nominees": {n}}},
                {{"candidacy_id": "CAND:c", "label": "List C", "nominees": {n}}}
              ]}},
              {{"constituency_id": "CIR:002", "name": "Second", "seats": 3, "candidacies": [
                {{"candidacy_id": "CAND:a", "label": "List A", "nominees": {n}}},
                {{"candidacy_id": "CAND:b", "label": "List B", "nominees": {n}}},
                {{"candidacy_id": "CAND:c", "label": "List C", "nominees": {n}}}
              ]}}
            ]
          }},
          "params": {params},
          "tally": {{"constituencies": [
            {{"constituency_id": "CIR:001", "expressed": 10000,
              "votes": {{"CAND:a": 4500, "CAND:b": 3500, "CAND:c": 2000}}}},
            {{"constituency_id": "CIR:002", "expressed": 15000,
              "votes": {{"CAND:a": 9000, "CAND:b": 6000, "CAND:c": 0}}}}
          ]}}
        }}"#,
        n = all_male(6)
    )
}

#[test]
fn national_threshold_excludes_candidacy_everywhere() {
    // C clears 20% locally in CIR:001 but only 8% nationally; a 10% national
    // threshold excludes it before any seat is assigned.
    let doc = run(&two_constituency_bundle(r#"{"national_threshold_pct": 10}"#)).unwrap();

    let first = &doc.constituencies["CIR:001"];
    assert!(!first.by_candidacy["CAND:c"].eligible);
    assert_eq!(first.by_candidacy["CAND:c"].seats, 0);
    assert_eq!(first.by_candidacy["CAND:a"].seats, 3);
    assert_eq!(first.by_candidacy["CAND:b"].seats, 2);

    let second = &doc.constituencies["CIR:002"];
    assert!(!second.by_candidacy["CAND:c"].eligible);
    assert_eq!(second.by_candidacy["CAND:a"].seats, 2);
    assert_eq!(second.by_candidacy["CAND:b"].seats, 1);

    // Conservation holds per constituency after exclusion.
    for cons in doc.constituencies.values() {
        let distributed: u32 = cons.by_candidacy.values().map(|b| b.seats).sum();
        assert_eq!(distributed, cons.seats);
    }
    assert_eq!(doc.total_seats, 8);
}

#[test]
fn identical_bundles_yield_identical_result_ids() {
    let bundle = two_constituency_bundle(r#"{"national_threshold_pct": 10}"#);
    let a = run(&bundle).unwrap();
    let b = run(&bundle).unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(a.seats_by_candidacy, b.seats_by_candidacy);
}

#[test]
fn unsupported_election_type_fails_before_any_constituency() {
    let bundle = r#"{
      "election": {
        "election_id": "EL:2027",
        "name": "Presidential 2027",
        "kind": "presidential_single_seat",
        "constituencies": [
          {"constituency_id": "CIR:001", "name": "Nation", "seats": 1, "candidacies": [
            {"candidacy_id": "CAND:a", "label": "A",
             "nominees": [{"position": 0, "name": "n0", "gender": "female"}]}
          ]}
        ]
      },
      "params": {},
      "tally": {"constituencies": [
        {"constituency_id": "CIR:001", "expressed": 100, "votes": {"CAND:a": 100}}
      ]}
    }"#;

    let err = run(bundle).unwrap_err();
    match err {
        PipelineError::Engine(StrategyError::Incompatible { strategy, .. }) => {
            assert_eq!(strategy, "standard");
        }
        other => panic!("expected Incompatible, got {other:?}"),
    }
}

#[test]
fn quota_substitutes_then_warns_when_alternates_run_out() {
    // Four seats, all-male heads of list, one female alternate in total.
    // A 50% quota requires 2 female seats; only 1 substitution is possible.
    let bundle = format!(
        r#"{{
          "election": {{
            "election_id": "EL:2027",
            "name": "Legislative 2027",
            "kind": "legislative_proportional",
            "constituencies": [
              {{"constituency_id": "CIR:001", "name": "First", "seats": 2, "candidacies": [
                {{"candidacy_id": "CAND:a", "label": "List A", "nominees": {with_alt}}}
              ]}},
              {{"constituency_id": "CIR:002", "name": "Second", "seats": 2, "candidacies": [
                {{"candidacy_id": "CAND:b", "label": "List B", "nominees": {no_alt}}}
              ]}}
            ]
          }},
          "params": {{"gender_quota_pct": 50}},
          "tally": {{"constituencies": [
            {{"constituency_id": "CIR:001", "expressed": 100, "votes": {{"CAND:a": 100}}}},
            {{"constituency_id": "CIR:002", "expressed": 100, "votes": {{"CAND:b": 100}}}}
          ]}}
        }}"#,
        with_alt = nominees(&["male", "male", "female"]),
        no_alt = all_male(3)
    );

    let doc = run(&bundle).unwrap();

    assert_eq!(doc.substitutions.len(), 1);
    let sub = &doc.substitutions[0];
    assert_eq!(sub.constituency_id, "CIR:001");
    assert_eq!(sub.candidacy_id, "CAND:a");
    assert_eq!(sub.out_position, 1);
    assert_eq!(sub.in_position, 2);

    let warn = doc.quota_unmet.unwrap();
    assert_eq!((warn.required, warn.achieved), (2, 1));

    // Substitution never moves seats: counts are untouched.
    assert_eq!(doc.constituencies["CIR:001"].by_candidacy["CAND:a"].seats, 2);
    assert_eq!(doc.constituencies["CIR:002"].by_candidacy["CAND:b"].seats, 2);
    assert_eq!(doc.seating["CIR:001"]["CAND:a"], vec![0, 2]);
    assert_eq!(doc.seating["CIR:002"]["CAND:b"], vec![0, 1]);
}

#[test]
fn official_method_runs_from_bundle_params() {
    let doc = run(&two_constituency_bundle(
        r#"{"method": "official", "national_threshold_pct": 10}"#,
    ))
    .unwrap();
    assert_eq!(doc.strategy.name, "official");
    // C is below the national threshold under either method.
    assert!(!doc.constituencies["CIR:001"].by_candidacy["CAND:c"].eligible);
    assert_eq!(doc.total_seats, 8);
}

#[test]
fn official_method_requires_a_national_threshold() {
    let err = run(&two_constituency_bundle(r#"{"method": "official"}"#)).unwrap_err();
    assert!(matches!(err, PipelineError::Engine(StrategyError::Incompatible { .. })));
}
