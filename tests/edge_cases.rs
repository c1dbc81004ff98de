//! Edge case tests: degenerate essays must grade without panicking.

use lexigrade::analyzer::GradingEngine;
use lexigrade::lexicon::WordNetLexicon;
use lexigrade::{Feature, GradeResult};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn grade_json(json: &str) -> anyhow::Result<GradeResult> {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    GradingEngine::new().grade_file(file.path())
}

#[test]
fn empty_document_gets_best_error_scores() {
    let r = grade_json(r#"{ "sentences": [] }"#).unwrap();
    assert_eq!(r.stats.sentences, 0);
    assert_eq!(r.scores.subject_verb_agreement, 5);
    assert_eq!(r.scores.grammar, 5);
    assert_eq!(r.scores.sentence_formation, 5);
    assert_eq!(r.scores.coherence, 5);
    assert_eq!(r.scores.spelling, 0);
    assert_eq!(r.scores.topic_relevance, 0);
    assert!(r.findings.is_empty());
}

#[test]
fn missing_id_falls_back_to_file_name() {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    file.write_all(br#"{ "sentences": [] }"#).unwrap();
    file.flush().unwrap();
    let r = GradingEngine::new().grade_file(file.path()).unwrap();
    let name = file.path().file_name().unwrap().to_string_lossy();
    assert_eq!(r.essay_id, name);
}

#[test]
fn sentence_without_tokens_is_neutral() {
    let r = grade_json(r#"{ "sentences": [ { "tokens": [] } ] }"#).unwrap();
    assert_eq!(r.stats.sentences, 1);
    assert_eq!(r.scores.subject_verb_agreement, 5);
    assert_eq!(r.scores.grammar, 5);
    assert_eq!(r.scores.sentence_formation, 5);
    assert_eq!(r.scores.coherence, 5);
}

#[test]
fn sentence_without_parse_counts_as_no_clause() {
    let r = grade_json(
        r#"{ "sentences": [ { "tokens": [
            {"index": 1, "word": "Dogs", "lemma": "dog", "pos": "NNS"},
            {"index": 2, "word": "bark", "lemma": "bark", "pos": "VBP"}
        ], "basicDependencies": [
            {"dep": "ROOT", "governor": 0, "dependent": 2},
            {"dep": "nsubj", "governor": 2, "dependent": 1}
        ] } ] }"#,
    )
    .unwrap();
    assert_eq!(r.scores.grammar, 5);
    assert_eq!(r.scores.sentence_formation, 1);
}

#[test]
fn pronoun_without_any_antecedent_is_penalized_not_fatal() {
    let r = grade_json(
        r#"{ "sentences": [ { "tokens": [
            {"index": 1, "word": "They", "lemma": "they", "pos": "PRP"},
            {"index": 2, "word": "left", "lemma": "leave", "pos": "VBD"}
        ], "basicDependencies": [
            {"dep": "ROOT", "governor": 0, "dependent": 2},
            {"dep": "nsubj", "governor": 2, "dependent": 1}
        ], "parse": "(ROOT (S (NP (PRP They)) (VP (VBD left))))" } ] }"#,
    )
    .unwrap();
    // a penalty of 1 in one sentence is beyond the last threshold
    assert_eq!(r.scores.coherence, 1);
    assert_eq!(
        r.findings
            .iter()
            .filter(|f| f.feature == Feature::Coherence)
            .count(),
        1
    );
}

#[test]
fn zero_based_token_indices_are_renumbered() {
    let r = grade_json(
        r#"{ "sentences": [ { "tokens": [
            {"index": 0, "word": "John", "lemma": "John", "pos": "NNP"},
            {"index": 1, "word": "runs", "lemma": "run", "pos": "VBZ"},
            {"index": 2, "word": "Mary", "lemma": "Mary", "pos": "NNP"},
            {"index": 3, "word": "swims", "lemma": "swim", "pos": "VBZ"}
        ], "basicDependencies": [
            {"dep": "ROOT", "governor": 0, "dependent": 2},
            {"dep": "nsubj", "governor": 2, "dependent": 1},
            {"dep": "nsubj", "governor": 4, "dependent": 3}
        ] } ] }"#,
    )
    .unwrap();
    assert_eq!(r.stats.tokens, 4);
    assert_eq!(r.scores.length, 1);
    assert_eq!(r.stats.measures[&Feature::Length], 1.0);
}

#[test]
fn invalid_json_is_an_error() {
    let err = grade_json("{ \"sentences\": [").unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse essay file"));
}

#[test]
fn unbalanced_parse_tree_is_an_error() {
    let err = grade_json(
        r#"{ "sentences": [ { "tokens": [
            {"index": 1, "word": "Hi", "lemma": "hi", "pos": "UH"}
        ], "parse": "(ROOT (INTJ (UH Hi)" } ] }"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("unbalanced"));
}

#[test]
fn dependency_out_of_range_is_an_error() {
    let err = grade_json(
        r#"{ "sentences": [ { "tokens": [
            {"index": 1, "word": "Hi", "lemma": "hi", "pos": "UH"}
        ], "basicDependencies": [
            {"dep": "nsubj", "governor": 1, "dependent": 7}
        ] } ] }"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("references token 7"));
}

#[test]
fn file_with_bom_parses() {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    file.write_all(b"\xEF\xBB\xBF{ \"id\": \"bom\", \"sentences\": [] }")
        .unwrap();
    file.flush().unwrap();
    let r = GradingEngine::new().grade_file(file.path()).unwrap();
    assert_eq!(r.essay_id, "bom");
}

#[test]
fn unreadable_wordnet_degrades_to_neutral() {
    let engine =
        GradingEngine::new().with_lexicon(Arc::new(WordNetLexicon::new("/nonexistent/wordnet")));
    let essay = std::fs::read_to_string("test-essays/good.json").unwrap();
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    file.write_all(essay.as_bytes()).unwrap();
    file.flush().unwrap();

    let r = engine.grade_file(file.path()).unwrap();
    // spelling assumes every word is correct, topic relevance falls back to 0
    assert_eq!(r.scores.spelling, 0);
    assert_eq!(r.scores.topic_relevance, 0);
}

#[test]
fn large_essay_completes() {
    let sentence = r#"{ "tokens": [
        {"index": 1, "word": "Dogs", "lemma": "dog", "pos": "NNS"},
        {"index": 2, "word": "bark", "lemma": "bark", "pos": "VBP"},
        {"index": 3, "word": ".", "lemma": ".", "pos": "."}
    ], "basicDependencies": [
        {"dep": "ROOT", "governor": 0, "dependent": 2},
        {"dep": "nsubj", "governor": 2, "dependent": 1},
        {"dep": "punct", "governor": 2, "dependent": 3}
    ], "parse": "(ROOT (S (NP (NNS Dogs)) (VP (VBP bark)) (. .)))" }"#;
    let sentences = vec![sentence; 400].join(",");
    let r = grade_json(&format!("{{ \"sentences\": [{}] }}", sentences)).unwrap();
    assert_eq!(r.stats.sentences, 400);
    // capitalized subjects in every sentence still count one sentence each
    assert_eq!(r.scores.length, 5);
    assert_eq!(r.scores.subject_verb_agreement, 5);
    assert_eq!(r.scores.sentence_formation, 5);
}
