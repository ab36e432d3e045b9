mod common;

use std::collections::HashMap;
use std::fs;

use common::{write_artifacts, KeywordModel};
use newsclass::{
    load_tokenizer, ArtifactKind, ArtifactStore, Classifier, ClassifierError, LabelEncoder, SequenceConfig, Side,
    WordIndexTokenizer,
};

fn word_tokenizer() -> WordIndexTokenizer {
    WordIndexTokenizer::new(HashMap::from([("goal".to_string(), 1)]))
}

#[test]
fn test_validation_errors() {
    common::init();

    // Empty label set
    let result = LabelEncoder::new(Vec::<String>::new());
    assert!(matches!(result, Err(ClassifierError::Validation(_))));

    // Empty label
    let result = LabelEncoder::new(vec!["sport", ""]);
    assert!(matches!(result, Err(ClassifierError::Validation(_))));

    // Duplicate label
    let result = LabelEncoder::new(vec!["sport", "tech", "sport"]);
    assert!(matches!(result, Err(ClassifierError::Validation(_))));
}

#[test]
fn test_label_file_formats() {
    let list = LabelEncoder::parse(r#"["business", "sport"]"#).unwrap();
    let object = LabelEncoder::parse(r#"{"classes": ["business", "sport"]}"#).unwrap();
    let lines = LabelEncoder::parse("business\nsport\n").unwrap();

    assert_eq!(list, object);
    assert_eq!(list, lines);
    assert_eq!(list.transform("sport"), Some(1));
    assert_eq!(list.inverse_transform(0), Some("business"));
    assert_eq!(list.inverse_transform(2), None);

    let result = LabelEncoder::parse(r#"["sport", "sport"]"#);
    assert!(matches!(
        result,
        Err(ClassifierError::ArtifactLoad { artifact: ArtifactKind::Labels, .. })
    ));
}

#[test]
fn test_builder_requires_every_artifact() {
    let result = Classifier::builder()
        .with_tokenizer(word_tokenizer())
        .unwrap()
        .with_model(KeywordModel)
        .unwrap()
        .build();
    assert!(matches!(result, Err(ClassifierError::Build(msg)) if msg.contains("labels")));
}

#[test]
fn test_builder_checks_model_shape() {
    // KeywordModel scores five categories
    let result = Classifier::builder()
        .with_tokenizer(word_tokenizer())
        .unwrap()
        .with_model(KeywordModel)
        .unwrap()
        .with_labels(LabelEncoder::new(vec!["business", "sport"]).unwrap())
        .unwrap()
        .build();
    assert!(matches!(result, Err(ClassifierError::Build(_))));

    // KeywordModel expects 300 indices
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let result = Classifier::builder()
        .with_tokenizer_file(dir.path().join("tokenizer.json"))
        .unwrap()
        .with_labels_file(dir.path().join("labels.json"))
        .unwrap()
        .with_model(KeywordModel)
        .unwrap()
        .with_max_len(128)
        .build();
    assert!(matches!(result, Err(ClassifierError::Build(_))));
}

#[test]
fn test_zero_sequence_length() {
    let config = SequenceConfig::default().with_max_len(0);
    assert!(config.validate().is_err());

    let config = SequenceConfig::default();
    assert_eq!(config.max_len, 300);
    assert_eq!(config.padding, Side::Pre);
    assert_eq!(config.truncating, Side::Pre);
    assert_eq!(config.pad_value, 0);
}

#[test]
fn test_incomplete_artifact_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let store = ArtifactStore::new(dir.path()).unwrap();

    assert_eq!(store.missing(), vec![ArtifactKind::Model]);
    let result = Classifier::builder().with_artifacts(&store);
    assert!(matches!(
        result,
        Err(ClassifierError::ArtifactLoad { artifact: ArtifactKind::Model, .. })
    ));
}

#[test]
fn test_corrupt_model_file() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    fs::write(dir.path().join("model.onnx"), b"not an onnx graph").unwrap();
    let store = ArtifactStore::new(dir.path()).unwrap();

    let result = Classifier::builder().with_artifacts(&store);
    assert!(matches!(
        result,
        Err(ClassifierError::ArtifactLoad { artifact: ArtifactKind::Model, .. })
    ));
}

#[test]
fn test_corrupt_tokenizer_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokenizer.json");
    fs::write(&path, "{ this is not json").unwrap();

    let result = load_tokenizer(&path);
    assert!(matches!(
        result,
        Err(ClassifierError::ArtifactLoad { artifact: ArtifactKind::Tokenizer, .. })
    ));
}

#[test]
fn test_error_messages_name_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let err = Classifier::builder()
        .with_labels_file(dir.path().join("labels.json"))
        .unwrap_err();
    assert!(err.to_string().contains("labels"), "message: {}", err);
}
