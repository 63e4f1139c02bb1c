use std::fs;
use std::time::Duration;

use gdoc_import::{ConfigError, ImportConfig, DEFAULT_TOKEN_ENV};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MINIMAL: &str = r#"(
    repository_dir: "repo",
    language_code: "eng-GB",
    document_content_type: "gdoc",
    image_content_type: "image",
    document_parent_location: 2,
    image_parent_location: 51,
)"#;

#[test]
fn minimal_config_uses_defaults() {
    let config = ImportConfig::parse(MINIMAL).expect("valid config");
    assert_eq!(config.document_id, None);
    assert_eq!(config.docs_api_base_url, "https://docs.googleapis.com/");
    assert_eq!(config.log_file, None);

    let targets = config.targets();
    assert_eq!(targets.language_code, "eng-GB");
    assert_eq!(targets.document_content_type, "gdoc");
    assert_eq!(targets.image_parent_location, 51);

    let images = config.image_fetch_settings();
    assert_eq!(images.max_bytes, 25 * 1024 * 1024);
    assert_eq!(images.bearer_token, None);
}

#[test]
fn fetch_overrides_apply_to_both_clients() {
    let config = ImportConfig::parse(
        r#"(
            document_id: Some("1AbC"),
            access_token: Some("literal"),
            repository_dir: "/srv/repo",
            language_code: "ger-DE",
            document_content_type: "article",
            image_content_type: "image",
            document_parent_location: 2,
            image_parent_location: 51,
            fetch: (request_timeout_secs: Some(5), max_bytes: Some(1024)),
        )"#,
    )
    .expect("valid config");

    assert_eq!(config.document_id.as_deref(), Some("1AbC"));
    let docs = config.document_fetch_settings("tok");
    assert_eq!(docs.request_timeout, Duration::from_secs(5));
    assert_eq!(docs.max_bytes, 1024);
    assert_eq!(docs.bearer_token.as_deref(), Some("tok"));
    assert_eq!(docs.allowed_content_types, vec!["application/json".to_string()]);
    assert_eq!(config.image_fetch_settings().max_bytes, 1024);
    assert_eq!(docs.redirect_limit, 5);
}

#[test]
fn unknown_keys_are_rejected() {
    let with_typo = MINIMAL.replace("language_code", "langauge_code");
    assert!(ImportConfig::parse(&with_typo).is_err());
}

#[test]
fn literal_token_wins_over_environment() {
    let config = ImportConfig {
        access_token: Some(" literal ".to_string()),
        ..ImportConfig::parse(MINIMAL).unwrap()
    };
    let token = config
        .access_token(|_| Some("from-env".to_string()))
        .unwrap();
    assert_eq!(token, "literal");
}

#[test]
fn token_read_from_named_variable() {
    let config = ImportConfig {
        access_token_env: Some("MY_TOKEN".to_string()),
        ..ImportConfig::parse(MINIMAL).unwrap()
    };
    let token = config
        .access_token(|name| (name == "MY_TOKEN").then(|| "secret".to_string()))
        .unwrap();
    assert_eq!(token, "secret");
}

#[test]
fn missing_token_names_the_variable() {
    let config = ImportConfig::parse(MINIMAL).unwrap();
    let err = config.access_token(|_| Some("  ".to_string())).unwrap_err();
    assert!(matches!(err, ConfigError::MissingToken(ref var) if var == DEFAULT_TOKEN_ENV));
}

#[test]
fn load_resolves_paths_against_config_dir() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("import.ron");
    fs::write(
        &path,
        MINIMAL.replace("image_parent_location: 51,", "image_parent_location: 51, log_file: Some(\"import.log\"),"),
    )
    .unwrap();

    let config = ImportConfig::load(&path).unwrap();
    assert_eq!(config.repository_dir, temp.path().join("repo"));
    assert_eq!(config.log_file, Some(temp.path().join("import.log")));
}

#[test]
fn load_reports_missing_and_malformed_files() {
    let temp = TempDir::new().unwrap();
    let missing = ImportConfig::load(&temp.path().join("absent.ron")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read { .. }));

    let broken = temp.path().join("broken.ron");
    fs::write(&broken, "(repository_dir: ").unwrap();
    let err = ImportConfig::load(&broken).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
