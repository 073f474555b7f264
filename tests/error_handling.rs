mod common;
use crate::common::init_tracing;

use std::sync::Arc;

use rfwconf::cli::CliArgs;
use rfwconf::config::{load_and_validate, RfwConfig};
use rfwconf::errors::RfwConfigError;
use rfwconf::fs::RealFileSystem;
use rfwconf_test_utils::builders::Fixture;

#[test]
fn missing_config_file_returns_structured_error() {
    init_tracing();
    let fx = Fixture::new();
    let result = RfwConfig::load(fx.path("nope.conf"));

    match result {
        Err(RfwConfigError::FileNotFound { key, path }) => {
            assert_eq!(key, "config");
            assert_eq!(path, fx.path("nope.conf"));
        }
        Err(e) => panic!("Expected FileNotFound error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn run_hands_the_typed_error_back_to_main() {
    init_tracing();
    let fx = Fixture::new();
    let args = CliArgs {
        config: fx.path("nope.conf"),
        log_level: None,
        dump: false,
    };

    let err = rfwconf::run(args).unwrap_err();
    match err.downcast_ref::<RfwConfigError>() {
        Some(RfwConfigError::FileNotFound { key, .. }) => assert_eq!(key, "config"),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn garbage_line_reports_line_number() {
    init_tracing();
    let fx = Fixture::new();
    let path = fx.write("rfw.conf", "[config]\nnon.restful = true\nthis is not a pair\n");

    match load_and_validate(Arc::new(RealFileSystem), &path) {
        Err(RfwConfigError::Parse { line, .. }) => assert_eq!(line, 3),
        Err(e) => panic!("Expected Parse error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn invalid_whitelist_entry_names_the_file() {
    init_tracing();
    let fx = Fixture::new();
    let wl = fx.write("white.list", "127.0.0.1\n10.0.0.0/33\n");
    let path = fx.write_config(&fx.config());

    let err = RfwConfig::load(&path).unwrap_err();
    match &err {
        RfwConfigError::WhitelistInvalidEntry { file, line, entry } => {
            assert_eq!(file, &wl);
            assert_eq!(*line, 2);
            assert_eq!(entry, "10.0.0.0/33");
        }
        e => panic!("Expected WhitelistInvalidEntry, got: {:?}", e),
    }
    assert!(err.to_string().contains("Wrong IP address format in"));
}

#[test]
fn comment_only_whitelist_is_distinct_error() {
    init_tracing();
    let fx = Fixture::new();
    fx.write("white.list", "# nobody\n\n");
    let path = fx.write_config(&fx.config());

    let err = RfwConfig::load(&path).unwrap_err();
    assert!(matches!(err, RfwConfigError::WhitelistEmpty { .. }));
    assert!(err.to_string().starts_with("Could not find a valid IP address in"));
}

#[test]
fn missing_whitelist_file_is_fatal() {
    init_tracing();
    let fx = Fixture::new();
    let path = fx.write_config(&fx.config().set("whitelist.file", "/no/such/white.list"));

    match RfwConfig::load(&path) {
        Err(RfwConfigError::FileNotFound { key, .. }) => assert_eq!(key, "whitelist.file"),
        other => panic!("Expected FileNotFound, got: {:?}", other),
    }
}
