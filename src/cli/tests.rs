//! Unit tests for CLI parsing

use crate::cli::{Cli, Commands};
use clap::Parser;

#[test]
fn test_serve_is_the_default() {
    let cli = Cli::try_parse_from(["movies-api", "--port", "8080"]).unwrap();
    assert_eq!(cli.command, None);
    assert_eq!(cli.port, 8080);
}

#[test]
fn test_flags() {
    let cli = Cli::try_parse_from([
        "movies-api",
        "--port",
        "9000",
        "--host",
        "127.0.0.1",
        "--seed",
        "movies.json",
        "--log-level",
        "debug",
    ])
    .unwrap();
    assert_eq!(cli.bind_addr(), "127.0.0.1:9000");
    assert_eq!(cli.seed.unwrap().to_string_lossy(), "movies.json");
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_allowed_origin_repeatable_and_comma_delimited() {
    let cli = Cli::try_parse_from([
        "movies-api",
        "--allowed-origin",
        "http://a.example",
        "--allowed-origin",
        "http://b.example,http://c.example",
    ])
    .unwrap();
    assert_eq!(
        cli.allowed_origins,
        ["http://a.example", "http://b.example", "http://c.example"]
    );
    let cors = cli.cors_policy().unwrap();
    assert!(cors.is_allowed("http://c.example"));
    assert!(!cors.is_allowed("http://movies.com"));
}

#[test]
fn test_no_origins_means_default_policy() {
    let cli = Cli::try_parse_from(["movies-api", "--allowed-origin", ""]).unwrap();
    let cors = cli.cors_policy().unwrap();
    assert!(cors.is_allowed("http://spoiler.com"));
}

#[test]
fn test_invalid_origin_rejected() {
    let cli = Cli::try_parse_from(["movies-api", "--allowed-origin", "movies.com"]).unwrap();
    assert!(cli.cors_policy().is_err());
}

#[test]
fn test_subcommands() {
    let cli = Cli::try_parse_from(["movies-api", "routes"]).unwrap();
    assert_eq!(cli.command, Some(Commands::Routes));
    let cli = Cli::try_parse_from(["movies-api", "check-seed"]).unwrap();
    assert_eq!(cli.command, Some(Commands::CheckSeed));
}

#[test]
fn test_port_must_be_numeric() {
    assert!(Cli::try_parse_from(["movies-api", "--port", "http"]).is_err());
}
