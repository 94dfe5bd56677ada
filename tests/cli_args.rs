//! Integration tests for command-line handling
//!
//! Tests the flags that configure the service and the startup failures for
//! invalid values. None of these start the HTTP server.

use std::process::Command;

/// Helper to run the binary with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_dolarblue"))
        .args(args)
        .env_remove("PORT")
        .env_remove("HOST")
        .output()
        .expect("Failed to execute dolarblue")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dolarblue"), "Help should mention dolarblue");
    assert!(stdout.contains("--webhook-url"), "Help should mention --webhook-url");
    assert!(stdout.contains("TWILIO_WEBHOOK_URL"), "Help should name the env fallback");
    assert!(stdout.contains("--port"), "Help should mention --port");
}

#[test]
fn test_invalid_selector_prints_error_and_exits() {
    let output = run_cli(&["--buy-selector", "div >"]);
    assert!(
        !output.status.success(),
        "Expected invalid selector to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid selector"),
        "Should print error message about the selector: {}",
        stderr
    );
}

#[test]
fn test_zero_timeout_prints_error_and_exits() {
    let output = run_cli(&["--fetch-timeout-secs", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid fetch timeout"), "stderr: {}", stderr);
}

#[test]
fn test_non_numeric_port_is_rejected() {
    let output = run_cli(&["--port", "eighty"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use dolarblue::cli::{Cli, CliError, ServiceConfig};
    use dolarblue::data::Selectors;

    /// Parses `args` with the address and timeout pinned, so HOST, PORT or
    /// FETCH_TIMEOUT_SECS in the environment cannot fail validation
    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec![
            "dolarblue",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--fetch-timeout-secs",
            "10",
        ];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_cli_custom_selectors() {
        let cli = parse(&[
            "--buy-selector",
            "#buy",
            "--sell-selector",
            "#sell",
            "--updated-selector",
            "time",
        ]);
        let config = ServiceConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.selectors,
            Selectors {
                buy: "#buy".to_string(),
                sell: "#sell".to_string(),
                updated: "time".to_string(),
            }
        );
    }

    #[test]
    fn test_cli_custom_voice() {
        let cli = parse(&["--voice", "Polly.Mia", "--language", "es-ES"]);
        let config = ServiceConfig::from_cli(&cli).unwrap();
        assert_eq!(config.voice.voice, "Polly.Mia");
        assert_eq!(config.voice.language, "es-ES");
    }

    #[test]
    fn test_cli_webhook_is_trimmed() {
        let cli = parse(&["--webhook-url", " https://webhooks.example.com/flow "]);
        let config = ServiceConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.voice.webhook_url.as_deref(),
            Some("https://webhooks.example.com/flow")
        );
    }

    #[test]
    fn test_cli_invalid_updated_selector() {
        let cli = parse(&["--updated-selector", "[[nope"]);
        let result = ServiceConfig::from_cli(&cli);
        assert!(matches!(result, Err(CliError::InvalidSelector(_))));
    }
}
