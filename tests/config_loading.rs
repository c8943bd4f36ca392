// tests/config_loading.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::error::Error;
use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use remotetail::config::{load_and_validate, select_targets, TargetOverrides};
use remotetail::errors::RemoteTailError;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{contents}")?;
    Ok(file)
}

#[test]
fn full_config_resolves_defaults_and_overrides() -> TestResult {
    let file = write_config(
        r#"
[config]
queue_capacity = 64
connect_timeout = "3s"
idle_timeout = "5m"

[default]
user = "deploy"
private_key_path = "/keys/id_ed25519"
tail_file = "/var/log/app.log"
follow_flags = "-F"

[server.web1]
hostname = "10.0.0.11"

[server.web2]
hostname = "10.0.0.12"
port = 2222
password = "pw"
tail_file = "/var/log/nginx/error.log"
tail_lines = 20

[group]
web = ["web2", "web1"]
"#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.config.queue_capacity, 64);
    assert_eq!(cfg.config.connect_timeout, Duration::from_secs(3));
    assert_eq!(cfg.config.idle_timeout, Some(Duration::from_secs(300)));

    let web1 = &cfg.servers["web1"];
    assert_eq!(web1.summary(), "deploy@10.0.0.11:/var/log/app.log");
    assert_eq!(web1.port, 22);
    assert_eq!(web1.follow_flags.as_deref(), Some("-F"));
    assert_eq!(
        web1.key_path().map(|p| p.display().to_string()),
        Some("/keys/id_ed25519".to_string())
    );

    let web2 = &cfg.servers["web2"];
    assert_eq!(web2.port, 2222);
    assert_eq!(web2.tail_lines, 20);
    assert_eq!(web2.credential.password.as_deref(), Some("pw"));
    assert!(web2.credential.private_key.is_some());
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let file = write_config(
        r#"
[server.web1]
hostname = "10.0.0.11"
colour = "red"
"#,
    )?;

    match load_and_validate(file.path()) {
        Err(RemoteTailError::TomlError(_)) => Ok(()),
        other => panic!("expected TOML error, got {other:?}"),
    }
}

#[test]
fn config_without_servers_is_an_error() -> TestResult {
    let file = write_config("[config]\nsilent = true\n")?;

    match load_and_validate(file.path()) {
        Err(RemoteTailError::ConfigError(msg)) => {
            assert!(msg.contains("at least one"));
            Ok(())
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn server_without_credential_is_an_error() -> TestResult {
    let file = write_config(
        r#"
[server.web1]
user = "deploy"
tail_file = "/var/log/app.log"
"#,
    )?;

    match load_and_validate(file.path()) {
        Err(RemoteTailError::ConfigError(msg)) => {
            assert!(msg.contains("web1"));
            assert!(msg.contains("credential"));
            Ok(())
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn bad_duration_is_an_error() {
    let mut raw = ConfigFileBuilder::new().with_server("web1").raw();
    raw.config.connect_timeout = "ten seconds".to_string();
    assert!(matches!(
        remotetail::config::ConfigFile::try_from(raw),
        Err(RemoteTailError::ConfigError(_))
    ));
}

#[test]
fn group_with_unknown_member_is_an_error() {
    let raw = ConfigFileBuilder::new()
        .with_server("web1")
        .with_group("web", &["web1", "web9"])
        .raw();

    match remotetail::config::ConfigFile::try_from(raw) {
        Err(RemoteTailError::ConfigError(msg)) => assert!(msg.contains("web9")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn group_selects_members_in_listed_order() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_server("a")
        .with_server("b")
        .with_server("c")
        .with_group("pair", &["c", "a", "c"])
        .build();

    let selected = select_targets(&cfg, Some("pair"), &TargetOverrides::default())?;
    let names: Vec<&str> = selected.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["c", "a"]);

    let all = select_targets(&cfg, None, &TargetOverrides::default())?;
    let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn unknown_group_is_an_error() {
    let cfg = ConfigFileBuilder::new().with_server("a").build();
    match select_targets(&cfg, Some("nope"), &TargetOverrides::default()) {
        Err(RemoteTailError::UnknownGroup(g)) => assert_eq!(g, "nope"),
        other => panic!("expected UnknownGroup, got {other:?}"),
    }
}

#[test]
fn empty_group_selects_nothing() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_server("a")
        .with_group("none", &[])
        .build();
    assert!(select_targets(&cfg, Some("none"), &TargetOverrides::default())?.is_empty());
    Ok(())
}

#[test]
fn overrides_apply_to_every_selected_target() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_server("a")
        .with_server("b")
        .with_default_tail_lines(10)
        .build();

    let overrides = TargetOverrides {
        tail_lines: Some(0),
        tail_file: Some("/var/log/syslog".to_string()),
    };
    let selected = select_targets(&cfg, None, &overrides)?;
    assert!(selected.iter().all(|t| t.tail_lines == 0));
    assert!(selected.iter().all(|t| t.tail_file == "/var/log/syslog"));

    // The config itself is untouched.
    assert_eq!(cfg.servers["a"].tail_lines, 10);
    Ok(())
}
