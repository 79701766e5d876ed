//! Shared integration-test helpers: spawning the `sipcmd` binary and
//! building registries whose handlers record their invocations.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex};

use sipcmd::command::{ArgumentScheme, Arguments, CommandRegistry};

/// Invocations seen by recording handlers, in order.
pub type Calls = Arc<Mutex<Vec<(String, Arguments)>>>;

/// Runs the binary with `args` and captures its output.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command(args: &[&str]) -> Output {
    spawn_with_stdin(args, b"")
}

/// Runs the binary with `args`, feeding `stdin` and closing it.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sipcmd"))
        .args(args)
        .env_remove("SIPCMD_CONFIG")
        .env_remove("SIPCMD_IDENTITY")
        .env_remove("SIPCMD_EVENTS_FILE")
        .env_remove("SIPCMD_DEFAULT_METHOD")
        .env_remove("SIPCMD_BARE_TOKENS")
        .env_remove("SIPCMD_LOG_LEVEL")
        .env_remove("SIPCMD_LOG_FORMAT")
        .env_remove("SIPCMD_METRICS_PORT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sipcmd");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(stdin)
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for sipcmd")
}

/// Parses every stdout line as a JSON event.
#[allow(clippy::missing_panics_doc)]
pub fn events(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad event {l}: {e}")))
        .collect()
}

/// Absolute path of a file under `tests/fixtures`.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Registry with `show`, `call`, `join-conference` and `chat`, each
/// recording its arguments into the returned log.
#[must_use]
pub fn recording_registry() -> (CommandRegistry, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = CommandRegistry::new();

    for (name, scheme) in [
        ("show", ArgumentScheme::new()),
        ("call", ArgumentScheme::new().required("sip-address")),
        (
            "join-conference",
            ArgumentScheme::new()
                .required("sip-address")
                .required("conference-id"),
        ),
        (
            "chat",
            ArgumentScheme::new().required("to").optional("subject"),
        ),
    ] {
        registry.register(name, "", recorder(name, &calls), scheme);
    }

    (registry, calls)
}

/// A handler that appends `(name, args)` to `calls`.
pub fn recorder(name: &str, calls: &Calls) -> impl Fn(&Arguments) + Send + Sync + 'static {
    let name = name.to_string();
    let calls = Arc::clone(calls);
    move |args: &Arguments| {
        calls
            .lock()
            .expect("calls lock")
            .push((name.clone(), args.clone()));
    }
}

/// Builds an argument map from literal pairs.
#[must_use]
pub fn args(pairs: &[(&str, &str)]) -> Arguments {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
