#![cfg(unix)]

use brine_fidl_compiler::{FidlgenError, Formatter};
use std::{
    fs,
    io::Write,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn run(formatter: &Formatter, input: &str) -> Result<Vec<u8>, FidlgenError> {
    let mut pipe = formatter.pipe(Vec::new())?;
    pipe.write_all(input.as_bytes())?;
    pipe.close()
}

// Scripts are written and executed from a single test so no other test
// thread can fork while one of them is still open for writing.
#[test]
fn test_formatter_scripts() {
    let dir = tempfile::tempdir().unwrap();

    let upper = script(dir.path(), "upper.sh", "tr a-z A-Z");
    let out = run(&Formatter::new(Some(upper)), "class echo {}\n").unwrap();
    assert_eq!(out, b"CLASS ECHO {}\n");

    let failing = script(dir.path(), "failing.sh", "echo 'expected an identifier' >&2\nexit 3");
    match run(&Formatter::new(Some(failing)), "class {\n") {
        Err(FidlgenError::FormatterFailed { status, stderr, .. }) => {
            assert!(status.contains('3'), "status was {}", status);
            assert_eq!(stderr, "expected an identifier");
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("formatter should have failed"),
    }

    let hanging = script(dir.path(), "hanging.sh", "exec sleep 30");
    let formatter = Formatter::new(Some(hanging)).with_timeout(Duration::from_millis(300));
    let started = Instant::now();
    match run(&formatter, "class Echo {}\n") {
        Err(FidlgenError::FormatterTimeout { timeout, .. }) => assert_eq!(timeout, Duration::from_millis(300)),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("formatter should have timed out"),
    }
    assert!(started.elapsed() < Duration::from_secs(10));

    // The formatter exits, but a process it started keeps its output open.
    let leaking = script(dir.path(), "leaking.sh", "sleep 8 &\ncat");
    let formatter = Formatter::new(Some(leaking)).with_timeout(Duration::from_millis(500));
    let started = Instant::now();
    match run(&formatter, "class Echo {}\n") {
        Err(FidlgenError::FormatterTimeout { timeout, .. }) => assert_eq!(timeout, Duration::from_millis(500)),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("formatter output should have timed out"),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}
