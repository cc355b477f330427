//! Command-line tests for the `cb2m` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cb2m() -> Command {
    Command::cargo_bin("cb2m").unwrap()
}

#[test]
fn test_classify_method_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("Run.java");
    fs::write(&file, "public static void run(){ System.out.println(1); }\n").unwrap();

    cb2m()
        .args(["classify", "--username", "alice"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("method run"));
}

#[test]
fn test_classify_class_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("Foo.java");
    fs::write(
        &file,
        "package io.codebottle.alice;\n\npublic class Foo {\n}\n",
    )
    .unwrap();

    cb2m()
        .args(["classify", "--username", "alice"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("class io.codebottle.alice.Foo"));
}

#[test]
fn test_classify_rejects_foreign_package() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("Foo.java");
    fs::write(
        &file,
        "package io.codebottle.alice;\n\npublic class Foo {\n}\n",
    )
    .unwrap();

    cb2m()
        .args(["classify", "--username", "bob"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("io.codebottle.bob"));
}

#[test]
fn test_classify_rejects_other_language() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("hello.py");
    fs::write(&file, "print('hi')\n").unwrap();

    cb2m()
        .args(["classify", "--username", "alice", "--language", "python"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Java"));
}

#[test]
fn test_serve_rejects_missing_snapshot() {
    let temp = TempDir::new().unwrap();

    cb2m()
        .arg("serve")
        .arg("--snippets")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Snippet snapshot not found"));
}
