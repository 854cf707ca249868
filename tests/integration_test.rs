#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn gitcfg_cmd() -> assert_cmd::Command {
	assert_cmd::Command::cargo_bin("gitcfg").unwrap()
}

const SAMPLE: &str = "top = base
[core]
	editor = vim ; trailing comment
	bare
[remote \"origin\"]
	url = git@host:repo.git
	fetch = +refs/heads/*
	fetch = +refs/tags/*
[Net]
	retries = 3
	verbose = yes
";

fn write_config(content: &str) -> (TempDir, PathBuf) {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = temp_dir.path().join("config");
	fs::write(&path, content).unwrap();
	(temp_dir, path)
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	gitcfg_cmd()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("git-config style files"));
}

#[test]
fn test_version_flag() {
	gitcfg_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("gitcfg"));
}

#[test]
fn test_no_args_shows_help() {
	gitcfg_cmd()
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_file() {
	let temp_dir = tempfile::tempdir().unwrap();

	gitcfg_cmd()
		.args(["list", "--file"])
		.arg(temp_dir.path().join("nope"))
		.assert()
		.failure()
		.stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_check_missing_file() {
	let temp_dir = tempfile::tempdir().unwrap();

	gitcfg_cmd()
		.args(["check", "--file"])
		.arg(temp_dir.path().join("nope"))
		.assert()
		.failure()
		.stderr(predicate::str::contains("Config file not found"));
}

// ============================================================================
// get
// ============================================================================

#[test]
fn test_get_last_value() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["get", "remote.origin.fetch", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout("+refs/tags/*\n");
}

#[test]
fn test_get_all_values() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["get", "--all", "remote.origin.fetch", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout("+refs/heads/*\n+refs/tags/*\n");
}

#[test]
fn test_get_strips_comment_and_matches_case() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["get", "CORE.Editor", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout("vim\n");
}

#[test]
fn test_get_typed() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["get", "net.verbose", "--type", "bool", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout("true\n");

	gitcfg_cmd()
		.args(["get", "core.bare", "--type", "bool", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout("false\n");

	gitcfg_cmd()
		.args(["get", "net.retries", "--type", "uint", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout("3\n");
}

#[test]
fn test_get_invalid_type() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["get", "core.editor", "--type", "int", "--file"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("Invalid value for core.editor"));
}

#[test]
fn test_get_missing_key() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["get", "core.nothing", "--file"])
		.arg(&path)
		.assert()
		.code(1)
		.stdout("");
}

// ============================================================================
// list / fmt
// ============================================================================

#[test]
fn test_list() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["list", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout(
			"top=base\n\
			 core.bare\n\
			 core.editor=vim\n\
			 net.retries=3\n\
			 net.verbose=yes\n\
			 remote.origin.fetch=+refs/heads/*\n\
			 remote.origin.fetch=+refs/tags/*\n\
			 remote.origin.url=git@host:repo.git\n",
		);
}

#[test]
fn test_fmt() {
	let (_dir, path) = write_config(SAMPLE);

	let output = gitcfg_cmd()
		.args(["fmt", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout(predicate::str::contains(
			"[remote \"origin\"]\n\tfetch = +refs/heads/*\n",
		))
		.stdout(predicate::str::contains("[Net]\n"))
		.get_output()
		.stdout
		.clone();

	// formatted output is itself a valid config with the same content
	let original = gitcfg::parse_config_str(SAMPLE).unwrap();
	let formatted = gitcfg::parse_config_str(&String::from_utf8(output).unwrap()).unwrap();
	assert_eq!(original, formatted);
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_valid() {
	let (_dir, path) = write_config(SAMPLE);

	gitcfg_cmd()
		.args(["check", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout(predicate::str::contains("is valid (3 sections)"));
}

#[test]
fn test_check_reports_position() {
	let (_dir, path) = write_config("[core]\n\tname = \"unterminated\n");

	gitcfg_cmd()
		.args(["check", "--file"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("Line: 2"));
}

#[test]
fn test_check_quote_across_lines() {
	let (_dir, path) = write_config("[core]\n\tname = \"a;b\\\nc;d\"\n");

	gitcfg_cmd()
		.args(["check", "--file"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("Line: 2"));
}

#[test]
fn test_strict_sub_section_escapes() {
	let (_dir, path) = write_config("[remote \"or\\igin\"]\n\turl = x\n");

	gitcfg_cmd()
		.args(["get", "remote.orgin.url", "--file"])
		.arg(&path)
		.assert()
		.success()
		.stdout("x\n");

	gitcfg_cmd()
		.args(["check", "--strict", "--file"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("Line: 1"));
}

#[test]
fn test_parse_error_on_get() {
	let (_dir, path) = write_config("[core\n");

	gitcfg_cmd()
		.args(["get", "core.x", "--file"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("Failed to parse"));
}
