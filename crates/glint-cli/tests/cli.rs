//! End-to-end tests for the glint binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PROGRAM: &str = r#"using System.Linq;

class Program
{
    int[] Run()
    {
        var a = new[] { 1, 2 }.ToArray();
        return a;
    }
}
"#;

const PROGRAM_FIXED: &str = r#"using System.Linq;

class Program
{
    int[] Run()
    {
        var a = new[] { 1, 2 };
        return a;
    }
}
"#;

const CLEAN: &str = "class Clean\n{\n    int Run(int a) => a;\n}\n";

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("glint").unwrap()
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("fix"))
        .stdout(predicate::str::contains("rules"));
}

#[test]
fn check_reports_location_and_rule() {
    let dir = project(&[("Program.cs", PROGRAM)]);
    cli()
        .args(["check", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Program.cs:7:17: warning[GL1001]: .ToArray() is redundant",
        ))
        .stdout(predicate::str::contains(
            "Checked 1 file(s): 0 error(s), 1 warning(s), 0 info",
        ));
}

#[test]
fn check_clean_project() {
    let dir = project(&[("Clean.cs", CLEAN)]);
    cli()
        .args(["check", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 error(s), 0 warning(s)"));
}

#[test]
fn check_fails_on_error_severity() {
    let dir = project(&[
        ("Program.cs", PROGRAM),
        (
            ".glintrc.toml",
            "[linter.rules.usage]\nredundant-to-array = \"error\"\n",
        ),
    ]);
    cli()
        .args(["check", arg(dir.path())])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[GL1001]"));
}

#[test]
fn check_respects_disabled_rules() {
    let dir = project(&[("Program.cs", PROGRAM)]);
    let config = dir.path().join("custom.json");
    fs::write(&config, r#"{ "linter": { "rules": { "usage": { "GL1001": "off" } } } }"#).unwrap();
    cli()
        .args(["check", "--config", arg(&config), arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("GL1001").not());
}

#[test]
fn check_json_output() {
    let dir = project(&[("Program.cs", PROGRAM)]);
    let output = cli()
        .args(["check", "--format", "json", arg(dir.path())])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["ruleId"], "GL1001");
    assert_eq!(json[0]["severity"], "warning");
    assert_eq!(json[0]["location"]["line"], 7);
}

#[test]
fn check_skips_excluded_directories() {
    let dir = project(&[("obj/Generated.cs", PROGRAM), ("Clean.cs", CLEAN)]);
    cli()
        .args(["check", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked 1 file(s)"));
}

#[test]
fn check_missing_path() {
    cli()
        .args(["check", "does/not/exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does/not/exist"));
}

#[test]
fn fix_writes_files() {
    let dir = project(&[("Program.cs", PROGRAM), ("Clean.cs", CLEAN)]);
    cli()
        .args(["fix", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 1 of 2 file(s), 1 fix(es)"));
    assert_eq!(read(&dir, "Program.cs"), PROGRAM_FIXED);
    assert_eq!(read(&dir, "Clean.cs"), CLEAN);
}

const PRINTER: &str = r#"using System;
using System.Linq;

class Printer
{
    Action<int> MakePrinter() => null;

    int Run(int[] numbers, bool flag)
    {
        numbers.ToList().ForEach(MakePrinter());
        return !flag ? 1 : 2;
    }
}
"#;

const PRINTER_FIXED: &str = r#"using System;
using System.Linq;

class Printer
{
    Action<int> MakePrinter() => null;

    int Run(int[] numbers, bool flag)
    {
        numbers.ToList().ForEach(MakePrinter());
        return flag ? 2 : 1;
    }
}
"#;

#[test]
fn fix_keeps_declined_fixes_untouched_across_files() {
    let dir = project(&[
        ("Program.cs", PROGRAM),
        ("src/Printer.cs", PRINTER),
        ("Clean.cs", CLEAN),
    ]);
    cli()
        .args(["fix", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 2 of 3 file(s), 2 fix(es)"));
    assert_eq!(read(&dir, "Program.cs"), PROGRAM_FIXED);
    assert_eq!(read(&dir, "src/Printer.cs"), PRINTER_FIXED);
    assert_eq!(read(&dir, "Clean.cs"), CLEAN);

    // the call whose fix declined is still reported
    cli()
        .args(["check", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Printer.cs:10:9: warning[GL1003]"))
        .stdout(predicate::str::contains("GL2004").not());
}

#[test]
fn fix_dry_run_prints_diff() {
    let dir = project(&[("Program.cs", PROGRAM)]);
    cli()
        .args(["fix", "--dry-run", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "-        var a = new[] { 1, 2 }.ToArray();",
        ))
        .stdout(predicate::str::contains("+        var a = new[] { 1, 2 };"))
        .stdout(predicate::str::contains("Would fix 1 of 1 file(s)"));
    assert_eq!(read(&dir, "Program.cs"), PROGRAM);
}

#[test]
fn rules_table() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("GL1001   redundant-to-array"))
        .stdout(predicate::str::contains("GL2004"));
}

#[test]
fn rules_json() {
    let output = cli().args(["rules", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 11);
    assert_eq!(json[9]["name"], "negated-ternary-condition");
}
