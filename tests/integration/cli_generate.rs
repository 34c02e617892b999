//! End-to-end CLI tests against fake `protoc` and python executables.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const FAKE_PROTOC: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "libprotoc 25.1"
  exit 0
fi
out=""
for arg in "$@"; do
  case "$arg" in
    --java_out=*) out="${arg#--java_out=}" ;;
  esac
  last="$arg"
done
case "$last" in
  *broken.proto)
    echo "broken.proto:1:1: Expected top-level statement." >&2
    exit 1
    ;;
esac
name=$(basename "$last" .proto)
mkdir -p "$out"
echo "// generated" > "$out/$name.java"
"#;

const FAKE_PYTHON: &str = r##"#!/bin/sh
if [ "$1" = "-c" ]; then
  echo "OK"
  exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  echo "Successfully installed grpcio-tools"
  exit 0
fi
shift 2
py=""
grpc=""
for arg in "$@"; do
  case "$arg" in
    --python_out=*) py="${arg#--python_out=}" ;;
    --grpc_python_out=*) grpc="${arg#--grpc_python_out=}" ;;
  esac
  last="$arg"
done
name=$(basename "$last" .proto)
mkdir -p "$py"
echo "# generated" > "$py/${name}_pb2.py"
if [ -n "$grpc" ]; then
  echo "# generated" > "$grpc/${name}_pb2_grpc.py"
fi
"##;

struct Fixture {
    temp: TempDir,
    protoc: PathBuf,
    python: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let bin_dir = temp.path().join("bin");
        fs::create_dir_all(&bin_dir).unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        let protoc = write_script(&bin_dir.join("protoc"), FAKE_PROTOC);
        let python = write_script(&bin_dir.join("python"), FAKE_PYTHON);
        Self {
            temp,
            protoc,
            python,
        }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn proto(&self, relative: &str) -> PathBuf {
        let path = self.root().join("protos").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "syntax = \"proto3\";\n").unwrap();
        path
    }

    fn out(&self) -> PathBuf {
        self.root().join("out")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_protobatch"))
            .env("XDG_CONFIG_HOME", self.root().join("config"))
            .env("HOME", self.root())
            .arg("--workspace")
            .arg(self.root())
            .args(args)
            .output()
            .unwrap()
    }

    fn generate(&self, inputs: &[&PathBuf], extra: &[&str]) -> Output {
        let mut args: Vec<String> = vec!["generate".to_string()];
        args.extend(inputs.iter().map(|p| p.to_string_lossy().into_owned()));
        args.extend([
            "--out".to_string(),
            self.out().to_string_lossy().into_owned(),
            "--protoc".to_string(),
            self.protoc.to_string_lossy().into_owned(),
            "--python-exe".to_string(),
            self.python.to_string_lossy().into_owned(),
        ]);
        args.extend(extra.iter().map(|s| s.to_string()));
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&refs)
    }
}

fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
    path.to_path_buf()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_generate_folder_for_java_and_grpc() {
    let fx = Fixture::new();
    fx.proto("a.proto");
    fx.proto("nested/b.proto");
    let protos = fx.root().join("protos");

    let output = fx.generate(&[&protos], &["--java", "--grpc", "--yes"]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("] Processed a.proto (1/2)"), "stdout={}", text);
    assert!(text.contains("] Processed b.proto (2/2)"), "stdout={}", text);
    assert!(text.contains("] Successfully processed 2 files"), "stdout={}", text);
    assert!(text.lines().next().unwrap().starts_with('['));
    assert!(text.contains("Generated 6 files under"), "stdout={}", text);

    let out = fx.out();
    assert!(out.join("java/a.java").is_file());
    assert!(out.join("java/b.java").is_file());
    assert!(out.join("python/a_pb2.py").is_file());
    assert!(out.join("python/b_pb2_grpc.py").is_file());
}

#[test]
fn test_generate_failure_exits_nonzero_with_stderr() {
    let fx = Fixture::new();
    let a = fx.proto("a.proto");
    let broken = fx.proto("broken.proto");
    let c = fx.proto("c.proto");

    let output = fx.generate(&[&a, &broken, &c], &["--java"]);

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("Processed a.proto (1/3)"));
    assert!(!text.contains("c.proto"));
    assert!(text.contains("Java generation failed for broken.proto"));
    assert!(stderr(&output).contains("Expected top-level statement."));
    assert!(!fx.out().join("java/c.java").exists());
}

#[test]
fn test_generate_continue_on_failure_processes_remaining_files() {
    let fx = Fixture::new();
    let broken = fx.proto("broken.proto");
    let c = fx.proto("c.proto");

    let output = fx.generate(&[&broken, &c], &["--java", "--continue-on-failure"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Processed c.proto (2/2)"));
    assert!(fx.out().join("java/c.java").is_file());
}

#[test]
fn test_generate_json_emits_one_event_per_line() {
    let fx = Fixture::new();
    let a = fx.proto("a.proto");
    let b = fx.proto("b.proto");

    let output = fx.generate(&[&a, &b], &["--python", "--format", "json"]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let events: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["type"], "progress");
    assert_eq!(events[0]["index"], 1);
    assert_eq!(events[2]["type"], "terminal");
    assert_eq!(events[2]["success"], true);
    assert_eq!(events[2]["result"]["files_processed"], 2);
}

#[test]
fn test_generate_without_target_is_rejected() {
    let fx = Fixture::new();
    let a = fx.proto("a.proto");

    let output = fx.generate(&[&a], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no generation target selected"));
    assert!(!fx.out().exists());
}

#[test]
fn test_generate_missing_input_is_rejected() {
    let fx = Fixture::new();
    let missing = fx.root().join("protos/missing.proto");

    let output = fx.generate(&[&missing], &["--java"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Input not found"));
}

#[test]
fn test_generate_uses_workspace_config() {
    let fx = Fixture::new();
    let a = fx.proto("a.proto");
    fs::write(
        fx.root().join("protobatch.toml"),
        format!(
            "[generator]\ncompiler = \"{}\"\noutput_dir = \"{}\"\ntargets = [\"java\"]\n",
            fx.protoc.display(),
            fx.out().display()
        ),
    )
    .unwrap();

    let output = fx.run(&["generate", a.to_str().unwrap()]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(fx.out().join("java/a.java").is_file());
}

#[test]
fn test_discover_lists_nested_protos() {
    let fx = Fixture::new();
    fx.proto("z.proto");
    fx.proto("api/v1/a.proto");
    fs::write(fx.root().join("protos/README.md"), "docs").unwrap();

    let protos = fx.root().join("protos");
    let output = fx.run(&["discover", protos.to_str().unwrap()]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("api/v1/a.proto"));
    assert!(lines[1].ends_with("z.proto"));
}

#[test]
fn test_check_reports_fake_tools_as_json() {
    let fx = Fixture::new();

    let output = fx.run(&[
        "check",
        "--protoc",
        fx.protoc.to_str().unwrap(),
        "--python-exe",
        fx.python.to_str().unwrap(),
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["compiler_status"]["ok"], true);
    assert_eq!(report["compiler_status"]["detail"], "libprotoc 25.1");
    assert_eq!(report["toolchain_status"]["ok"], true);
    assert_eq!(report["dependencies"].as_array().unwrap().len(), 3);
}

#[test]
fn test_install_tools_with_yes_runs_pip() {
    let fx = Fixture::new();

    let output = fx.run(&[
        "install-tools",
        "--yes",
        "--python-exe",
        fx.python.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("Installed grpcio-tools"));
}

#[test]
fn test_install_tools_without_terminal_asks_for_yes() {
    let fx = Fixture::new();

    let output = fx.run(&["install-tools", "--python-exe", fx.python.to_str().unwrap()]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("pass --yes"), "stderr={}", err);
    assert!(!err.contains("Configuration error"), "stderr={}", err);
}
