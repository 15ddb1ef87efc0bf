use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[allow(deprecated)]
fn prism(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("prism").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("PRISM_ENDPOINT")
        .env_remove("PROMPT_SUFFIX");
    cmd
}

fn write_run_output(dir: &Path, count: usize) {
    let perspectives: Vec<Value> = (0..count)
        .map(|i| {
            let bias = i as f64 / (count - 1) as f64;
            json!({
                "color": "green",
                "bias_x": (bias * 10000.0).round() / 10000.0,
                "significance_y": (i % 4) as f64 / 4.0,
                "text": format!("perspective {}", i),
            })
        })
        .collect();
    fs::write(
        dir.join("output.json"),
        json!({"input": "Cities should ban cars", "perspectives": perspectives}).to_string(),
    )
    .unwrap();
}

fn read_array(path: &Path) -> Vec<Value> {
    serde_json::from_str::<Value>(&fs::read_to_string(path).unwrap())
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

#[test]
fn scaffold_table_for_significance() {
    let dir = tempdir().unwrap();
    prism(dir.path())
        .args(["scaffold", "--significance", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scaffold: 27 perspectives"))
        .stdout(predicate::str::contains("violet"));
}

#[test]
fn scaffold_json_for_count() {
    let dir = tempdir().unwrap();
    let output = prism(dir.path())
        .args(["scaffold", "--count", "7", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let slots: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(slots.len(), 7);
    assert_eq!(slots[0]["color"], "red");
    assert_eq!(slots[3]["bias_x"], 0.5);
    assert_eq!(slots[6]["bias_x"], 1.0);
}

#[test]
fn scaffold_requires_a_size() {
    let dir = tempdir().unwrap();
    prism(dir.path()).arg("scaffold").assert().failure();
    prism(dir.path())
        .args(["scaffold", "--count", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be > 0"));
}

#[test]
fn schema_describes_config() {
    let dir = tempdir().unwrap();
    let output = prism(dir.path()).arg("schema").output().unwrap();
    assert!(output.status.success());

    let schema: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["title"], "Config");
    assert!(schema["properties"]["generation"].is_object());
}

#[test]
fn reduce_writes_three_stances() {
    let dir = tempdir().unwrap();
    write_run_output(dir.path(), 27);

    prism(dir.path())
        .args(["reduce", "--out-dir", "final"])
        .assert()
        .success();

    let total: usize = ["leftist", "common", "rightist"]
        .iter()
        .map(|stance| read_array(&dir.path().join("final").join(format!("{}.json", stance))).len())
        .sum();
    assert_eq!(total, 14);
}

#[test]
fn run_fails_on_missing_input() {
    let dir = tempdir().unwrap();
    prism(dir.path())
        .args(["run", "--input", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
    assert!(!dir.path().join("output.json").exists());
}

#[test]
fn run_rejects_input_without_statement() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("input.json"), r#"{"significance_score": 0.4}"#).unwrap();
    prism(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'input' or 'topic'"));
}

/// Answers band prompts with one unique perspective per requested slot.
struct BandResponder;

impl Respond for BandResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let prompt: Value =
            serde_json::from_str(body["messages"][0]["content"].as_str().unwrap()).unwrap();
        let color = prompt["color"].as_str().unwrap_or("repair");
        let items: Vec<Value> = prompt["items"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(|item| {
                json!({
                    "color": color,
                    "bias_x": item["bias_x"],
                    "significance_y": 0.6,
                    "text": format!("{} at {}", color, item["bias_x"]),
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": Value::Array(items).to_string()}}]
        }))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn run_end_to_end_against_mock_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(BandResponder)
        .expect(7)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("input.json"),
        r#"{"input": "Cities should ban cars", "significance_score": 0.0}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("prism.yaml"),
        format!(
            "providers:\n  http:\n    endpoint: {}\ngeneration:\n  delay_after_ms: 0\n  repair_delay_after_ms: 0\nretry:\n  max_attempts: 2\n  backoff_base_ms: 1\n",
            server.uri()
        ),
    )
    .unwrap();

    let workdir = dir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        prism(&workdir)
            .args(["run", "--stream", "--reduce", "--report", "run.md"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // One streamed line per band
    let lines: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0]["color"], "red");

    let run: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("output.json")).unwrap()).unwrap();
    let perspectives = run["perspectives"].as_array().unwrap();
    assert_eq!(run["input"], "Cities should ban cars");
    assert_eq!(perspectives.len(), 8);
    assert_eq!(perspectives[0]["bias_x"], 0.0);
    assert_eq!(perspectives[7]["bias_x"], 1.0);

    let reduced: usize = ["leftist", "common", "rightist"]
        .iter()
        .map(|stance| {
            read_array(&dir.path().join("final_output").join(format!("{}.json", stance))).len()
        })
        .sum();
    assert_eq!(reduced, 6);

    let report = fs::read_to_string(dir.path().join("run.md")).unwrap();
    assert!(report.contains("| **total** | 8 | 8 | 0 | 0 | 0 |"));
}
