use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

#[test]
fn empty_project_exits_with_scan_error_code() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("depguard")
        .unwrap()
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(contains("No dependency manifests found"));
}

#[test]
fn clean_project_with_no_advisories_exits_zero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), r#"{"dependencies":{"left-pad":"1.0.0"}}"#).unwrap();

    Command::cargo_bin("depguard")
        .unwrap()
        .arg(dir.path())
        .assert()
        .code(0)
        .stdout(contains("no advisories matched"));
}

#[test]
fn reachable_critical_advisory_exits_one() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("package.json"), r#"{"dependencies":{"lodash":"4.17.20"}}"#).unwrap();
    fs::write(
        dir.path().join("src/index.js"),
        "const _=require('lodash'); app.get('/x',(req,res)=>res.send(_.template(req.query.t)()))",
    )
    .unwrap();

    let advisories = dir.path().join("advisories.json");
    fs::write(
        &advisories,
        r#"[{"id":"GHSA-test","package":"lodash","affected_range":"<4.17.21","severity":"CRITICAL","cvss":9.8,"epss":null,"kev":false,"affected_function":"template"}]"#,
    )
    .unwrap();

    Command::cargo_bin("depguard")
        .unwrap()
        .arg(dir.path())
        .arg("--advisories")
        .arg(&advisories)
        .assert()
        .code(1)
        .stdout(contains("lodash"));
}
