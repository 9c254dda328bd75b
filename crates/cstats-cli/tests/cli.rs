//! CLI command integration tests.
//! Each test points HOME at a temp directory so no user config is picked up.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TABLE: &str = r#"
[[rows]]
bmi = 27
description = "{name}'s {shirt_size} top strains at the seams."

[[rows]]
bmi = 28
description = "{name} is {weight} lbs of softness."
"#;

fn cs_cmd(home: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("cstats").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("USERPROFILE")
        .env_remove("CSTATS_CONFIG")
        .env_remove("CSTATS_TABLE");
    cmd
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn stats_defaults() {
    let dir = TempDir::new().unwrap();
    cs_cmd(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Today's date is June 15, 2016.]"))
        .stdout(predicate::str::contains("Maddy's Stats"))
        .stdout(predicate::str::contains("26.6 (Chubby)"));
}

#[test]
fn stats_json() {
    let dir = TempDir::new().unwrap();
    let output = cs_cmd(&dir).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "Maddy");
    assert_eq!(json["age"], 19);
    assert_eq!(json["max_calories"], 1620);
    assert_eq!(json["pant_size"], 14);
}

#[test]
fn config_from_env_var() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "custom.toml",
        "[character]\nname = \"Rosie\"\nweight = 190\n",
    );

    cs_cmd(&dir)
        .env("CSTATS_CONFIG", &config)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rosie's Stats"))
        .stdout(predicate::str::contains("has gained 20 lbs"));
}

#[test]
fn default_config_location() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".character-stats")).unwrap();
    write_file(
        &dir,
        ".character-stats/config.toml",
        "[character]\nname = \"Juniper\"\n",
    );

    cs_cmd(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Juniper's Stats"));
}

#[test]
fn bad_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "bad.toml", "colour = \"blue\"\n");

    cs_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn turn_prints_both_copies() {
    let dir = TempDir::new().unwrap();
    let output = cs_cmd(&dir)
        .args(["turn", "{pie:500} She reaches for more."])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (outbound, visible) = stdout.split_once("\n---\n").unwrap();
    assert!(outbound.contains("Maddy's Stats"));
    assert!(outbound.contains("She reaches for more."));
    assert!(!outbound.contains("{pie:500}"));
    assert!(!visible.contains("Maddy's Stats"));
    assert!(visible.contains("She reaches for more."));
}

#[test]
fn turn_json() {
    let dir = TempDir::new().unwrap();
    let output = cs_cmd(&dir)
        .args(["turn", "==END_DAY==", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["turn"]["report"]["days_advanced"], 1);
    assert_eq!(json["stats"]["date"], "2016-06-16");
}

#[test]
fn replay_transcript() {
    let dir = TempDir::new().unwrap();
    let transcript = write_file(
        &dir,
        "chat.txt",
        "Good morning.\n\n{waffles:2000} Breakfast time.\n\nJust chatting.\n\n==END_DAY==\n",
    );

    cs_cmd(&dir)
        .arg("replay")
        .arg(&transcript)
        .assert()
        .success()
        .stdout(predicate::str::contains("=== turn 4 ==="))
        .stdout(predicate::str::contains("=== turn 5 ===").not())
        .stdout(predicate::str::contains("done. turns=4, date=June 16, 2016"));
}

#[test]
fn table_check_and_import() {
    let dir = TempDir::new().unwrap();
    let toml = write_file(&dir, "descriptions.toml", TABLE);
    let db = dir.path().join("descriptions.sqlite");

    cs_cmd(&dir)
        .args(["table", "check"])
        .arg(&toml)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 2 rows, BMI 27..=28"));

    cs_cmd(&dir)
        .args(["table", "import"])
        .arg(&toml)
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 rows"));

    cs_cmd(&dir)
        .args(["table", "check"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 2 rows"));
}

#[test]
fn table_check_rejects_unknown_placeholder() {
    let dir = TempDir::new().unwrap();
    let toml = write_file(
        &dir,
        "bad.toml",
        "[[rows]]\nbmi = 30\ndescription = \"{waist}\"\n",
    );

    cs_cmd(&dir)
        .args(["table", "check"])
        .arg(&toml)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid table"));
}

#[test]
fn description_added_when_bmi_climbs() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "descriptions.toml", TABLE);
    let config = write_file(
        &dir,
        "config.toml",
        "table = \"descriptions.toml\"\n\n[character]\nweight = 170\n",
    );
    let transcript = write_file(
        &dir,
        "chat.txt",
        "Hello.\n\n{feast:9000} ==END_DAY==\n\n{feast:9000} ==END_DAY==\n",
    );

    cs_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("replay")
        .arg(&transcript)
        .assert()
        .success()
        .stdout(predicate::str::contains("Maddy physical appearance stats:"));
}

#[test]
fn missing_table_fails() {
    let dir = TempDir::new().unwrap();
    cs_cmd(&dir)
        .env("CSTATS_TABLE", dir.path().join("nope.toml"))
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load description table"));
}
