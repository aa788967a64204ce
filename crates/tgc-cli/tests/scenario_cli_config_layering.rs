use assert_cmd::Command;
use predicates::prelude::*;

/// Config files drive input path, column names, and rounding; flags override them.

const CUSTOM_CSV: &str = "id,dir,qty,px,commission\n1,BUY,4,25,0.125\n2,SELL,4,26,0.125\n";

#[test]
fn config_supplies_path_columns_and_decimals() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fills.csv"), CUSTOM_CSV).unwrap();
    std::fs::write(
        dir.path().join("tgc.yaml"),
        r#"
input:
  path: "fills.csv"
  columns:
    trade_id: "id"
    side: "dir"
    quantity: "qty"
    price: "px"
    fee: "commission"
report:
  decimals: 3
"#,
    )
    .unwrap();

    Command::cargo_bin("tgc")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["gain", "--config", "tgc.yaml"])
        .assert()
        .success()
        .stdout("Gain: 4.000\nFees: 0.250\n");

    // --decimals beats report.decimals
    Command::cargo_bin("tgc")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["gain", "--config", "tgc.yaml", "--decimals", "1"])
        .assert()
        .success()
        .stdout("Gain: 4.0\nFees: 0.3\n");
}

#[test]
fn unknown_config_key_warns_but_runs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("trades.csv"),
        "trade id,side,size,price,fee\n1,BUY,1,1,0\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("tgc.yaml"), "report:\n  colour: true\n").unwrap();

    Command::cargo_bin("tgc")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["gain", "--config", "tgc.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("report.colour"));
}
