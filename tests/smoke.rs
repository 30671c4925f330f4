use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("ddi-extractor").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn subcommand_help_lists_arguments() {
    let mut cmd = Command::cargo_bin("ddi-extractor").expect("binary exists");
    let output = cmd.args(["train", "--help"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
    assert!(stdout.contains("--max-len"));
}
