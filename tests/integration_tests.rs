use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn runs_without_arguments() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.assert().success().stdout(contains("braid run"));
}

#[test]
fn runs_arithmetic_to_completion() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("run").arg("tests/files/arith.bra");

    cmd.assert()
        .success()
        .stdout(contains("Halted"))
        .stdout(contains("[002] .................6"));
}

#[test]
fn bare_path_is_shorthand_for_run() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("tests/files/arith.bra");

    cmd.assert().success().stdout(contains("Halted"));
}

#[test]
fn counts_down_through_a_label_loop() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("run").arg("tests/files/loop.bra");

    cmd.assert()
        .success()
        .stdout(contains("Halted"))
        .stdout(contains("[002] .................0"));
}

#[test]
fn division_fills_the_remainder_register() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("run").arg("tests/files/div.bra");

    cmd.assert()
        .success()
        .stdout(contains("[001] ..............3333"))
        .stdout(contains("[002] .................0"));
}

#[test]
fn step_limit_stops_a_spinning_program() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("run").arg("tests/files/spin.bra").args(["--limit", "10"]);

    cmd.assert()
        .success()
        .stdout(contains("Stopped"))
        .stdout(contains("step limit reached"));
}

#[test]
fn missing_jump_target_faults_at_the_failing_line() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("run").arg("tests/files/fault.bra");

    cmd.assert()
        .failure()
        .stderr(contains("faulted at line 0"));
}

#[test]
fn check_accepts_a_valid_program() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("check").arg("tests/files/loop.bra");

    cmd.assert()
        .success()
        .stdout(contains("no errors found!"));
}

#[test]
fn check_rejects_indirect_without_memory_marker() {
    let mut cmd = Command::cargo_bin("braid").unwrap();
    cmd.arg("check").arg("tests/files/bad.bra");

    cmd.assert().failure().stderr(contains("Malformed operand"));
}
