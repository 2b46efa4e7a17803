use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("topicpages");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("topicpages");
    cmd.env("RUST_LOG", "debug")
        .arg("report")
        .arg("--pages")
        .arg(temp.path().join("missing.csv"))
        .arg("--out")
        .arg(temp.path().join("report.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsed cli"));
    Ok(())
}

#[test]
fn quiet_flag_hides_progress_lines() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    std::fs::write(
        temp.path().join("pages.csv"),
        "page_id,parent_id,title,display_order,has_children,layout,lang_code,description\n\
         010000_en,000000_en,01 Water Cycle,1,false,home,en,\n",
    )?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("topicpages");
    cmd.env_remove("RUST_LOG")
        .arg("--quiet")
        .arg("generate")
        .arg("--pages")
        .arg(temp.path().join("pages.csv"))
        .arg("--resources")
        .arg(temp.path().join("resources"))
        .arg("--out")
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("resources directory not found"))
        .stderr(predicate::str::contains("generated pages").not());

    assert!(temp.path().join("out").join("010000_en.md").exists());
    Ok(())
}
