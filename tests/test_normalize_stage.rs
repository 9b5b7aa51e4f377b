/// End-to-end tests for the normalization stage
use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use blastnet::normalize::NormalizeConfig;
use blastnet::pipeline::run_normalize;

fn config(dir: &TempDir, threshold: f64) -> NormalizeConfig {
    NormalizeConfig {
        id: "iyTest1".to_string(),
        dtype: "cds".to_string(),
        identity_threshold: threshold,
        output_dir: dir.path().to_path_buf(),
    }
}

fn write_input(dir: &TempDir, content: &str) -> Result<PathBuf> {
    let path = dir.path().join("blast.tsv");
    fs::write(&path, content)?;
    Ok(path)
}

#[test]
fn test_reference_row() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "Q1(ORG1)\tS1\t95.6\t100\t2\t0\t1\t100\t50\t1\t1e-20\t200\n",
    )?;

    let out = run_normalize(&config(&dir, 90.0), &input)?;

    assert_eq!(out, dir.path().join("iyTest1-cds-filtered90.tsv"));
    assert_eq!(fs::read_to_string(out)?, "S1\t1\t50\tQ1\t96\t-\tORG1\tORG1\n");
    Ok(())
}

#[test]
fn test_empty_input_writes_placeholder() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(&dir, "")?;

    let out = run_normalize(&config(&dir, 90.0), &input)?;

    assert_eq!(out, dir.path().join("iyTest1-cds-EMPTY.tsv"));
    assert_eq!(fs::read_to_string(out)?, "EMPTY\n");
    assert!(!dir.path().join("iyTest1-cds-filtered90.tsv").exists());
    Ok(())
}

#[test]
fn test_status_token_ignores_threshold() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "Q1(ORG1)\tS1\t75.0\t100\t2\t0\t1\t100\t1\t50\t1e-20\t200\n",
    )?;

    let out = run_normalize(&config(&dir, 70.0), &input)?;

    assert!(out.ends_with("iyTest1-cds-filtered90.tsv"));
    assert_eq!(fs::read_to_string(out)?, "S1\t1\t50\tQ1\t75\t+\tORG1\tORG1\n");
    Ok(())
}

#[test]
fn test_everything_filtered_gives_empty_table() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "Q1(ORG1)\tS1\t90.0\t100\t2\t0\t1\t100\t1\t50\t1e-20\t200\n",
    )?;

    let out = run_normalize(&config(&dir, 90.0), &input)?;
    assert_eq!(fs::read_to_string(out)?, "");
    Ok(())
}

#[test]
fn test_fallback_identifiers_and_sorting() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        concat!(
            "apis_XP001\tscaffold_2\t99.0\t100\t0\t0\t1\t100\t500\t400\t0\t300\n",
            "bombus_XP002\tscaffold_1\t98.4\t100\t0\t0\t1\t100\t10\t90\t0\t300\n",
            "vespa_XP003\tscaffold_1\t94.5\t100\t0\t0\t1\t100\t5\t8\t0\t300\n",
        ),
    )?;

    let out = run_normalize(&config(&dir, 90.0), &input)?;
    let lines: Vec<String> = fs::read_to_string(out)?.lines().map(str::to_string).collect();

    assert_eq!(
        lines,
        vec![
            "scaffold_1\t5\t8\tvespa\t94\t+\tID:XP003\tID:XP003",
            "scaffold_1\t10\t90\tbombus\t98\t+\tID:XP002\tID:XP002",
            "scaffold_2\t400\t500\tapis\t99\t-\tID:XP001\tID:XP001",
        ]
    );
    Ok(())
}

#[test]
fn test_malformed_coordinate_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "Q1(ORG1)\tS1\t95.6\t100\t2\t0\t1\t100\tfifty\t1\t1e-20\t200\n",
    )?;

    let err = run_normalize(&config(&dir, 90.0), &input).unwrap_err();
    assert!(format!("{err:#}").contains("sstart"));
    assert!(!dir.path().join("iyTest1-cds-filtered90.tsv").exists());
    Ok(())
}
