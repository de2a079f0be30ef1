use std::{error::Error, path::Path};

use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::tempdir;

fn write_people_csv(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    let path = dir.join("people.csv");
    std::fs::write(
        &path,
        "age,income,city\n34,52000.5,Lisbon\n28,41000,Porto\n45,61000.25,Lisbon\n52,70500,Faro\n",
    )?;
    Ok(path)
}

#[test]
fn test_plot_command_saves_requested_chart() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempdir()?;
    let data_path = write_people_csv(temp_dir.path())?;
    let chart_path = temp_dir.path().join("charts").join("income.html");

    let mut cmd = cargo_bin_cmd!("dataviz");
    cmd.env("DATAVIZ_OUTPUT__DISPLAY", "none")
        .arg("plot")
        .arg(&data_path)
        .arg("--kind")
        .arg("scatter")
        .arg("--columns")
        .arg("age,income")
        .arg("--title")
        .arg("Income by age")
        .arg("--save")
        .arg("--output")
        .arg(&chart_path);

    let output = cmd.output()?;
    assert!(
        output.status.success(),
        "Command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        chart_path.exists(),
        "income.html should have been created in the temporary directory"
    );

    let html = std::fs::read_to_string(&chart_path)?;
    assert!(html.contains("Income by age"), "chart title should be embedded");
    Ok(())
}

#[test]
fn test_plot_command_without_save_writes_nothing() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempdir()?;
    let data_path = write_people_csv(temp_dir.path())?;

    let mut cmd = cargo_bin_cmd!("dataviz");
    cmd.current_dir(temp_dir.path())
        .arg("--display")
        .arg("none")
        .arg("plot")
        .arg(&data_path)
        .arg("--kind")
        .arg("heatmap")
        .arg("--columns")
        .arg("age,income");

    let output = cmd.output()?;
    assert!(
        output.status.success(),
        "Command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let entries: Vec<_> = std::fs::read_dir(temp_dir.path())?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1, "only the data file should be present");
    Ok(())
}

#[test]
fn test_plot_command_saves_kind_named_svg_by_default() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempdir()?;
    let data_path = write_people_csv(temp_dir.path())?;

    let mut cmd = cargo_bin_cmd!("dataviz");
    cmd.current_dir(temp_dir.path())
        .arg("--display")
        .arg("none")
        .arg("plot")
        .arg(&data_path)
        .arg("--kind")
        .arg("scatter")
        .arg("--columns")
        .arg("age,income")
        .arg("--save");

    let output = cmd.output()?;
    assert!(
        output.status.success(),
        "Command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let svg = std::fs::read_to_string(temp_dir.path().join("scatter.svg"))?;
    assert!(svg.contains("<svg"), "scatter.svg should hold an svg document");
    Ok(())
}

#[test]
fn test_plot_command_rejects_unknown_kind() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempdir()?;
    let data_path = write_people_csv(temp_dir.path())?;

    let output = cargo_bin_cmd!("dataviz")
        .args(["--display", "none", "plot"])
        .arg(&data_path)
        .args(["--kind", "pie", "--columns", "age"])
        .output()?;

    assert!(!output.status.success(), "pie is not a supported chart");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid plot type"));
    Ok(())
}

#[test]
fn test_plot_command_rejects_text_column() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempdir()?;
    let data_path = write_people_csv(temp_dir.path())?;

    let output = cargo_bin_cmd!("dataviz")
        .args(["--display", "none", "plot"])
        .arg(&data_path)
        .args(["--kind", "scatter", "--columns", "age,city"])
        .output()?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("must be numeric"));
    Ok(())
}

#[test]
fn test_inspect_lists_column_types() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempdir()?;
    let data_path = write_people_csv(temp_dir.path())?;

    let output = cargo_bin_cmd!("dataviz")
        .arg("inspect")
        .arg(&data_path)
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["age\tint\t4", "income\tfloat\t4", "city\tstr\t4"]
    );
    Ok(())
}

#[test]
fn test_interactive_session_quits_on_sentinel() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempdir()?;
    let data_path = write_people_csv(temp_dir.path())?;
    let script = format!("{}\nbox\nage,income\nb\nq\n", data_path.display());

    let output = cargo_bin_cmd!("dataviz")
        .args(["--display", "none"])
        .write_stdin(script)
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Loaded 4 rows"));
    assert_eq!(stdout.matches("Enter the path to the data file").count(), 2);
    Ok(())
}
