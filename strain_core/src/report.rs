//! # CSV Report Writer
//!
//! Serializes a temperature sweep into a CSV table of column blocks
//! laid side by side:
//!
//! - the first block lists one row per step: temperature, bow radius
//!   in m, neutral-plane position in um
//! - each step then contributes a stress block and a strain block,
//!   three columns each (position in um, value, layer name), titled
//!   with the step temperature
//!
//! Blocks have different natural heights, so shorter ones are padded
//! with blank cells to the tallest block.

use std::path::Path;

use crate::errors::{StrainError, StrainResult};
use crate::structure::{Sample, SweepStep};

/// Filler for title cells beyond the two labels of a sample block.
const TITLE_PAD: &str = "-";
/// Filler for data cells below the end of a block.
const DATA_PAD: &str = " ";

/// One column block: a title row plus data rows of equal width.
struct Block {
    title: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Block {
    fn width(&self) -> usize {
        self.title.len()
    }

    fn pad_to(&mut self, height: usize) {
        while self.rows.len() < height {
            self.rows.push(vec![DATA_PAD.to_string(); self.width()]);
        }
    }
}

fn summary_block(steps: &[SweepStep]) -> Block {
    Block {
        title: vec![
            "T(K)".to_string(),
            "R(m)".to_string(),
            "neutralPlanePos(um)".to_string(),
        ],
        rows: steps
            .iter()
            .map(|step| {
                vec![
                    format!("{}", step.temperature_k.0),
                    format!("{}", step.radius_m.0),
                    format!("{}", step.neutral_plane_um.0),
                ]
            })
            .collect(),
    }
}

fn sample_block(samples: &[Sample], label: String) -> Block {
    Block {
        title: vec!["x(um)".to_string(), label, TITLE_PAD.to_string()],
        rows: samples
            .iter()
            .map(|sample| {
                vec![
                    format!("{}", sample.position_um.0),
                    format!("{}", sample.value),
                    sample.layer.clone(),
                ]
            })
            .collect(),
    }
}

/// Render a temperature sweep as CSV text.
pub fn csv_string(steps: &[SweepStep]) -> String {
    let mut blocks = vec![summary_block(steps)];
    for step in steps {
        blocks.push(sample_block(
            &step.stress_gpa,
            format!("stress(GPa)@{}", step.temperature_k.0),
        ));
        blocks.push(sample_block(
            &step.strain,
            format!("strain@{}", step.temperature_k.0),
        ));
    }
    let height = blocks.iter().map(|b| b.rows.len()).max().unwrap_or(0);
    for block in &mut blocks {
        block.pad_to(height);
    }

    let mut out = String::new();
    let title: Vec<&str> = blocks
        .iter()
        .flat_map(|b| b.title.iter().map(String::as_str))
        .collect();
    out.push_str(&title.join(","));
    out.push('\n');
    for i in 0..height {
        let row: Vec<&str> = blocks
            .iter()
            .flat_map(|b| b.rows[i].iter().map(String::as_str))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Write a temperature sweep to a CSV file.
pub fn write_csv(steps: &[SweepStep], path: &Path) -> StrainResult<()> {
    std::fs::write(path, csv_string(steps)).map_err(|e| {
        StrainError::file_error("write", path.display().to_string(), e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Kelvin, Meters, Micrometers};

    fn sample(position_um: f64, value: f64, layer: &str) -> Sample {
        Sample {
            position_um: Micrometers(position_um),
            value,
            layer: layer.to_string(),
        }
    }

    fn step(temperature_k: f64, samples: usize) -> SweepStep {
        let stress: Vec<Sample> = (0..samples)
            .map(|i| sample(i as f64 * 0.1, 0.5, "GaN(0.2)"))
            .collect();
        let strain: Vec<Sample> = stress
            .iter()
            .map(|s| sample(s.position_um.0, s.value / 320.0, "GaN(0.2)"))
            .collect();
        SweepStep {
            temperature_k: Kelvin(temperature_k),
            radius_m: Meters(12.5),
            neutral_plane_um: Micrometers(0.1),
            stress_gpa: stress,
            strain,
        }
    }

    #[test]
    fn test_title_row_layout() {
        let csv = csv_string(&[step(850.0, 2)]);
        let title = csv.lines().next().unwrap();
        assert_eq!(
            title,
            "T(K),R(m),neutralPlanePos(um),x(um),stress(GPa)@850,-,x(um),strain@850,-"
        );
    }

    #[test]
    fn test_all_rows_have_equal_width() {
        let csv = csv_string(&[step(850.0, 4), step(300.0, 2)]);
        let widths: Vec<usize> = csv.lines().map(|l| l.split(',').count()).collect();
        // summary block + two 3-column blocks per step
        assert!(widths.iter().all(|&w| w == 3 + 4 * 3));
        // 4 data rows (tallest block) plus the title row
        assert_eq!(widths.len(), 5);
    }

    #[test]
    fn test_short_blocks_are_padded() {
        let csv = csv_string(&[step(850.0, 4), step(300.0, 2)]);
        let last = csv.lines().last().unwrap();
        let cells: Vec<&str> = last.split(',').collect();
        // the summary block has only 2 rows, so row 4 starts padded
        assert_eq!(cells[0], " ");
        // the 850 K blocks are full height
        assert_ne!(cells[3], " ");
        // the 300 K blocks ran out after 2 rows
        assert_eq!(cells[9], " ");
    }

    #[test]
    fn test_infinite_radius_renders() {
        let mut flat = step(300.0, 1);
        flat.radius_m = Meters(f64::INFINITY);
        let csv = csv_string(&[flat]);
        let first_data = csv.lines().nth(1).unwrap();
        assert!(first_data.starts_with("300,inf,"));
    }

    #[test]
    fn test_write_csv_reports_bad_path() {
        let steps = [step(300.0, 1)];
        let result = write_csv(&steps, Path::new("/nonexistent-dir/out.csv"));
        assert!(matches!(result, Err(StrainError::FileError { .. })));
    }
}
