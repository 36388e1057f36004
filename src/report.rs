//! Rendering of chart data for the terminal.

use crate::error::Result;
use crate::models::ChartData;

const PERIOD_HEADER: &str = "Period";

/// One row per period, one column per series. Values are right-aligned with
/// `decimals` places; no data renders as an empty cell, never as zero.
pub fn format_table(chart: &ChartData, decimals: usize) -> String {
    let mut header = vec![PERIOD_HEADER.to_string()];
    header.extend(chart.series.iter().map(|s| s.label.clone()));

    let rows: Vec<Vec<String>> = chart
        .labels
        .iter()
        .enumerate()
        .map(|(i, period)| {
            let mut row = vec![period.clone()];
            row.extend(chart.series.iter().map(|s| match s.values.get(i).copied().flatten() {
                Some(v) => format!("{:.*}", decimals, v),
                None => String::new(),
            }));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

/// Pretty JSON. No data serializes as `null`.
pub fn to_json(chart: &ChartData) -> Result<String> {
    Ok(serde_json::to_string_pretty(chart)?)
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(col, (cell, width))| {
            if col == 0 {
                format!("{:<width$}", cell, width = width)
            } else {
                format!("{:>width$}", cell, width = width)
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlignedSeries;

    fn chart() -> ChartData {
        ChartData {
            labels: vec!["01/2021".into(), "02/2021".into(), "03/2021".into()],
            series: vec![
                AlignedSeries::new("91 Day Bill", vec![Some(7.2), Some(7.2), Some(7.2)]),
                AlignedSeries::new("CBR", vec![None, None, Some(6.3)]),
            ],
        }
    }

    #[test]
    fn test_table_layout() {
        let text = format_table(&chart(), 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Period   91 Day Bill   CBR");
        assert_eq!(lines[1], "-------  -----------  ----");
        assert_eq!(lines[2], "01/2021         7.20");
        assert_eq!(lines[4], "03/2021         7.20  6.30");
    }

    #[test]
    fn test_decimals_respected() {
        let text = format_table(&chart(), 0);
        assert!(text.lines().nth(4).unwrap().ends_with("  6"));
    }

    #[test]
    fn test_json_uses_null_for_no_data() {
        let text = to_json(&chart()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["labels"][2], "03/2021");
        assert!(value["series"][1]["values"][0].is_null());
        assert_eq!(value["series"][1]["values"][2], 6.3);
    }

    #[test]
    fn test_empty_chart_has_header_only() {
        let empty = ChartData {
            labels: vec![],
            series: vec![],
        };
        assert_eq!(format_table(&empty, 2), "Period\n------\n");
    }
}
