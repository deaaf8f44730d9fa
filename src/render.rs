use std::fmt::Write;

use colored::{Color, Colorize};

use crate::{Bucket, Questionnaire, Report};

const BAR_WIDTH: u32 = 20;

fn terminal_color(bucket: Bucket) -> Color {
    match bucket {
        Bucket::Low => Color::Green,
        Bucket::Moderate => Color::Yellow,
        Bucket::High => Color::Red,
    }
}

/// 合計行。例: `Total Stress Index: 24 / 48 (50%)`
pub fn summary_line(report: &Report) -> String {
    format!(
        "Total Stress Index: {} / {} ({:.0}%)",
        report.total,
        report.max,
        report.normalized * 100.0
    )
}

/// 結果をテキストで描画する
///
/// 合計行、判定文、因子ごとの棒グラフ、助言の一覧の順。
pub fn render_text(questionnaire: &Questionnaire, report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", questionnaire.title.bold());
    let _ = writeln!(out, "{}", summary_line(report));
    if let Some(ref summary) = report.summary {
        let _ = writeln!(out, "{}", summary.color(terminal_color(report.bucket)));
    }
    let _ = writeln!(out);

    let width = report
        .factors
        .iter()
        .map(|score| score.factor.chars().count())
        .max()
        .unwrap_or(0);
    for point in report.series() {
        let filled = (u64::from(point.value) * u64::from(BAR_WIDTH)
            / u64::from(questionnaire.scale.max)) as usize;
        let bar = "#".repeat(filled);
        let _ = writeln!(
            out,
            "{:<width$}  {:<bar_width$} {:>2} ({})",
            point.factor,
            bar.color(terminal_color(point.bucket)),
            point.value,
            point.bucket,
            width = width,
            bar_width = BAR_WIDTH as usize,
        );
    }

    if !report.advisories.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Personalized tips".bold());
        for advisory in &report.advisories {
            let _ = writeln!(out, "- {}", advisory);
        }
    }
    out
}
