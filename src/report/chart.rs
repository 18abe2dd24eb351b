//! SVG line and bar charts

use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const MARGIN: f64 = 60.0;

/// Chart style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One labelled series rendered to a standalone SVG document
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub width: u32,
    pub height: u32,
}

impl Chart {
    fn new(title: &str, kind: ChartKind, points: impl IntoIterator<Item = (String, Option<f64>)>) -> Self {
        let (labels, values) = points.into_iter().unzip();
        Self {
            title: title.to_string(),
            kind,
            labels,
            values,
            width: 1200,
            height: 600,
        }
    }

    pub fn line(title: &str, points: impl IntoIterator<Item = (String, Option<f64>)>) -> Self {
        Self::new(title, ChartKind::Line, points)
    }

    pub fn bar(title: &str, points: impl IntoIterator<Item = (String, Option<f64>)>) -> Self {
        Self::new(title, ChartKind::Bar, points)
    }

    fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied().filter(|v| v.is_finite())
    }

    /// Value range, always containing zero for bar charts
    fn y_range(&self) -> (f64, f64) {
        let (mut lo, mut hi) = self
            .present()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if lo > hi {
            return (0.0, 1.0);
        }
        if self.kind == ChartKind::Bar {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        if lo == hi {
            lo -= 1.0;
            hi += 1.0;
        }
        (lo, hi)
    }

    /// Render the chart as an SVG document
    pub fn to_svg(&self) -> String {
        let width = self.width as f64;
        let height = self.height as f64;
        let plot_w = width - 2.0 * MARGIN;
        let plot_h = height - 2.0 * MARGIN;
        let (lo, hi) = self.y_range();
        let n = self.values.len().max(1) as f64;

        let y = |v: f64| MARGIN + (hi - v) / (hi - lo) * plot_h;
        let slot = plot_w / n;
        let x = |i: usize| MARGIN + slot * (i as f64 + 0.5);

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="18">{}</text>"#,
            width / 2.0,
            MARGIN / 2.0,
            escape(&self.title)
        );

        // axes
        let _ = writeln!(
            svg,
            r#"<line x1="{m}" y1="{m}" x2="{m}" y2="{b}" stroke="black"/>"#,
            m = MARGIN,
            b = height - MARGIN
        );
        if lo <= 0.0 && hi >= 0.0 {
            let _ = writeln!(
                svg,
                r#"<line x1="{}" y1="{z:.2}" x2="{}" y2="{z:.2}" stroke="gray"/>"#,
                MARGIN,
                width - MARGIN,
                z = y(0.0)
            );
        }
        for v in [lo, hi] {
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{:.2}" text-anchor="end" font-size="12">{:.2}</text>"#,
                MARGIN - 6.0,
                y(v),
                v
            );
        }
        if let (Some(first), Some(last)) = (self.labels.first(), self.labels.last()) {
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{}" font-size="12">{}</text>"#,
                MARGIN,
                height - MARGIN / 2.0,
                escape(first)
            );
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="end" font-size="12">{}</text>"#,
                width - MARGIN,
                height - MARGIN / 2.0,
                escape(last)
            );
        }

        match self.kind {
            ChartKind::Line => {
                // a missing value ends the current segment
                let mut segment: Vec<String> = Vec::new();
                for (i, value) in self.values.iter().enumerate() {
                    match value.filter(|v| v.is_finite()) {
                        Some(v) => segment.push(format!("{:.2},{:.2}", x(i), y(v))),
                        None => write_segment(&mut svg, &mut segment),
                    }
                }
                write_segment(&mut svg, &mut segment);
            }
            ChartKind::Bar => {
                let bar_w = (slot * 0.8).max(1.0);
                for (i, value) in self.values.iter().enumerate() {
                    let Some(v) = value.filter(|v| v.is_finite()) else {
                        continue;
                    };
                    let (top, bottom) = if v >= 0.0 { (y(v), y(0.0)) } else { (y(0.0), y(v)) };
                    let _ = writeln!(
                        svg,
                        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{}: {}</title></rect>"#,
                        x(i) - bar_w / 2.0,
                        top,
                        bar_w,
                        bottom - top,
                        if v >= 0.0 { "seagreen" } else { "firebrick" },
                        escape(&self.labels[i]),
                        v
                    );
                }
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write the SVG document to `path`
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_svg())?;
        tracing::debug!(path = ?path, points = self.values.len(), "Wrote chart");
        Ok(())
    }
}

fn write_segment(svg: &mut String, segment: &mut Vec<String>) {
    if segment.is_empty() {
        return;
    }
    let _ = writeln!(
        svg,
        r#"<polyline fill="none" stroke="steelblue" stroke-width="1.5" points="{}"/>"#,
        segment.join(" ")
    );
    segment.clear();
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
