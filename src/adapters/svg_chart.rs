//! SVG line chart of closing prices, one polyline per ticker.

use crate::domain::enrich::EnrichedTable;
use crate::domain::error::AnalysisError;
use crate::ports::chart_port::ChartPort;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::info;

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 450.0;
const PADDING: f64 = 60.0;
const LEGEND_ROW: f64 = 18.0;

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

pub struct SvgChartAdapter;

impl ChartPort for SvgChartAdapter {
    fn render(&self, table: &EnrichedTable, title: &str, output: &Path) -> Result<(), AnalysisError> {
        let svg = render_close_chart(table, title);
        fs::write(output, svg)?;
        info!(path = %output.display(), tickers = table.tickers.len(), "wrote closing price chart");
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn placeholder(title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="100%" height="100%" fill="white"/>
  <text x="{cx:.0}" y="{pad:.0}" text-anchor="middle" font-size="16">{title}</text>
  <text x="{cx:.0}" y="{cy:.0}" text-anchor="middle" font-size="12">No price data available.</text>
</svg>
"#,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        cy = HEIGHT / 2.0,
        pad = PADDING / 2.0,
        title = escape(title),
    )
}

pub fn render_close_chart(table: &EnrichedTable, title: &str) -> String {
    if table.is_empty() {
        return placeholder(title);
    }

    let min_close = table.rows.iter().map(|r| r.bar.close).fold(f64::INFINITY, f64::min);
    let max_close = table
        .rows
        .iter()
        .map(|r| r.bar.close)
        .fold(f64::NEG_INFINITY, f64::max);
    let (first_date, last_date) = date_span(table);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_close - min_close;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let days = (last_date - first_date).num_days();
    let scale_x = if days > 0 { plot_width / days as f64 } else { 0.0 };

    let mut lines = String::new();
    let mut legend = String::new();
    let plotted = table
        .tickers
        .iter()
        .filter(|t| table.rows_for(t).next().is_some());

    for (idx, ticker) in plotted.enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let points: Vec<String> = table
            .partition(ticker)
            .iter()
            .map(|row| {
                let x = PADDING + (row.bar.date - first_date).num_days() as f64 * scale_x;
                let y = HEIGHT - PADDING - (row.bar.close - min_close) * scale_y;
                format!("{:.1},{:.1}", x, y)
            })
            .collect();

        lines.push_str(&format!(
            "  <polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
            color,
            points.join(" ")
        ));

        let ly = PADDING + idx as f64 * LEGEND_ROW;
        legend.push_str(&format!(
            "  <rect x=\"{:.0}\" y=\"{:.0}\" width=\"12\" height=\"12\" fill=\"{}\"/>\n\
             \x20 <text x=\"{:.0}\" y=\"{:.0}\" font-size=\"12\">{}</text>\n",
            WIDTH - PADDING + 8.0,
            ly - 10.0,
            color,
            WIDTH - PADDING + 24.0,
            ly,
            escape(ticker)
        ));
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {vw:.0} {h:.0}">
  <rect width="100%" height="100%" fill="white"/>
  <text x="{cx:.0}" y="{ty:.0}" text-anchor="middle" font-size="16">{title}</text>
  <line x1="{pad:.0}" y1="{pad:.0}" x2="{pad:.0}" y2="{bottom:.0}" stroke="black"/>
  <line x1="{pad:.0}" y1="{bottom:.0}" x2="{right:.0}" y2="{bottom:.0}" stroke="black"/>
  <text x="{lx:.0}" y="{bottom:.0}" text-anchor="end" font-size="11">{min:.2}</text>
  <text x="{lx:.0}" y="{pad:.0}" text-anchor="end" font-size="11">{max:.2}</text>
  <text x="{pad:.0}" y="{dy:.0}" text-anchor="start" font-size="11">{first}</text>
  <text x="{right:.0}" y="{dy:.0}" text-anchor="end" font-size="11">{last}</text>
  <text x="{cx:.0}" y="{xl:.0}" text-anchor="middle" font-size="12">Date</text>
  <text x="14" y="{cy:.0}" text-anchor="middle" font-size="12" transform="rotate(-90 14 {cy:.0})">Close</text>
{lines}{legend}</svg>
"#,
        w = WIDTH + 80.0,
        vw = WIDTH + 80.0,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        cy = HEIGHT / 2.0,
        ty = PADDING / 2.0,
        pad = PADDING,
        bottom = HEIGHT - PADDING,
        right = WIDTH - PADDING,
        lx = PADDING - 6.0,
        dy = HEIGHT - PADDING + 16.0,
        xl = HEIGHT - PADDING / 4.0,
        min = min_close,
        max = max_close,
        first = first_date,
        last = last_date,
        title = escape(title),
        lines = lines,
        legend = legend,
    )
}

fn date_span(table: &EnrichedTable) -> (NaiveDate, NaiveDate) {
    let mut dates = table.rows.iter().map(|r| r.bar.date);
    let first = dates.next().unwrap_or_default();
    dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
}
