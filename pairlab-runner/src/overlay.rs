//! Chart overlay data derived from a report and the display flags.
//!
//! Nothing here draws. A front end reads the lines and markers and renders
//! them however it likes; the flags only decide which elements are present.

use serde::{Deserialize, Serialize};

use pairlab_core::{PerformanceReport, PositionMode};

use crate::config::DisplayFlags;

/// Which chart a line belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Spread,
    Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LineKind {
    MeanSpread,
    UpperThreshold,
    LowerThreshold,
    MeanPrice { symbol: String },
}

/// A horizontal reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLine {
    pub kind: LineKind,
    pub axis: Axis,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Entry,
    Exit,
}

/// A trade transition on the spread chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMarker {
    pub kind: MarkerKind,
    pub index: usize,
    pub date: String,
    pub spread: f64,
    /// Position opened (entry) or closed (exit) at this bar.
    pub mode: PositionMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOverlay {
    pub lines: Vec<OverlayLine>,
    pub markers: Vec<SignalMarker>,
}

impl ChartOverlay {
    pub fn build(report: &PerformanceReport, flags: DisplayFlags) -> Self {
        let mut lines = Vec::new();
        let stats = &report.spread_stats;

        if flags.show_thresholds {
            lines.push(OverlayLine {
                kind: LineKind::MeanSpread,
                axis: Axis::Spread,
                label: "Mean spread".into(),
                value: stats.mean_spread,
            });
            lines.push(OverlayLine {
                kind: LineKind::UpperThreshold,
                axis: Axis::Spread,
                label: format!("Upper (+{}σ)", stats.num_stdevs),
                value: stats.upper_threshold,
            });
            lines.push(OverlayLine {
                kind: LineKind::LowerThreshold,
                axis: Axis::Spread,
                label: format!("Lower (-{}σ)", stats.num_stdevs),
                value: stats.lower_threshold,
            });
        }

        if flags.show_means {
            for (symbol, value) in [
                (&report.left_symbol, stats.mean_price1),
                (&report.right_symbol, stats.mean_price2),
            ] {
                lines.push(OverlayLine {
                    kind: LineKind::MeanPrice {
                        symbol: symbol.clone(),
                    },
                    axis: Axis::Price,
                    label: format!("{symbol} mean"),
                    value,
                });
            }
        }

        let markers = if flags.show_signals {
            signal_markers(report)
        } else {
            Vec::new()
        };

        Self { lines, markers }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.markers.is_empty()
    }

    pub fn lines_on(&self, axis: Axis) -> impl Iterator<Item = &OverlayLine> {
        self.lines.iter().filter(move |l| l.axis == axis)
    }
}

fn signal_markers(report: &PerformanceReport) -> Vec<SignalMarker> {
    let mut markers = Vec::new();
    let mut held = PositionMode::Flat;
    for r in &report.records {
        if let Some(spread) = r.exit_spread {
            markers.push(SignalMarker {
                kind: MarkerKind::Exit,
                index: r.index,
                date: r.date.clone(),
                spread,
                mode: held,
            });
        }
        if let Some(spread) = r.entry_spread {
            markers.push(SignalMarker {
                kind: MarkerKind::Entry,
                index: r.index,
                date: r.date.clone(),
                spread,
                mode: r.position,
            });
        }
        held = r.position;
    }
    markers
}
