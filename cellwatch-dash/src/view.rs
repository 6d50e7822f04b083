//! Render-ready view models built from store queries.

use cellwatch_core::{
    Alert, AlertThresholds, CellId, CellReading, FleetHealth, Mode, Reading, StatusIndicator,
};
use jiff::Timestamp;
use serde::Serialize;

pub const NO_DATA: &str = "no data";

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Average capacity as shown in the health panel.
pub fn capacity_label(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{value:.1}%"),
        None => NO_DATA.to_owned(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorView {
    pub kind: StatusIndicator,
    pub glyph: &'static str,
    pub color: &'static str,
    pub label: String,
}

impl IndicatorView {
    pub fn for_mode(mode: Mode) -> Self {
        let kind = StatusIndicator::from(mode);
        Self {
            kind,
            glyph: kind.glyph(),
            color: kind.color(),
            label: format!("{} {}", kind.glyph(), mode),
        }
    }
}

/// Latest values for one cell.
#[derive(Debug, Clone, Serialize)]
pub struct CellCard {
    pub cell: CellId,
    pub mode: Mode,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    pub indicator: IndicatorView,
    pub alert: Alert,
}

impl CellCard {
    pub fn new(cell: CellId, reading: &Reading, thresholds: &AlertThresholds) -> Self {
        Self {
            cell,
            mode: reading.mode,
            voltage: round_to(reading.voltage, 4),
            current: round_to(reading.current, 4),
            temperature: round_to(reading.temperature, 2),
            capacity: round_to(reading.capacity, 4),
            indicator: IndicatorView::for_mode(reading.mode),
            alert: thresholds.evaluate(reading),
        }
    }
}

/// Status overview for the whole fleet.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub cards: Vec<CellCard>,
    pub health: FleetHealth,
    pub average_capacity_label: String,
    pub last_update: Option<Timestamp>,
}

impl Overview {
    pub fn build(
        snapshot: &[CellReading],
        thresholds: &AlertThresholds,
        last_update: Option<Timestamp>,
    ) -> Self {
        let cards = snapshot
            .iter()
            .map(|entry| CellCard::new(entry.cell, &entry.reading, thresholds))
            .collect();
        let health = FleetHealth::from_snapshot(snapshot, thresholds);

        Self {
            cards,
            average_capacity_label: capacity_label(health.average_capacity),
            health,
            last_update,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Voltage,
    Current,
    Temperature,
}

impl Metric {
    pub const CHARTED: [Metric; 3] = [Metric::Voltage, Metric::Current, Metric::Temperature];

    pub fn title(self) -> &'static str {
        match self {
            Metric::Voltage => "Voltage Tracking Over Time",
            Metric::Current => "Current Tracking Over Time",
            Metric::Temperature => "Temperature Tracking Over Time",
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            Metric::Voltage => "Voltage (V)",
            Metric::Current => "Current (A)",
            Metric::Temperature => "Temperature (°C)",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Metric::Voltage => "blue",
            Metric::Current => "green",
            Metric::Temperature => "red",
        }
    }

    fn value(self, reading: &Reading) -> f64 {
        match self {
            Metric::Voltage => reading.voltage,
            Metric::Current => reading.current,
            Metric::Temperature => reading.temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendLine {
    pub metric: Metric,
    pub title: &'static str,
    pub axis_label: &'static str,
    pub color: &'static str,
    pub points: Vec<TrendPoint>,
}

/// Chart data for one cell's retained history.
#[derive(Debug, Clone, Serialize)]
pub struct Trend {
    pub cell: CellId,
    pub has_data: bool,
    pub lines: Vec<TrendLine>,
}

impl Trend {
    pub fn from_series(cell: CellId, series: &[Reading]) -> Self {
        let lines = Metric::CHARTED
            .into_iter()
            .map(|metric| TrendLine {
                metric,
                title: metric.title(),
                axis_label: metric.axis_label(),
                color: metric.color(),
                points: series
                    .iter()
                    .map(|reading| TrendPoint {
                        timestamp: reading.timestamp,
                        value: metric.value(reading),
                    })
                    .collect(),
            })
            .collect();

        Self {
            cell,
            has_data: !series.is_empty(),
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellwatch_core::Measurement;

    fn reading(voltage: f64, temperature: f64, capacity: f64, mode: Mode, second: i64) -> Reading {
        Measurement {
            voltage,
            current: 1.23456,
            temperature,
            capacity,
            mode,
        }
        .at(Timestamp::from_second(second).unwrap())
    }

    #[test]
    fn card_rounds_like_the_status_cards() {
        let card = CellCard::new(
            CellId(1),
            &reading(3.712345, 25.456, 90.123456, Mode::Charging, 0),
            &AlertThresholds::default(),
        );

        assert_eq!(card.voltage, 3.7123);
        assert_eq!(card.current, 1.2346);
        assert_eq!(card.temperature, 25.46);
        assert_eq!(card.capacity, 90.1235);
        assert_eq!(card.indicator.kind, StatusIndicator::Rising);
        assert_eq!(card.indicator.label, "🔺 Charging");
        assert!(card.alert.voltage_high);
    }

    #[test]
    fn overview_without_data_says_so() {
        let overview = Overview::build(&[], &AlertThresholds::default(), None);

        assert!(overview.cards.is_empty());
        assert_eq!(overview.average_capacity_label, NO_DATA);
    }

    #[test]
    fn overview_lists_snapshot_cells_in_order() {
        let snapshot: Vec<CellReading> = [CellId(2), CellId(5), CellId(6)]
            .into_iter()
            .map(|cell| CellReading {
                cell,
                reading: reading(3.4, 30.0, 80.0, Mode::Idle, 10),
            })
            .collect();

        let overview = Overview::build(&snapshot, &AlertThresholds::default(), None);
        let cells: Vec<CellId> = overview.cards.iter().map(|card| card.cell).collect();

        assert_eq!(cells, vec![CellId(2), CellId(5), CellId(6)]);
        assert_eq!(overview.health.cells_reporting, 3);
        assert_eq!(overview.average_capacity_label, "80.0%");
    }

    #[test]
    fn trend_charts_each_metric_in_time_order() {
        let series = vec![
            reading(3.6, 25.0, 90.0, Mode::Idle, 1),
            reading(3.7, 26.0, 91.0, Mode::Charging, 2),
        ];

        let trend = Trend::from_series(CellId(2), &series);

        assert!(trend.has_data);
        assert_eq!(trend.lines.len(), 3);
        assert_eq!(trend.lines[0].metric, Metric::Voltage);
        assert_eq!(
            trend.lines[0].points.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![3.6, 3.7]
        );
        assert_eq!(trend.lines[2].points[1].value, 26.0);
        assert!(trend.lines[1].points[0].timestamp < trend.lines[1].points[1].timestamp);
    }

    #[test]
    fn empty_trend_has_no_data() {
        let trend = Trend::from_series(CellId(1), &[]);

        assert!(!trend.has_data);
        assert!(trend.lines.iter().all(|line| line.points.is_empty()));
    }

    #[test]
    fn capacity_label_formats_one_decimal() {
        assert_eq!(capacity_label(Some(87.5)), "87.5%");
        assert_eq!(capacity_label(Some(100.0)), "100.0%");
        assert_eq!(capacity_label(None), "no data");
    }
}
