use tabled::{Table, Tabled, settings::Style};

use crate::model::{ChannelCount, ScholarGap, TouchpointRecord};

/// Display format for dates in tables
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Shorten `value` to at most `max` characters, marking the cut with a trailing `.`
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    if max <= 1 {
        return value.chars().take(max).collect();
    }
    let mut out: String = value.chars().take(max - 1).collect();
    out.push('.');
    out
}

#[derive(Tabled)]
struct TouchpointRow {
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Program")]
    program: String,
    #[tabled(rename = "Scholar")]
    scholar: String,
    #[tabled(rename = "Staff")]
    staff: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&TouchpointRecord> for TouchpointRow {
    fn from(tp: &TouchpointRecord) -> Self {
        Self {
            id: tp.id,
            program: truncate(&tp.program, 20),
            scholar: truncate(&tp.scholar, 18),
            staff: truncate(&tp.staff, 18),
            kind: truncate(&tp.kind, 14),
            channel: truncate(&tp.channel, 10),
            date: tp.occurred_at.format(DAY_FORMAT).to_string(),
            notes: tp.notes.clone(),
        }
    }
}

#[derive(Tabled)]
struct GapRow {
    #[tabled(rename = "Scholar")]
    scholar: String,
    #[tabled(rename = "Cohort")]
    cohort: String,
    #[tabled(rename = "Program")]
    program: String,
    #[tabled(rename = "Last")]
    last: String,
}

impl From<&ScholarGap> for GapRow {
    fn from(gap: &ScholarGap) -> Self {
        Self {
            scholar: truncate(&gap.scholar, 18),
            cohort: truncate(&gap.cohort, 10),
            program: truncate(&gap.program, 18),
            last: gap
                .last_touchpoint
                .map(|t| t.format(DAY_FORMAT).to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Count")]
    count: i64,
}

pub fn touchpoint_table(records: &[TouchpointRecord]) -> String {
    let rows: Vec<TouchpointRow> = records.iter().map(TouchpointRow::from).collect();
    Table::new(rows).with(Style::blank()).to_string()
}

pub fn gap_table(gaps: &[ScholarGap]) -> String {
    let rows: Vec<GapRow> = gaps.iter().map(GapRow::from).collect();
    Table::new(rows).with(Style::blank()).to_string()
}

pub fn channel_table(counts: &[ChannelCount]) -> String {
    let rows: Vec<ChannelRow> = counts
        .iter()
        .map(|c| ChannelRow {
            channel: truncate(&c.channel, 10),
            count: c.count,
        })
        .collect();
    Table::new(rows).with(Style::blank()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Call", 10), "Call");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("Future Scholars North East", 20), "Future Scholars Nor.");
        assert_eq!(truncate("Future Scholars North East", 20).chars().count(), 20);
        assert_eq!(truncate("abc", 1), "a");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Zoë Müller-Ångström", 8), "Zoë Mül.");
    }

    #[test]
    fn test_touchpoint_table() {
        let record = TouchpointRecord {
            id: 7,
            program: "Future Scholars North".into(),
            scholar: "Avery Green".into(),
            staff: "Daria Mendez".into(),
            kind: "Check-in".into(),
            channel: "In-person visit".into(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 2, 15, 0, 0).unwrap(),
            notes: "Reviewed goals".into(),
        };
        let out = touchpoint_table(&[record]);
        for header in ["ID", "Program", "Scholar", "Staff", "Type", "Channel", "Date", "Notes"] {
            assert!(out.contains(header), "missing {}", header);
        }
        assert!(out.contains("Future Scholars Nor."));
        assert!(out.contains("In-person."));
        assert!(out.contains("2026-01-02"));
        assert!(out.contains("Reviewed goals"));
    }

    #[test]
    fn test_gap_table_shows_never() {
        let gaps = vec![
            ScholarGap {
                scholar: "Priya Shah".into(),
                cohort: "2027".into(),
                program: "Bridge to Campus".into(),
                last_touchpoint: None,
            },
            ScholarGap {
                scholar: "Mateo Cruz".into(),
                cohort: "2026".into(),
                program: "Future Scholars North".into(),
                last_touchpoint: Some(Utc.with_ymd_and_hms(2025, 12, 1, 8, 0, 0).unwrap()),
            },
        ];
        let out = gap_table(&gaps);
        assert!(out.contains("never"));
        assert!(out.contains("2025-12-01"));
        assert!(out.find("Priya Shah").unwrap() < out.find("Mateo Cruz").unwrap());
    }

    #[test]
    fn test_channel_table() {
        let out = channel_table(&[
            ChannelCount { channel: "Call".into(), count: 3 },
            ChannelCount { channel: "SMS".into(), count: 1 },
        ]);
        assert!(out.contains("Channel"));
        assert!(out.contains("Call"));
        assert!(out.contains('3'));
    }
}
