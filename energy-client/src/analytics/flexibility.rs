use serde::Serialize;

use crate::domain::{EnrichedReading, FlexibilityEvent, ScoredReading, UsageReading};

/// Scores readings against a catalog of flexibility events, one column per
/// event type.
#[derive(Debug, Clone, Default)]
pub struct FlexibilityScorer {
    columns: Vec<(String, FlexibilityEvent)>,
}

/// The scored working set together with its score column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoredTable {
    pub columns: Vec<String>,
    pub rows: Vec<ScoredReading>,
}

impl FlexibilityScorer {
    /// Events sharing an `event_type` write to the same column: the later
    /// event replaces the earlier one, and the column keeps its first position.
    pub fn new(events: &[FlexibilityEvent]) -> Self {
        let mut columns: Vec<(String, FlexibilityEvent)> = Vec::with_capacity(events.len());
        for event in events {
            let name = event.column_name();
            match columns.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = event.clone(),
                None => columns.push((name, event.clone())),
            }
        }
        Self { columns }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn score_reading(&self, reading: &UsageReading) -> Vec<f64> {
        let hour = reading.hour();
        self.columns
            .iter()
            .map(|(_, event)| event.reward(hour, reading.usage_kwh))
            .collect()
    }

    pub fn score(&self, rows: Vec<EnrichedReading>) -> ScoredTable {
        let rows = rows
            .into_iter()
            .map(|enriched| {
                let scores = self.score_reading(&enriched.reading);
                ScoredReading { enriched, scores }
            })
            .collect();

        ScoredTable {
            columns: self.column_names(),
            rows,
        }
    }
}
