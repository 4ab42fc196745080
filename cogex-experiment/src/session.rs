use cogex_core::{Error, ParticipantProperties, Result, TrialRecord};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ExportError;

/// Participant properties and trial records of one run
#[derive(Debug, Default)]
pub struct SessionDataStore {
    properties: Option<ParticipantProperties>,
    records: Vec<TrialRecord>,
    terminal: bool,
}

impl SessionDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_properties(&mut self, props: ParticipantProperties) -> Result<()> {
        if self.properties.is_some() {
            return Err(Error::PropertiesAlreadySet);
        }
        info!("participant properties set");
        self.properties = Some(props);
        Ok(())
    }

    pub fn record_trial(&mut self, record: TrialRecord) {
        debug!(
            pair = record.pair_index,
            side = u8::from(record.chosen_side),
            rt_ms = record.reaction_time_ms,
            "trial recorded"
        );
        self.records.push(record);
    }

    /// Called by the engine once the timeline reaches its terminal stage
    pub fn mark_terminal(&mut self) {
        self.terminal = true;
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn properties(&self) -> Option<&ParticipantProperties> {
        self.properties.as_ref()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Flat table of all trials. Missing properties export as empty strings.
    pub fn finalize(&self) -> Result<SessionTable> {
        if !self.terminal {
            return Err(Error::SessionIncomplete);
        }
        let props = self.properties.clone().unwrap_or_default();
        let rows = self
            .records
            .iter()
            .map(|r| SessionRow {
                age: props.age.clone(),
                gender: props.gender.clone(),
                pair_index: r.pair_index,
                chosen_side: r.chosen_side.into(),
                reaction_time: r.reaction_time_ms,
            })
            .collect();
        Ok(SessionTable { rows })
    }
}

/// One exported row; field order is the column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRow {
    pub age: String,
    pub gender: String,
    pub pair_index: usize,
    pub chosen_side: u8,
    pub reaction_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionTable {
    pub rows: Vec<SessionRow>,
}

impl SessionTable {
    pub const COLUMNS: [&'static str; 5] =
        ["age", "gender", "pair_index", "chosen_side", "reaction_time"];

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> std::result::Result<(), ExportError> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.rows.is_empty() {
            wtr.write_record(Self::COLUMNS)?;
        }
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> std::result::Result<String, ExportError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
