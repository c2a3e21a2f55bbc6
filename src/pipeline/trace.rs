//! Append-only execution trace

use crate::error::Result;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub action: String,
    pub data: Map<String, Value>,
}

/// Ordered record of what each agent did. Entries are only ever appended,
/// both in memory and, when a sink is set, to a JSON-lines log file.
#[derive(Debug, Default)]
pub struct TraceLog {
    entries: Vec<TraceEntry>,
    sink: Option<PathBuf>,
}

impl TraceLog {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            sink: Some(path.into()),
        }
    }

    pub fn record(&mut self, agent: &str, action: &str, data: Value) -> Result<&TraceEntry> {
        let data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        let entry = TraceEntry {
            timestamp: Utc::now(),
            agent: agent.to_string(),
            action: action.to_string(),
            data,
        };

        info!("[{}] {}", entry.agent, entry.action);

        if let Some(path) = &self.sink {
            append_line(path, &entry)?;
        }

        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }
}

fn append_line(path: &Path, entry: &TraceEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(entry)?;
    writeln!(file, "{}", line)?;
    Ok(())
}
