use logchain_core::{LogRecord, TransportError};

/// Render a record as a single output line
///
/// Text lines read `level: message` followed by the metadata as compact
/// JSON when there is any.
pub fn format_line(record: &LogRecord, json: bool, timestamp: bool) -> Result<String, TransportError> {
    if json {
        return serde_json::to_string(record)
            .map_err(|e| TransportError::Serialization(e.to_string()));
    }

    let mut line = String::new();
    if timestamp {
        line.push_str(&record.timestamp.to_rfc3339());
        line.push_str(" - ");
    }
    line.push_str(&record.level);
    line.push_str(": ");
    line.push_str(&record.message);

    if !record.metadata.is_empty() {
        let meta = serde_json::to_string(&record.metadata)
            .map_err(|e| TransportError::Serialization(e.to_string()))?;
        line.push(' ');
        line.push_str(&meta);
    }

    Ok(line)
}
