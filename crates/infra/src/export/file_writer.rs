//! Delimited flat-file writer
//!
//! Renders export records one per line in a fixed column order and replaces
//! the destination atomically: lines are written to a uniquely named sibling
//! temp file (`.<name>.XXXXXX.tmp`), fsynced, then renamed over the
//! destination. Readers only ever see the previous complete file or the new
//! complete file, and two writes never share a temp file.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use activity_export_core::ExportWriter;
use activity_export_domain::constants::{
    EXPORT_COLUMNS, LINE_TERMINATOR, QUOTE_CHAR, TEMP_FILE_EXTENSION,
};
use activity_export_domain::{ExportError, ExportRecord, Result, WriterConfig};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tempfile::{Builder, NamedTempFile};
use tokio::task;
use tracing::debug;

use crate::errors::InfraError;

/// Writes records as delimiter-separated lines.
#[derive(Debug, Clone)]
pub struct DelimitedFileWriter {
    delimiter: char,
    include_header: bool,
}

impl Default for DelimitedFileWriter {
    fn default() -> Self {
        Self::new(&WriterConfig::default())
    }
}

impl DelimitedFileWriter {
    pub fn new(config: &WriterConfig) -> Self {
        Self { delimiter: config.delimiter, include_header: config.include_header }
    }

    /// Render the full file content for `records`.
    pub fn render(&self, records: &[ExportRecord]) -> String {
        let mut out = String::new();
        if self.include_header {
            self.push_line(&mut out, EXPORT_COLUMNS.iter().copied());
        }
        for record in records {
            out.push_str(&self.render_line(record));
            out.push_str(LINE_TERMINATOR);
        }
        out
    }

    /// Render a single record without the line terminator.
    pub fn render_line(&self, record: &ExportRecord) -> String {
        let mut line = String::new();
        self.push_fields(&mut line, record_fields(record).iter().map(String::as_str));
        line
    }

    fn push_line<'a>(&self, out: &mut String, fields: impl Iterator<Item = &'a str>) {
        self.push_fields(out, fields);
        out.push_str(LINE_TERMINATOR);
    }

    fn push_fields<'a>(&self, out: &mut String, fields: impl Iterator<Item = &'a str>) {
        for (index, field) in fields.enumerate() {
            if index > 0 {
                out.push(self.delimiter);
            }
            self.push_escaped(out, field);
        }
    }

    fn push_escaped(&self, out: &mut String, field: &str) {
        let needs_quoting = field
            .chars()
            .any(|c| c == self.delimiter || c == QUOTE_CHAR || c == '\n' || c == '\r');

        if !needs_quoting {
            out.push_str(field);
            return;
        }

        out.push(QUOTE_CHAR);
        for c in field.chars() {
            if c == QUOTE_CHAR {
                out.push(QUOTE_CHAR);
            }
            out.push(c);
        }
        out.push(QUOTE_CHAR);
    }
}

#[async_trait]
impl ExportWriter for DelimitedFileWriter {
    async fn write(&self, records: &[ExportRecord], destination: &Path) -> Result<()> {
        let content = self.render(records);
        let destination = destination.to_path_buf();
        let count = records.len();

        let written = task::spawn_blocking(move || {
            write_atomically(&destination, content.as_bytes()).map(|()| destination)
        })
        .await
        .map_err(|err| ExportError::from(InfraError::from(err)))??;

        debug!(path = %written.display(), records = count, "Export file written");
        Ok(())
    }
}

fn record_fields(record: &ExportRecord) -> [String; 11] {
    let opt = |value: Option<&str>| value.unwrap_or_default().to_string();

    [
        record.action().to_string(),
        record.sender_entity().to_string(),
        opt(record.recipient_id()),
        opt(record.sender_id()),
        opt(record.sender_name()),
        opt(record.receiver_nickname()),
        opt(record.recipient_entity()),
        opt(record.customer_number()),
        record.expire_date().map(format_timestamp).unwrap_or_default(),
        record.sender_customer_number().to_string(),
        format_timestamp(record.activity_time()),
    ]
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn write_atomically(destination: &Path, content: &[u8]) -> Result<()> {
    let Some(file_name) = destination.file_name() else {
        return Err(ExportError::Io(format!(
            "output path {} does not name a file",
            destination.display()
        )));
    };

    let parent = match destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(io_error)?;
            parent
        }
        None => Path::new("."),
    };

    let mut temp = temp_file_for(parent, file_name)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        writer.write_all(content).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
    }
    temp.as_file().sync_all().map_err(io_error)?;
    set_readable(&temp)?;

    // On failure the temp file is removed when the handle is dropped.
    temp.persist(destination).map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Hidden temp file next to the destination: `.activity.dat.XXXXXX.tmp`.
fn temp_file_for(parent: &Path, file_name: &OsStr) -> Result<NamedTempFile> {
    let mut prefix = OsString::from(".");
    prefix.push(file_name);
    prefix.push(".");

    Builder::new()
        .prefix(&prefix)
        .suffix(&format!(".{TEMP_FILE_EXTENSION}"))
        .tempfile_in(parent)
        .map_err(io_error)
}

/// Temp files are created owner-only; the export is read by other users.
#[cfg(unix)]
fn set_readable(temp: &NamedTempFile) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    temp.as_file().set_permissions(fs::Permissions::from_mode(0o644)).map_err(io_error)
}

#[cfg(not(unix))]
fn set_readable(_temp: &NamedTempFile) -> Result<()> {
    Ok(())
}

fn io_error(err: std::io::Error) -> ExportError {
    ExportError::from(InfraError::from(err))
}
