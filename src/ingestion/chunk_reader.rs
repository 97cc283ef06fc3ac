//! Chunked Reader
//!
//! Streams the flights file as fixed-size chunks so that a multi-gigabyte
//! input never has to fit in memory. Only the projected columns of each
//! record are copied out of the CSV buffer.

use crate::error::{EtlError, Result};
use crate::ingestion::columns::Column;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maps projected columns to header positions and to slots in a [`RawRow`].
#[derive(Debug)]
pub struct Projection {
    header_positions: Vec<usize>,
    slots: [Option<usize>; Column::COUNT],
}

impl Projection {
    /// Resolves `columns` against a header record.
    ///
    /// Every projected column must be present; the error lists all the
    /// missing ones at once.
    pub fn resolve(path: &Path, headers: &StringRecord, columns: &[Column]) -> Result<Self> {
        let mut header_positions = Vec::with_capacity(columns.len());
        let mut slots = [None; Column::COUNT];
        let mut missing = Vec::new();

        for (slot, column) in columns.iter().enumerate() {
            match headers.iter().position(|h| h.trim() == column.name()) {
                Some(position) => {
                    header_positions.push(position);
                    slots[column.slot()] = Some(slot);
                }
                None => missing.push(column.name().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(EtlError::MissingColumns {
                path: path.to_path_buf(),
                columns: missing,
            });
        }

        Ok(Self {
            header_positions,
            slots,
        })
    }

    fn extract(&self, record: &StringRecord) -> Vec<String> {
        self.header_positions
            .iter()
            .map(|&position| record.get(position).unwrap_or("").to_string())
            .collect()
    }
}

/// One source record, restricted to the projected columns.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line in the source file.
    pub line: u64,
    fields: Vec<String>,
}

/// Typed access to a [`RawRow`] through its chunk's projection.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    projection: &'a Projection,
    row: &'a RawRow,
}

impl<'a> RowView<'a> {
    pub fn line(&self) -> u64 {
        self.row.line
    }

    /// Trimmed text of `column`.
    pub fn text(&self, column: Column) -> Result<&'a str> {
        let slot = self.projection.slots[column.slot()].ok_or_else(|| {
            EtlError::Config(format!("Column {} is not part of this pass", column.name()))
        })?;
        Ok(self.row.fields[slot].trim())
    }

    /// Required integer value. Integral floats such as `"5.0"` are accepted.
    pub fn integer<T: TryFrom<i64>>(&self, column: Column) -> Result<T> {
        let text = self.text(column)?;
        let value = text
            .parse::<i64>()
            .ok()
            .or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
            .ok_or_else(|| self.parse_error(column, text))?;
        T::try_from(value).map_err(|_| self.parse_error(column, text))
    }

    /// Optional numeric measure; an empty cell reads as zero.
    pub fn measure(&self, column: Column) -> Result<f64> {
        let text = self.text(column)?;
        if text.is_empty() {
            return Ok(0.0);
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| self.parse_error(column, text))
    }

    /// Optional 0/1 flag; any non-zero measure counts as set.
    pub fn flag(&self, column: Column) -> Result<i64> {
        Ok(if self.measure(column)? != 0.0 { 1 } else { 0 })
    }

    fn parse_error(&self, column: Column, text: &str) -> EtlError {
        EtlError::Parse {
            line: self.row.line,
            column: column.name(),
            value: text.to_string(),
        }
    }
}

/// An ordered group of at most `chunk_size` rows.
#[derive(Debug)]
pub struct Chunk {
    /// 0-based position of this chunk in the stream.
    pub index: usize,
    projection: Arc<Projection>,
    rows: Vec<RawRow>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        let projection = self.projection.as_ref();
        self.rows.iter().map(move |row| RowView { projection, row })
    }
}

/// Lazy, finite, non-restartable chunk stream over one file.
///
/// The file handle is released when the reader is dropped, including when a
/// pass aborts half-way.
pub struct ChunkReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    record: StringRecord,
    projection: Arc<Projection>,
    chunk_size: usize,
    chunks_emitted: usize,
    rows_emitted: u64,
    finished: bool,
}

impl ChunkReader {
    /// Opens `path` and resolves the projection against its header.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize, columns: &[Column]) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if chunk_size == 0 {
            return Err(EtlError::Config("chunk size must be at least 1".to_string()));
        }

        let file = File::open(&path).map_err(|e| EtlError::io(&path, e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let projection = Projection::resolve(&path, &headers, columns)?;

        Ok(Self {
            path,
            reader,
            record: StringRecord::new(),
            projection: Arc::new(projection),
            chunk_size,
            chunks_emitted: 0,
            rows_emitted: 0,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get next chunk, or `None` once the file is exhausted.
    ///
    /// After an error the reader stays finished.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.finished {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(self.chunk_size.min(65_536));
        while rows.len() < self.chunk_size {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => {
                    let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                    rows.push(RawRow {
                        line,
                        fields: self.projection.extract(&self.record),
                    });
                }
                Ok(false) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e.into());
                }
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }

        let chunk = Chunk {
            index: self.chunks_emitted,
            projection: Arc::clone(&self.projection),
            rows,
        };
        self.chunks_emitted += 1;
        self.rows_emitted += chunk.len() as u64;
        Ok(Some(chunk))
    }

    /// (chunks emitted, rows emitted) so far.
    pub fn progress(&self) -> (usize, u64) {
        (self.chunks_emitted, self.rows_emitted)
    }
}

impl Iterator for ChunkReader {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
