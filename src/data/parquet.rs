//! GZIP Parquet quote files

use super::{DataError, FieldKind, FieldValue, QuoteField, QuoteRow, QuoteTable};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DATETIME_COLUMN: &str = "datetime";
const SYMBOL_COLUMN: &str = "symbol";
/// Prefix pandas gives to serialized index columns
const PANDAS_INDEX_PREFIX: &str = "__index_level_";

/// Quote schema: `datetime`, `symbol`, then one Float64 or Utf8 column per
/// field
pub fn quote_schema(fields: &[QuoteField]) -> Schema {
    let mut columns = vec![
        Field::new(
            DATETIME_COLUMN,
            DataType::Timestamp(TimeUnit::Microsecond, None),
            true,
        ),
        Field::new(SYMBOL_COLUMN, DataType::Utf8, true),
    ];
    columns.extend(
        fields
            .iter()
            .map(|field| Field::new(field.name.as_str(), arrow_type(field.kind), true)),
    );
    Schema::new(columns)
}

/// Reader for quote Parquet files
pub struct QuoteReader {
    path: PathBuf,
}

impl QuoteReader {
    /// Create a new reader for a Parquet file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row of the file.
    ///
    /// `datetime` may be stored as a timestamp, a date or ISO-8601 text and
    /// `symbol` as any string type. Numeric and boolean columns are read as
    /// Float64, everything else as text. A value that cannot be converted is
    /// an error naming its column.
    pub fn read(&self) -> Result<QuoteTable, DataError> {
        let file = File::open(&self.path).map_err(|source| DataError::Open {
            path: self.path.clone(),
            source,
        })?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();

        let datetime_idx = schema
            .index_of(DATETIME_COLUMN)
            .map_err(|_| DataError::MissingColumn(DATETIME_COLUMN))?;
        let symbol_idx = schema
            .index_of(SYMBOL_COLUMN)
            .map_err(|_| DataError::MissingColumn(SYMBOL_COLUMN))?;

        let field_columns: Vec<(usize, QuoteField)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, f)| {
                *i != datetime_idx
                    && *i != symbol_idx
                    && !f.name().starts_with(PANDAS_INDEX_PREFIX)
            })
            .map(|(i, f)| {
                let kind = if f.data_type().is_numeric() || f.data_type() == &DataType::Boolean {
                    FieldKind::Real
                } else {
                    FieldKind::Text
                };
                (
                    i,
                    QuoteField {
                        name: f.name().clone(),
                        kind,
                    },
                )
            })
            .collect();

        let mut table = QuoteTable::new(field_columns.iter().map(|(_, f)| f.clone()).collect());
        let reader = builder.build()?;
        let mut index: i64 = 0;

        for batch_result in reader {
            let batch = batch_result?;

            let datetimes = cast_column(
                &batch,
                datetime_idx,
                DATETIME_COLUMN,
                &DataType::Timestamp(TimeUnit::Microsecond, None),
            )?;
            let datetimes = datetimes
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(|| DataError::InvalidColumn(DATETIME_COLUMN.to_string()))?;

            let symbols = cast_column(&batch, symbol_idx, SYMBOL_COLUMN, &DataType::Utf8)?;
            let symbols = symbols
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| DataError::InvalidColumn(SYMBOL_COLUMN.to_string()))?;

            let values: Vec<ArrayRef> = field_columns
                .iter()
                .map(|(i, field)| cast_column(&batch, *i, &field.name, &arrow_type(field.kind)))
                .collect::<Result<_, _>>()?;
            let values: Vec<FieldArray<'_>> = values
                .iter()
                .zip(&field_columns)
                .map(|(array, (_, field))| FieldArray::new(array, field))
                .collect::<Result<_, _>>()?;

            for i in 0..batch.num_rows() {
                let datetime = if datetimes.is_null(i) {
                    None
                } else {
                    DateTime::from_timestamp_micros(datetimes.value(i)).map(|dt| dt.naive_utc())
                };
                let symbol = (!symbols.is_null(i)).then(|| symbols.value(i).to_string());
                let row_values = values.iter().map(|array| array.value(i)).collect();

                table.push(QuoteRow {
                    index,
                    datetime,
                    symbol,
                    values: row_values,
                });
                index += 1;
            }
        }

        tracing::debug!(path = ?self.path, rows = table.len(), fields = table.fields.len(), "Read quote file");

        Ok(table)
    }
}

fn cast_column(
    batch: &RecordBatch,
    idx: usize,
    name: &str,
    to: &DataType,
) -> Result<ArrayRef, DataError> {
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    cast_with_options(batch.column(idx), to, &options).map_err(|source| DataError::Cast {
        column: name.to_string(),
        expected: match to {
            DataType::Float64 => "Float64",
            DataType::Utf8 => "Utf8",
            _ => "Timestamp",
        },
        source,
    })
}

fn arrow_type(kind: FieldKind) -> DataType {
    match kind {
        FieldKind::Real => DataType::Float64,
        FieldKind::Text => DataType::Utf8,
    }
}

/// A field column after casting
enum FieldArray<'a> {
    Real(&'a Float64Array),
    Text(&'a StringArray),
}

impl<'a> FieldArray<'a> {
    fn new(array: &'a ArrayRef, field: &QuoteField) -> Result<Self, DataError> {
        let invalid = || DataError::InvalidColumn(field.name.clone());
        Ok(match field.kind {
            FieldKind::Real => {
                FieldArray::Real(array.as_any().downcast_ref().ok_or_else(invalid)?)
            }
            FieldKind::Text => {
                FieldArray::Text(array.as_any().downcast_ref().ok_or_else(invalid)?)
            }
        })
    }

    fn value(&self, i: usize) -> Option<FieldValue> {
        match self {
            FieldArray::Real(a) => (!a.is_null(i)).then(|| FieldValue::Real(a.value(i))),
            FieldArray::Text(a) => (!a.is_null(i)).then(|| FieldValue::Text(a.value(i).to_string())),
        }
    }
}

/// Writes quote tables as GZIP-compressed Parquet
pub struct QuoteWriter {
    compression: Compression,
}

impl Default for QuoteWriter {
    fn default() -> Self {
        Self {
            compression: Compression::GZIP(GzipLevel::default()),
        }
    }
}

impl QuoteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `table` to `path`, creating parent directories
    pub fn write(&self, path: &Path, table: &QuoteTable) -> Result<(), DataError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let schema = Arc::new(quote_schema(&table.fields));
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let datetimes: Vec<Option<i64>> = table
            .rows
            .iter()
            .map(|r| r.datetime.map(|dt| dt.and_utc().timestamp_micros()))
            .collect();
        let symbols: Vec<Option<&str>> = table.rows.iter().map(|r| r.symbol.as_deref()).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(TimestampMicrosecondArray::from(datetimes)),
            Arc::new(StringArray::from(symbols)),
        ];
        for (i, field) in table.fields.iter().enumerate() {
            let column: ArrayRef = match field.kind {
                FieldKind::Real => {
                    let values: Vec<Option<f64>> = table
                        .rows
                        .iter()
                        .map(|r| r.values[i].as_ref().and_then(FieldValue::as_f64))
                        .collect();
                    Arc::new(Float64Array::from(values))
                }
                FieldKind::Text => {
                    let values: Vec<Option<String>> = table
                        .rows
                        .iter()
                        .map(|r| match &r.values[i] {
                            Some(FieldValue::Text(t)) => Some(t.clone()),
                            Some(FieldValue::Real(x)) => Some(x.to_string()),
                            None => None,
                        })
                        .collect();
                    Arc::new(StringArray::from(values))
                }
            };
            columns.push(column);
        }

        let batch = RecordBatch::try_new(schema, columns)?;

        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, count = table.len(), "Wrote quotes to Parquet");

        Ok(())
    }
}
