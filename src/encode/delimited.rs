//! CSV record encoder.
//!
//! One record per row, terminated by `\n`. Fields are quoted only when they
//! contain the separator, the delimiter or a line break; an empty delimiter
//! disables quoting. `NULL` values are written as the configured null token,
//! so a text value equal to that token cannot be told apart from `NULL`.
//!
//! Single-byte dialects go through one reused [`csv::Writer`]; multi-byte
//! separators or delimiters (`||`, `~~`) use a hand-written field writer with
//! the same quoting rules.
//!
//! Records are buffered and handed to the sink in batches of roughly the
//! statement size.

use std::borrow::Cow;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::config::CsvOptions;
use crate::error::Result;
use crate::sink::ByteSink;
use crate::source::RowCursor;
use crate::value::Row;

use super::{EncodeBudget, EncodeOutcome, Encoded};

/// Output of the reused `csv::Writer`, drained after every record.
#[derive(Debug, Clone, Default)]
struct RecordBuffer(Rc<RefCell<Vec<u8>>>);

impl io::Write for RecordBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
enum FieldWriter {
    Csv {
        writer: Writer<RecordBuffer>,
        buffer: RecordBuffer,
    },
    Multibyte { separator: Vec<u8>, delimiter: Vec<u8> },
}

impl FieldWriter {
    fn write<I, T>(&mut self, fields: I, out: &mut Vec<u8>) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        match self {
            Self::Csv { writer, buffer } => {
                writer.write_record(fields)?;
                writer.flush()?;
                out.append(&mut buffer.0.borrow_mut());
            }
            Self::Multibyte {
                separator,
                delimiter,
            } => write_multibyte_record(fields, separator, delimiter, out),
        }
        Ok(())
    }
}

/// Turns rows into CSV records.
#[derive(Debug)]
pub struct RecordEncoder {
    fields: FieldWriter,
    null_value: Vec<u8>,
}

impl RecordEncoder {
    pub fn new(options: &CsvOptions) -> Result<Self> {
        options.validate()?;
        let fields = match options.single_byte_dialect() {
            Some((separator, quote)) => {
                let mut builder = WriterBuilder::new();
                builder
                    .has_headers(false)
                    .flexible(true)
                    .delimiter(separator)
                    .terminator(Terminator::Any(b'\n'));
                match quote {
                    Some(quote) => {
                        builder
                            .quote(quote)
                            .quote_style(QuoteStyle::Necessary)
                            .double_quote(true);
                    }
                    None => {
                        builder.quote_style(QuoteStyle::Never);
                    }
                }
                let buffer = RecordBuffer::default();
                FieldWriter::Csv {
                    writer: builder.from_writer(buffer.clone()),
                    buffer,
                }
            }
            None => FieldWriter::Multibyte {
                separator: options.separator.as_bytes().to_vec(),
                delimiter: options.delimiter.as_bytes().to_vec(),
            },
        };
        Ok(Self {
            fields,
            null_value: options.null_value.as_bytes().to_vec(),
        })
    }

    /// Appends one encoded record to `out`.
    pub fn encode_fields<I, T>(&mut self, fields: I, out: &mut Vec<u8>) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.fields.write(fields, out)
    }

    /// Appends the record for `row` to `out`.
    pub fn encode_row(&mut self, row: &Row, out: &mut Vec<u8>) -> Result<()> {
        let null_value = self.null_value.as_slice();
        let fields = row
            .iter()
            .map(|value| value.csv_field().unwrap_or(Cow::Borrowed(null_value)));
        self.fields.write(fields, out)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn write_multibyte_record<I, T>(fields: I, separator: &[u8], delimiter: &[u8], out: &mut Vec<u8>)
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let start = out.len();
    let mut count = 0usize;
    for field in fields {
        let field = field.as_ref();
        if count > 0 {
            out.extend_from_slice(separator);
        }
        count += 1;

        let needs_quotes = !delimiter.is_empty()
            && (field.contains(&b'\n')
                || field.contains(&b'\r')
                || find(field, separator).is_some()
                || find(field, delimiter).is_some());
        if !needs_quotes {
            out.extend_from_slice(field);
            continue;
        }

        out.extend_from_slice(delimiter);
        let mut rest = field;
        while let Some(pos) = find(rest, delimiter) {
            let end = pos + delimiter.len();
            out.extend_from_slice(&rest[..end]);
            out.extend_from_slice(delimiter);
            rest = &rest[end..];
        }
        out.extend_from_slice(rest);
        out.extend_from_slice(delimiter);
    }

    // a lone empty field would otherwise read back as a blank line
    if count == 1 && out.len() == start {
        out.extend_from_slice(delimiter);
        out.extend_from_slice(delimiter);
    }
    out.push(b'\n');
}

pub fn encode_records<W: ByteSink + ?Sized>(
    cursor: &mut RowCursor<'_>,
    sink: &mut W,
    budget: &EncodeBudget,
    options: &CsvOptions,
) -> Result<Encoded> {
    let mut encoder = RecordEncoder::new(options)?;
    let batch_limit = usize::try_from(budget.statement_size).unwrap_or(usize::MAX);

    let mut header = Vec::new();
    if options.header && !cursor.columns().is_empty() && sink.bytes_written() == 0 {
        encoder.encode_fields(cursor.columns(), &mut header)?;
    }

    let mut batch: Vec<u8> = Vec::new();
    let mut record = Vec::new();
    let mut rows = 0u64;

    let outcome = loop {
        let Some(row) = cursor.next_row()? else {
            break EncodeOutcome::Exhausted;
        };

        record.clear();
        encoder.encode_row(&row, &mut record)?;

        let pending = sink.bytes_written() + batch.len() as u64;
        let projected = pending + header.len() as u64 + record.len() as u64;
        if !budget.admits(pending, projected) {
            cursor.hold_back(row);
            break EncodeOutcome::FileFull;
        }

        cursor.ensure_active()?;
        if !header.is_empty() {
            batch.append(&mut header);
        }
        batch.extend_from_slice(&record);
        rows += 1;

        if batch.len() >= batch_limit {
            sink.write_all(&batch)?;
            batch.clear();
        }
    };

    if !batch.is_empty() {
        cursor.ensure_active()?;
        sink.write_all(&batch)?;
    }
    Ok(Encoded { rows, outcome })
}
