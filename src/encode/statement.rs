//! `INSERT` statement encoder.
//!
//! Every data file starts with a session comment, then groups rows into
//! multi-row statements:
//!
//! ```sql
//! /*!40101 SET NAMES binary*/;
//! INSERT INTO `users` VALUES
//! (1,'alice'),
//! (2,'bob');
//! ```
//!
//! A statement is closed before it would exceed the statement size, counting
//! its terminating `;\n`; the file budget is checked against the size the
//! file would have once the pending statement is terminated.

use crate::error::Result;
use crate::sink::ByteSink;
use crate::source::RowCursor;
use crate::value::{Row, quote_identifier};

use super::{EncodeBudget, EncodeOptions, EncodeOutcome, Encoded};

/// First line of every SQL file.
pub const SESSION_PREAMBLE: &str = "/*!40101 SET NAMES binary*/;\n";

const ROW_SEPARATOR: &str = ",\n";
const STATEMENT_END: &str = ";\n";

/// `INSERT INTO `t` [(`a`,`b`) ]VALUES\n`
pub fn insert_prefix(table: &str, columns: &[String], complete_insert: bool) -> String {
    let mut prefix = format!("INSERT INTO {} ", quote_identifier(table));
    if complete_insert && !columns.is_empty() {
        let quoted: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        prefix.push('(');
        prefix.push_str(&quoted.join(","));
        prefix.push_str(") ");
    }
    prefix.push_str("VALUES\n");
    prefix
}

/// Appends `(v1,v2,...)`.
pub fn write_row_tuple(row: &Row, out: &mut String) {
    out.push('(');
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        value.write_sql_literal(out);
    }
    out.push(')');
}

pub fn encode_statements<W: ByteSink + ?Sized>(
    cursor: &mut RowCursor<'_>,
    sink: &mut W,
    budget: &EncodeBudget,
    options: &EncodeOptions<'_>,
) -> Result<Encoded> {
    let prefix = insert_prefix(options.table, cursor.columns(), options.complete_insert);
    let prefix_len = prefix.len() as u64;
    let separator_len = ROW_SEPARATOR.len() as u64;
    let end_len = STATEMENT_END.len() as u64;

    let mut tuple = String::new();
    // Bytes of the open statement; zero when none is open.
    let mut statement_bytes = 0u64;
    let mut rows = 0u64;

    loop {
        let Some(row) = cursor.next_row()? else {
            if statement_bytes > 0 {
                sink.write_all(STATEMENT_END.as_bytes())?;
            }
            return Ok(Encoded {
                rows,
                outcome: EncodeOutcome::Exhausted,
            });
        };

        tuple.clear();
        write_row_tuple(&row, &mut tuple);
        let tuple_len = tuple.len() as u64;

        let extends = statement_bytes > 0
            && statement_bytes + separator_len + tuple_len + end_len <= budget.statement_size;
        let added = if extends {
            separator_len + tuple_len
        } else {
            let close = if statement_bytes > 0 { end_len } else { 0 };
            close + prefix_len + tuple_len
        };

        let written = sink.bytes_written();
        if !budget.admits(written, written + added + end_len) {
            cursor.hold_back(row);
            if statement_bytes > 0 {
                sink.write_all(STATEMENT_END.as_bytes())?;
            }
            return Ok(Encoded {
                rows,
                outcome: EncodeOutcome::FileFull,
            });
        }

        cursor.ensure_active()?;
        if written == 0 {
            sink.write_all(SESSION_PREAMBLE.as_bytes())?;
        }
        if extends {
            sink.write_all(ROW_SEPARATOR.as_bytes())?;
            statement_bytes += separator_len + tuple_len;
        } else {
            if statement_bytes > 0 {
                sink.write_all(STATEMENT_END.as_bytes())?;
            }
            sink.write_all(prefix.as_bytes())?;
            statement_bytes = prefix_len + tuple_len;
        }
        sink.write_all(tuple.as_bytes())?;
        rows += 1;
    }
}
