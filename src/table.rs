//! Async decoder for CSV query responses.
//!
//! The `/api/v2/query` endpoint answers with comma-delimited text. This
//! module streams it row by row as plain string cells; typing the cells is
//! left to the caller.

use csv_async::{AsyncReaderBuilder, ErrorKind, StringRecord};
use futures::StreamExt;
use tokio::io::AsyncRead;

use crate::error::{Error, Result};

/// One decoded row.
pub type Row = Vec<String>;

/// Streaming reader for CSV query responses.
///
/// If the server reports a failure in-band (a table whose header is
/// `,error,reference`), the message row is returned as
/// [`Error::QueryError`] instead of as data and the reader stops.
///
/// Quoted cells may escape quotes either by doubling them (`""`) or with a
/// backslash (`\"`). Blank lines are skipped and rows may differ in length
/// (InfluxDB separates result tables with an empty line and may change the
/// column set between tables).
///
/// # Example
///
/// ```ignore
/// use influxdb_admin::table::TableReader;
///
/// let mut reader = TableReader::new(&b",result,table,_value\n,,0,42\n"[..]);
/// while let Some(row) = reader.next().await? {
///     println!("{:?}", row);
/// }
/// ```
pub struct TableReader<R: AsyncRead + Unpin> {
    csv: csv_async::AsyncReader<R>,
    in_error_table: bool,
    done: bool,
}

impl<R: AsyncRead + Unpin + Send> TableReader<R> {
    /// Create a new reader over an async byte source.
    pub fn new(reader: R) -> Self {
        let csv = AsyncReaderBuilder::new()
            .has_headers(false) // header rows are returned like any other row
            .flexible(true)
            .escape(Some(b'\\'))
            .create_reader(reader);

        Self {
            csv,
            in_error_table: false,
            done: false,
        }
    }

    /// Decode and return the next row.
    ///
    /// Returns:
    /// - `Ok(Some(row))` - a decoded row
    /// - `Ok(None)` - end of input, or a previous call already failed
    /// - `Err(e)` - the first decode error, or the query error reported by
    ///   the server
    pub async fn next(&mut self) -> Result<Option<Row>> {
        if self.done {
            return Ok(None);
        }

        let mut records = self.csv.records();
        loop {
            let record = match records.next().await {
                Some(Ok(r)) => r,
                Some(Err(e)) => {
                    self.done = true;
                    return Err(decode_error(e));
                }
                None => {
                    self.done = true;
                    if self.in_error_table {
                        return Err(query_error(None));
                    }
                    return Ok(None);
                }
            };

            if is_blank(&record) {
                continue;
            }

            if self.in_error_table {
                self.done = true;
                return Err(query_error(Some(&record)));
            }

            // Error table header: `,error,reference`
            if record.get(1) == Some("error") {
                self.in_error_table = true;
                continue;
            }

            return Ok(Some(record.iter().map(str::to_string).collect()));
        }
    }
}

/// Decode every row of `reader`.
pub async fn read_all<R: AsyncRead + Unpin + Send>(reader: R) -> Result<Vec<Row>> {
    let mut table = TableReader::new(reader);
    let mut rows = Vec::new();
    while let Some(row) = table.next().await? {
        rows.push(row);
    }
    Ok(rows)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Build the error reported by the row following an error table header.
fn query_error(record: Option<&StringRecord>) -> Error {
    let cell = |i: usize| {
        record
            .and_then(|r| r.get(i))
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    };
    Error::QueryError {
        message: cell(1).unwrap_or_else(|| "Unknown query error".to_string()),
        reference: cell(2),
    }
}

fn decode_error(e: csv_async::Error) -> Error {
    if !e.is_io_error() {
        return Error::Csv(e.to_string());
    }
    match e.into_kind() {
        ErrorKind::Io(io) => Error::Io(io),
        kind => Error::Csv(format!("{:?}", kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_read_simple_table() {
        let body = ",result,table,_time,_value\n,_result,0,2023-11-14T22:13:20Z,42\n";
        let rows = read_all(body.as_bytes()).await.unwrap();
        assert_eq!(
            rows,
            vec![
                row(&["", "result", "table", "_time", "_value"]),
                row(&["", "_result", "0", "2023-11-14T22:13:20Z", "42"]),
            ]
        );
    }

    #[tokio::test]
    async fn test_skips_blank_lines_between_tables() {
        let body = ",result,table,_value\r\n,_result,0,1\r\n\r\n,result,table,_value\r\n,_result,1,2\r\n\r\n";
        let rows = read_all(body.as_bytes()).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], row(&["", "_result", "1", "2"]));
    }

    #[tokio::test]
    async fn test_quoted_cells() {
        let body = "a,\"b,c\",\"say \"\"hi\"\"\",\"back\\\"slash\"\n";
        let rows = read_all(body.as_bytes()).await.unwrap();
        assert_eq!(rows, vec![row(&["a", "b,c", "say \"hi\"", "back\"slash"])]);
    }

    #[tokio::test]
    async fn test_rows_may_differ_in_length() {
        let rows = read_all("a,b,c\nd\n".as_bytes()).await.unwrap();
        assert_eq!(rows, vec![row(&["a", "b", "c"]), row(&["d"])]);
    }

    #[tokio::test]
    async fn test_empty_body() {
        let rows = read_all("".as_bytes()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_error_table_is_query_error() {
        let body = ",error,reference\n,\"runtime error: type conflict in column _value\",897\n";
        let mut reader = TableReader::new(body.as_bytes());

        match reader.next().await {
            Err(Error::QueryError { message, reference }) => {
                assert_eq!(message, "runtime error: type conflict in column _value");
                assert_eq!(reference.as_deref(), Some("897"));
            }
            other => panic!("Expected query error, got {:?}", other),
        }
        assert_eq!(reader.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_table_after_data_rows() {
        let body = ",result,table,_value\r\n,_result,0,1\r\n\r\n,error,reference\r\n,\"quota exceeded\",\r\n";
        let mut reader = TableReader::new(body.as_bytes());
        assert_eq!(reader.next().await.unwrap().unwrap()[1], "result");
        assert_eq!(reader.next().await.unwrap().unwrap()[1], "_result");

        let err = reader.next().await.unwrap_err();
        assert!(
            matches!(&err, Error::QueryError { message, reference: None } if message == "quota exceeded"),
            "{:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_error_header_without_message() {
        let err = read_all(",error,reference\n".as_bytes()).await.unwrap_err();
        assert!(
            matches!(&err, Error::QueryError { message, .. } if message == "Unknown query error"),
            "{:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_source_failure_is_io_error() {
        let chunks: Vec<std::io::Result<&'static [u8]>> = vec![
            Ok(b",result,table\n".as_slice()),
            Err(std::io::Error::other("connection reset")),
        ];
        let reader = tokio_util::io::StreamReader::new(futures::stream::iter(chunks));

        let err = read_all(reader).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_csv_error() {
        let body: &[u8] = b"ok,row\nbad,\xff\xfe\n";
        let mut reader = TableReader::new(body);
        assert_eq!(reader.next().await.unwrap(), Some(row(&["ok", "row"])));

        let err = reader.next().await.unwrap_err();
        assert!(matches!(err, Error::Csv(_)));

        // Reader is fused after the first error.
        assert_eq!(reader.next().await.unwrap(), None);
    }
}
