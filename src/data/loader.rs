use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType as _, Reader};

use super::model::{build_table, Cell, Table, NULL_TOKENS};
use crate::error::{Error, Result};

/// Column added to `.rowOut` tables so merged runs stay distinguishable.
pub const FILE_NAME_COLUMN: &str = "FILE_NAME";

// ---------------------------------------------------------------------------
// Format dispatch
// ---------------------------------------------------------------------------

/// Supported input formats, detected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.csv`
    DelimitedText,
    /// `.xlsx` / `.xls`
    Spreadsheet,
    /// `.rowOut` simulation output
    SimulationOutput,
}

impl FileFormat {
    /// Extensions offered by the file dialog.
    pub const EXTENSIONS: &'static [&'static str] = &["csv", "xlsx", "xls", "rowOut", "rowout"];

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(FileFormat::DelimitedText),
            "xlsx" | "xls" => Ok(FileFormat::Spreadsheet),
            "rowout" => Ok(FileFormat::SimulationOutput),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn read(self, path: &Path) -> Result<Table> {
        match self {
            FileFormat::DelimitedText => load_csv(path),
            FileFormat::Spreadsheet => load_spreadsheet(path),
            FileFormat::SimulationOutput => load_row_out(path),
        }
    }
}

/// Load a table from a file.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Table> {
    let format = FileFormat::from_path(path)?;
    let table = format.read(path)?;
    log::debug!(
        "Read {} ({format:?}): {} rows x {} columns",
        path.display(),
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row, comma separated.  Short records are padded with nulls.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_error(path, e))?;
        if record.len() > headers.len() {
            return Err(Error::parse(
                path,
                format!(
                    "row {}: expected {} fields, found {}",
                    row_no + 1,
                    headers.len(),
                    record.len()
                ),
            ));
        }
        rows.push(record.iter().map(Cell::parse).collect());
    }

    build_table(headers, &rows)
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        _ => Error::parse(path, message),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet; the first row holds the column names.
fn load_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::parse(path, e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::parse(path, "workbook has no worksheets"))?
        .map_err(|e| Error::parse(path, e.to_string()))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(header_name).collect(),
        None => Vec::new(),
    };
    sheet_to_table(headers, rows)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn sheet_to_table<'a>(
    headers: Vec<String>,
    rows: impl Iterator<Item = &'a [Data]>,
) -> Result<Table> {
    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().take(headers.len()).map(spreadsheet_cell).collect())
        .collect();
    build_table(headers, &rows)
}

/// Excel stores every number as a float; whole numbers come back as integers.
fn spreadsheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            Cell::Integer(*f as i64)
        }
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if NULL_TOKENS.contains(&s.trim()) => Cell::Null,
        Data::String(s) => Cell::String(s.clone()),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => Cell::String(dt.to_string()),
            None => Cell::Null,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::String(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Null,
    }
}

// ---------------------------------------------------------------------------
// .rowOut loader
// ---------------------------------------------------------------------------

fn load_row_out(path: &Path) -> Result<Table> {
    let text = String::from_utf8(std::fs::read(path)?)
        .map_err(|e| Error::parse(path, format!("not valid UTF-8: {e}")))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default();
    parse_row_out(&text, file_name).map_err(|message| Error::parse(path, message))
}

/// Whitespace separated columns under a single header line.
///
/// A `FILE_NAME` column holding `file_name` is put in front of the data
/// columns, replacing any column of that name in the file itself.
pub fn parse_row_out(text: &str, file_name: &str) -> std::result::Result<Table, String> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err("file is empty".to_string());
    };
    let file_headers: Vec<&str> = header_line.split_whitespace().collect();

    let mut headers = Vec::with_capacity(file_headers.len() + 1);
    headers.push(FILE_NAME_COLUMN.to_string());
    headers.extend(
        file_headers
            .iter()
            .filter(|h| **h != FILE_NAME_COLUMN)
            .map(|h| h.to_string()),
    );

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() > file_headers.len() {
            return Err(format!(
                "line {}: expected {} values, found {}",
                line_no + 1,
                file_headers.len(),
                tokens.len()
            ));
        }
        let mut row = Vec::with_capacity(headers.len());
        row.push(Cell::String(file_name.to_string()));
        row.extend(
            file_headers
                .iter()
                .zip(tokens.iter().map(Some).chain(std::iter::repeat(None)))
                .filter(|(h, _)| **h != FILE_NAME_COLUMN)
                .map(|(_, tok)| tok.map_or(Cell::Null, |t| Cell::parse(t))),
        );
        rows.push(row);
    }

    build_table(headers, &rows).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{DataType, Float64Type, Int64Type};
    use tempfile::Builder;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut tmp = Builder::new().suffix(suffix).tempfile().expect("create tmp file");
        write!(tmp, "{contents}").unwrap();
        tmp
    }

    #[test]
    fn detects_format_by_extension() {
        assert_eq!(
            FileFormat::from_path(Path::new("a/b.CSV")).unwrap(),
            FileFormat::DelimitedText
        );
        assert_eq!(
            FileFormat::from_path(Path::new("book.xlsx")).unwrap(),
            FileFormat::Spreadsheet
        );
        assert_eq!(
            FileFormat::from_path(Path::new("run_01.rowOut")).unwrap(),
            FileFormat::SimulationOutput
        );
        assert!(matches!(
            FileFormat::from_path(Path::new("notes.txt")),
            Err(Error::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            FileFormat::from_path(Path::new("Makefile")),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn reads_csv_with_missing_values() {
        let tmp = write_temp(".csv", "x,y,label\n1,2.5,a\n3,,b\n4,NA\n");
        let table = load_file(tmp.path()).unwrap();

        assert_eq!(table.num_rows(), 3);
        let schema = table.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Utf8);

        let y = table.column(1).as_primitive::<Float64Type>();
        assert_eq!(y.value(0), 2.5);
        assert!(y.is_null(1));
        assert!(y.is_null(2));
        assert!(table.column(2).is_null(2));
    }

    #[test]
    fn csv_values_survive_arrow_writer() {
        let input = "x,y,label\n1,2.5,a\n3,,b\n-7,0.125,\n";
        let tmp = write_temp(".csv", input);
        let table = load_file(tmp.path()).unwrap();

        let mut writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(Vec::new());
        writer.write(&table).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn csv_keeps_whitespace_in_text_and_headers() {
        let input = " label ,n\n a ,1\nb  , 2\n";
        let tmp = write_temp(".csv", input);
        let table = load_file(tmp.path()).unwrap();

        assert_eq!(table.schema().field(0).name(), " label ");
        let label = table.column(0).as_string::<i32>();
        assert_eq!(label.value(0), " a ");
        assert_eq!(label.value(1), "b  ");
        let n = table.column(1).as_primitive::<Int64Type>();
        assert_eq!(n.values().to_vec(), vec![1, 2]);

        let mut writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(Vec::new());
        writer.write(&table).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, " label ,n\n a ,1\nb  ,2\n");
    }

    #[test]
    fn rejects_csv_rows_longer_than_header() {
        let tmp = write_temp(".csv", "x,y\n1,2,3\n");
        assert!(matches!(load_file(tmp.path()), Err(Error::Parse { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got {err:?}");
    }

    #[test]
    fn parses_row_out_text() {
        let text = "\n  TIME   TEMP  FLAG\n 0.0  1.5D+02  1\n 1.0  2.0D+02  2\n2.0 2.5D+02\n";
        let table = parse_row_out(text, "run_01").unwrap();

        let names: Vec<_> = table.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["FILE_NAME", "TIME", "TEMP", "FLAG"]);
        assert_eq!(table.num_rows(), 3);

        let file = table.column(0).as_string::<i32>();
        assert!((0..3).all(|i| file.value(i) == "run_01"));

        let temp = table.column(2).as_primitive::<Float64Type>();
        assert_eq!(temp.value(1), 200.0);

        let flag = table.column(3).as_primitive::<Int64Type>();
        assert_eq!(flag.value(0), 1);
        assert!(flag.is_null(2));
    }

    #[test]
    fn row_out_replaces_existing_file_name_column() {
        let text = "A FILE_NAME B\n1 other 2\n";
        let table = parse_row_out(text, "sim").unwrap();
        let names: Vec<_> = table.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["FILE_NAME", "A", "B"]);
        assert_eq!(table.column(0).as_string::<i32>().value(0), "sim");
        assert_eq!(table.column(2).as_primitive::<Int64Type>().value(0), 2);
    }

    #[test]
    fn row_out_with_invalid_utf8_is_a_parse_error() {
        let mut tmp = Builder::new().suffix(".rowOut").tempfile().unwrap();
        tmp.write_all(b"A B\n1 \xff\n").unwrap();
        let err = load_file(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn row_out_rejects_long_rows() {
        let err = parse_row_out("A B\n1 2 3\n", "sim").unwrap_err();
        assert!(err.contains("line 2"), "{err}");
    }

    #[test]
    fn row_out_file_name_stops_at_first_dot() {
        let tmp = Builder::new()
            .prefix("case.v2.")
            .suffix(".rowOut")
            .tempfile()
            .unwrap();
        std::fs::write(tmp.path(), "A\n1\n").unwrap();
        let table = load_file(tmp.path()).unwrap();
        assert_eq!(table.column(0).as_string::<i32>().value(0), "case");
    }

    #[test]
    fn reads_first_sheet_of_a_workbook() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("book.xlsx");
        let date = Format::new().set_num_format("yyyy-mm-dd");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        // Column B has no header.
        sheet.write_string(0, 0, "id").unwrap();
        sheet.write_string(0, 2, "label").unwrap();
        sheet.write_string(0, 3, "when").unwrap();

        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_number(1, 1, 10.5).unwrap();
        sheet.write_string(1, 2, " padded ").unwrap();
        let first = ExcelDateTime::from_ymd(2024, 3, 5).unwrap();
        sheet.write_datetime_with_format(1, 3, &first, &date).unwrap();

        sheet.write_number(2, 0, 2.0).unwrap();
        sheet.write_number(2, 1, 11.0).unwrap();
        sheet.write_string(2, 2, "b").unwrap();

        sheet.write_number(3, 1, 12.25).unwrap();
        sheet.write_string(3, 2, "NA").unwrap();
        let second = ExcelDateTime::from_ymd(2024, 3, 6).unwrap();
        sheet.write_datetime_with_format(3, 3, &second, &date).unwrap();

        workbook.add_worksheet().write_string(0, 0, "ignored").unwrap();
        workbook.save(&path).unwrap();

        let table = load_file(&path).unwrap();
        let names: Vec<_> = table.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["id", "Unnamed: 1", "label", "when"]);
        assert_eq!(table.num_rows(), 3);

        let id = table.column(0).as_primitive::<Int64Type>();
        assert_eq!((id.value(0), id.value(1)), (1, 2));
        assert!(id.is_null(2));

        let unnamed = table.column(1).as_primitive::<Float64Type>();
        assert_eq!(unnamed.values().to_vec(), vec![10.5, 11.0, 12.25]);

        let label = table.column(2).as_string::<i32>();
        assert_eq!(label.value(0), " padded ");
        assert_eq!(label.value(1), "b");
        assert!(label.is_null(2));

        let when = table.column(3).as_string::<i32>();
        assert!(when.value(0).starts_with("2024-03-05"), "{}", when.value(0));
        assert!(when.is_null(1));
        assert!(when.value(2).starts_with("2024-03-06"), "{}", when.value(2));
    }

    #[test]
    fn converts_spreadsheet_cells() {
        let header = vec!["id".to_string(), "score".to_string(), "ok".to_string()];
        let rows: Vec<Vec<Data>> = vec![
            vec![Data::Float(1.0), Data::Float(0.5), Data::Bool(true)],
            vec![Data::Float(2.0), Data::Empty, Data::Bool(false)],
            vec![Data::Int(3), Data::String("NA".into()), Data::Empty],
        ];
        let table = sheet_to_table(header, rows.iter().map(|r| r.as_slice())).unwrap();

        let schema = table.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Boolean);
        assert_eq!(table.column(1).null_count(), 2);
        assert_eq!(table.column(0).as_primitive::<Int64Type>().value(2), 3);
    }
}
