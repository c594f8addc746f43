//! Timesheet export parser
//!
//! Splits the semicolon-delimited export into typed rows. The first line is
//! always a header. Rows with fewer than 14 fields are skipped, never
//! partially emitted; the skip reason is reported so callers can tell a
//! malformed row from an odd-but-valid one.

use chrono::{Duration, NaiveDate};

/// Positional fields per export row
pub const FIELD_COUNT: usize = 14;

/// Field delimiter shared by the export and the roster file
pub const DELIMITER: char = ';';

/// Spreadsheet formula error marker that shows up in date columns
const ERROR_MARKER: &str = "#VALOR!";

/// Day offsets beyond this are rejected instead of overflowing the calendar
const MAX_DAY_OFFSET: i64 = 1_000_000;

/// One export row, fields in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub project: String,
    pub summary: String,
    pub item_type: String,
    pub key: String,
    pub assignee: String,
    pub reporter: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub squad: String,
    pub category: String,
    /// Raw overdue column (`Atrasada` or anything else)
    pub overdue_flag: String,
    /// Raw current-month column (`Sim` or anything else)
    pub current_month_flag: String,
    /// Raw demand-type tag (`projeto`, `Sustentação`, blank, ...)
    pub demand_tag: String,
}

/// Why a line produced no row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    TooFewFields { found: usize },
}

/// Result of parsing a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Parsed(TaskRow),
    Skipped(SkipReason),
}

/// A skipped line and its 1-based line number (the header is line 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: SkipReason,
}

/// Parsed export: rows in file order plus skipped lines
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    pub rows: Vec<TaskRow>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse a `DD/MM/YYYY` date
///
/// Returns `None` for blank text, the `#VALOR!` marker, anything that is not
/// three numeric `/`-separated parts. Out-of-range days and months roll over
/// the way a calendar constructor does (`31/02/2025` is 3 March 2025).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text == ERROR_MARKER {
        return None;
    }

    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let day: i64 = parts[0].trim().parse().ok()?;
    let month: i64 = parts[1].trim().parse().ok()?;
    let year: i64 = parts[2].trim().parse().ok()?;

    rolled_date(year, month, day)
}

fn rolled_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    if day.checked_abs()? > MAX_DAY_OFFSET {
        return None;
    }

    let months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = (months.rem_euclid(12) + 1) as u32;

    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_signed(Duration::days(day - 1))
}

/// Parse one data line
pub fn parse_line(line: &str) -> RowOutcome {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return RowOutcome::Skipped(SkipReason::Blank);
    }

    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() < FIELD_COUNT {
        return RowOutcome::Skipped(SkipReason::TooFewFields {
            found: fields.len(),
        });
    }

    RowOutcome::Parsed(TaskRow {
        project: fields[0].to_string(),
        summary: fields[1].to_string(),
        item_type: fields[2].to_string(),
        key: fields[3].to_string(),
        assignee: fields[4].to_string(),
        reporter: fields[5].to_string(),
        start_date: parse_date(fields[6]),
        end_date: parse_date(fields[7]),
        status: fields[8].to_string(),
        squad: fields[9].to_string(),
        category: fields[10].to_string(),
        overdue_flag: fields[11].to_string(),
        current_month_flag: fields[12].to_string(),
        demand_tag: fields[13].to_string(),
    })
}

/// Parse a whole export, discarding the header line
pub fn parse_export(text: &str) -> ParsedExport {
    let mut export = ParsedExport::default();

    for (index, line) in text.lines().enumerate().skip(1) {
        match parse_line(line) {
            RowOutcome::Parsed(row) => export.rows.push(row),
            RowOutcome::Skipped(reason) => export.skipped.push(SkippedLine {
                line: index + 1,
                reason,
            }),
        }
    }

    export
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Projeto;Resumo;Tipo;Chave;Responsavel;Relator;Inicio;Fim;Status;Squad;Categoria;Atrasada;MesAtual;TipoDemanda";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_valid() {
        assert_eq!(parse_date("01/01/2025"), Some(d(2025, 1, 1)));
        assert_eq!(parse_date("15/01/2025"), Some(d(2025, 1, 15)));
        assert_eq!(parse_date(" 9/3/2024 "), Some(d(2024, 3, 9)));
    }

    #[test]
    fn test_parse_date_round_trips_through_iso() {
        for text in ["01/01/2025", "29/02/2024", "31/12/1999", "10/07/2030"] {
            let date = parse_date(text).unwrap();
            assert_eq!(date.format("%d/%m/%Y").to_string(), text);
        }
        assert_eq!(parse_date("15/01/2025").unwrap().to_string(), "2025-01-15");
    }

    #[test]
    fn test_parse_date_no_value() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("#VALOR!"), None);
        assert_eq!(parse_date("2025-01-15"), None);
        assert_eq!(parse_date("01/2025"), None);
        assert_eq!(parse_date("01/01/2025/1"), None);
        assert_eq!(parse_date("aa/01/2025"), None);
    }

    #[test]
    fn test_parse_date_rolls_over_like_calendar() {
        assert_eq!(parse_date("31/02/2025"), Some(d(2025, 3, 3)));
        assert_eq!(parse_date("01/13/2025"), Some(d(2026, 1, 1)));
        assert_eq!(parse_date("00/03/2025"), Some(d(2025, 2, 28)));
        assert_eq!(parse_date("01/00/2025"), Some(d(2024, 12, 1)));
    }

    #[test]
    fn test_parse_date_extreme_numbers_yield_no_value() {
        assert_eq!(parse_date("-9223372036854775808/01/2025"), None);
        assert_eq!(parse_date("01/-9223372036854775808/2025"), None);
        assert_eq!(parse_date("01/01/9223372036854775807"), None);
        assert_eq!(parse_date("9999999/01/2025"), None);
    }

    #[test]
    fn test_parse_line_with_extreme_date_keeps_row() {
        let line = "P;S;T;K-9;Ana;Bob;-9223372036854775808/01/2025;01/-9223372036854775808/2025;Aberta;SQ;Go;;;projeto";
        let RowOutcome::Parsed(row) = parse_line(line) else {
            panic!("row should parse");
        };

        assert_eq!(row.key, "K-9");
        assert_eq!(row.start_date, None);
        assert_eq!(row.end_date, None);
    }

    #[test]
    fn test_parse_line_full_row() {
        let line = "Proj X;Fix login;Bug;JIRA-1;Ana;Bob;01/01/2025;15/01/2025;Em Desenvolvimento;SquadA;Java;;;projeto";
        let RowOutcome::Parsed(row) = parse_line(line) else {
            panic!("row should parse");
        };

        assert_eq!(row.project, "Proj X");
        assert_eq!(row.assignee, "Ana");
        assert_eq!(row.reporter, "Bob");
        assert_eq!(row.start_date, Some(d(2025, 1, 1)));
        assert_eq!(row.end_date, Some(d(2025, 1, 15)));
        assert_eq!(row.category, "Java");
        assert_eq!(row.overdue_flag, "");
        assert_eq!(row.demand_tag, "projeto");
    }

    #[test]
    fn test_parse_line_short_row_is_skipped() {
        assert_eq!(
            parse_line("Proj X;Fix login;Bug"),
            RowOutcome::Skipped(SkipReason::TooFewFields { found: 3 })
        );
        assert_eq!(parse_line("\r"), RowOutcome::Skipped(SkipReason::Blank));
    }

    #[test]
    fn test_parse_line_strips_carriage_return() {
        let line = "P;S;T;K;A;R;;;Aberta;SQ;Go;;;Sustentação\r";
        let RowOutcome::Parsed(row) = parse_line(line) else {
            panic!("row should parse");
        };
        assert_eq!(row.demand_tag, "Sustentação");
        assert_eq!(row.start_date, None);
    }

    #[test]
    fn test_parse_export_skips_header_and_reports_lines() {
        let text = format!(
            "{}\nP;S;T;K;A;R;01/01/2025;02/01/2025;Aberta;SQ;Go;;;projeto\nbroken;row\n\n",
            HEADER
        );
        let export = parse_export(&text);

        assert_eq!(export.rows.len(), 1);
        assert_eq!(
            export.skipped,
            vec![
                SkippedLine {
                    line: 3,
                    reason: SkipReason::TooFewFields { found: 2 }
                },
                SkippedLine {
                    line: 4,
                    reason: SkipReason::Blank
                },
            ]
        );
    }

    #[test]
    fn test_parse_export_header_only() {
        let export = parse_export(HEADER);
        assert!(export.rows.is_empty());
        assert!(export.skipped.is_empty());
    }
}
