use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use uuid::Uuid;

use crate::dto::student_dto::{ImportReport, RowError};
use crate::error::{Error, Result};
use crate::models::student::NewStudent;
use crate::services::student_service::StudentService;
use crate::utils::time::{from_excel_serial, parse_flexible_date};
use crate::utils::validation::{is_valid_email, normalize_email};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Email,
    Course,
    Institution,
    Grade,
    CompletionDate,
}

impl Column {
    const REQUIRED: [Column; 3] = [Column::Name, Column::Email, Column::Course];

    pub fn label(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Email => "email",
            Column::Course => "course",
            Column::Institution => "institution",
            Column::Grade => "grade",
            Column::CompletionDate => "completion_date",
        }
    }
}

/// Maps a header cell to a canonical column. Case, whitespace and
/// punctuation are ignored.
pub fn canonical_column(header: &str) -> Option<Column> {
    let key: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect();
    let column = match key.as_str() {
        "name" | "fullname" | "studentname" | "student" | "nameofstudent" | "participant"
        | "participantname" => Column::Name,
        "email" | "emailaddress" | "mail" | "studentemail" | "emailid" => Column::Email,
        "course" | "coursename" | "coursetitle" | "program" | "programme" | "subject"
        | "training" => Column::Course,
        "institution" | "institute" | "school" | "college" | "university" | "organization"
        | "organisation" | "academy" => Column::Institution,
        "grade" | "score" | "result" | "marks" | "mark" | "percentage" => Column::Grade,
        "completiondate" | "dateofcompletion" | "completedon" | "completed" | "date"
        | "enddate" | "graduationdate" | "issuedate" => Column::CompletionDate,
        _ => return None,
    };
    Some(column)
}

/// Column positions keyed by canonical column; the first matching header wins.
pub fn map_headers(header_row: &[Data]) -> Result<HashMap<Column, usize>> {
    let mut columns = HashMap::new();
    for (idx, cell) in header_row.iter().enumerate() {
        if let Some(column) = canonical_column(&cell_text(cell)) {
            columns.entry(column).or_insert(idx);
        }
    }

    let missing: Vec<&str> = Column::REQUIRED
        .iter()
        .filter(|c| !columns.contains_key(*c))
        .map(|c| c.label())
        .collect();
    if !missing.is_empty() {
        return Err(Error::BadRequest(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }
    Ok(columns)
}

pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

/// Text dates go through the flexible parser; numeric cells are treated as
/// spreadsheet serial dates.
pub fn cell_date(cell: &Data) -> std::result::Result<Option<NaiveDate>, String> {
    let parsed = match cell {
        Data::Empty => return Ok(None),
        Data::DateTime(dt) => from_excel_serial(dt.as_f64()),
        Data::Float(f) => from_excel_serial(*f),
        Data::Int(i) => from_excel_serial(*i as f64),
        Data::DateTimeIso(s) => s.get(..10).and_then(parse_flexible_date),
        other => {
            let text = cell_text(other);
            if text.is_empty() {
                return Ok(None);
            }
            parse_flexible_date(&text).or_else(|| text.parse::<f64>().ok().and_then(from_excel_serial))
        }
    };
    parsed.map(Some).ok_or_else(|| {
        format!(
            "completion_date '{}' is not a valid date (use YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY or MM/DD/YYYY)",
            cell_text(cell)
        )
    })
}

pub fn validate_row(
    cells: &[Data],
    columns: &HashMap<Column, usize>,
) -> std::result::Result<NewStudent, Vec<String>> {
    let cell = |column: Column| columns.get(&column).and_then(|&idx| cells.get(idx));
    let text = |column: Column| cell(column).map(cell_text).unwrap_or_default();
    let optional = |column: Column| Some(text(column)).filter(|v| !v.is_empty());

    let mut errors = Vec::new();

    let name = text(Column::Name);
    if name.is_empty() {
        errors.push("name is required".to_string());
    }
    let email = normalize_email(&text(Column::Email));
    if email.is_empty() {
        errors.push("email is required".to_string());
    } else if !is_valid_email(&email) {
        errors.push(format!("email '{}' is not valid", email));
    }
    let course = text(Column::Course);
    if course.is_empty() {
        errors.push("course is required".to_string());
    }
    let completion_date = match cell(Column::CompletionDate).map(cell_date) {
        Some(Ok(date)) => date,
        Some(Err(msg)) => {
            errors.push(msg);
            None
        }
        None => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewStudent {
        name,
        email,
        course,
        institution: optional(Column::Institution),
        grade: optional(Column::Grade),
        completion_date,
    })
}

/// Outcome of validating one data row. `row` is the spreadsheet row number
/// with the header on row 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub row: usize,
    pub result: std::result::Result<NewStudent, Vec<String>>,
}

/// Validates every non-empty data row and flags in-file duplicates
/// (same email and course, case-insensitive).
pub fn parse_rows(rows: &[Vec<Data>]) -> Result<Vec<ParsedRow>> {
    let Some((header, data)) = rows.split_first() else {
        return Err(Error::BadRequest("The spreadsheet is empty".into()));
    };
    let columns = map_headers(header)?;

    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    let mut parsed = Vec::new();
    for (idx, cells) in data.iter().enumerate() {
        if cells.iter().all(|c| cell_text(c).is_empty()) {
            continue;
        }
        let row = idx + 2;
        let result = validate_row(cells, &columns).and_then(|student| {
            let key = duplicate_key(&student);
            match seen.get(&key) {
                Some(first) => Err(vec![format!("duplicate of row {} in this file", first)]),
                None => {
                    seen.insert(key, row);
                    Ok(student)
                }
            }
        });
        parsed.push(ParsedRow { row, result });
    }
    Ok(parsed)
}

pub fn duplicate_key(student: &NewStudent) -> (String, String) {
    (
        student.email.trim().to_lowercase(),
        student.course.trim().to_lowercase(),
    )
}

pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Data>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::Spreadsheet(format!("Could not read spreadsheet: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Spreadsheet("The workbook has no sheets".into()))?
        .map_err(|e| Error::Spreadsheet(format!("Could not read first sheet: {}", e)))?;
    Ok(range.rows().map(|r| r.to_vec()).collect())
}

#[derive(Clone)]
pub struct ImportService {
    students: StudentService,
}

impl ImportService {
    pub fn new(students: StudentService) -> Self {
        Self { students }
    }

    /// Rows are inserted one by one; a failing row never undoes the ones
    /// already stored.
    pub async fn import(&self, uploaded_by: Uuid, bytes: &[u8]) -> Result<ImportReport> {
        let rows = read_first_sheet(bytes)?;
        let parsed = parse_rows(&rows)?;

        let emails: Vec<String> = parsed
            .iter()
            .filter_map(|p| p.result.as_ref().ok())
            .map(|s| s.email.to_lowercase())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let existing: HashSet<(String, String)> =
            self.students.existing_keys(&emails).await?.into_iter().collect();

        let mut report = ImportReport {
            total_rows: parsed.len(),
            ..Default::default()
        };
        for ParsedRow { row, result } in parsed {
            let student = match result {
                Ok(student) => student,
                Err(errors) => {
                    report.errors.push(RowError { row, errors });
                    continue;
                }
            };
            if existing.contains(&duplicate_key(&student)) {
                report.errors.push(RowError {
                    row,
                    errors: vec!["a student with this email is already enrolled in this course".into()],
                });
                continue;
            }
            match self.students.insert(uploaded_by, &student).await {
                Ok(_) => report.inserted += 1,
                Err(err) => {
                    tracing::warn!(row, error = %err, "student row insert failed");
                    report.errors.push(RowError {
                        row,
                        errors: vec![format!("could not be saved: {}", err)],
                    });
                }
            }
        }
        report.failed = report.errors.len();

        tracing::info!(
            %uploaded_by,
            total = report.total_rows,
            inserted = report.inserted,
            failed = report.failed,
            "student import finished"
        );
        Ok(report)
    }
}
