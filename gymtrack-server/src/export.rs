//! Spreadsheet export of attendance history and the equipment log

use chrono_tz::Tz;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::models::{AttendanceRecord, Inspection};

/// MIME type of an xlsx workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Placeholder for absent optional values
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// A single worksheet of text cells
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Serialize as an xlsx workbook with a bold header row.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.name)?;

        for (col, header) in (0u16..).zip(self.headers.iter()) {
            worksheet.write_string_with_format(0, col, *header, &bold)?;
            let widest = self
                .rows
                .iter()
                .filter_map(|row| row.get(usize::from(col)))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(10);
            worksheet.set_column_width(col, widest.clamp(10, 60) as f64)?;
        }

        for (row, cells) in (1u32..).zip(self.rows.iter()) {
            for (col, cell) in (0u16..).zip(cells.iter()) {
                worksheet.write_string(row, col, cell.as_str())?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn or_na(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_owned()
}

/// Attendance rows with check-in times rendered in `tz`.
pub fn history_sheet(records: &[AttendanceRecord], tz: Tz) -> Sheet {
    Sheet {
        name: "History",
        headers: &[
            "Code",
            "Name",
            "User type",
            "Program",
            "Department",
            "Branch",
            "Checked in at",
        ],
        rows: records
            .iter()
            .map(|r| {
                vec![
                    or_na(r.student_code.as_deref()),
                    r.name.clone(),
                    r.user_type.as_str().to_owned(),
                    or_na(r.program.as_deref()),
                    or_na(r.department.as_deref()),
                    r.branch.clone(),
                    r.local_time(tz, "%Y-%m-%d %H:%M"),
                ]
            })
            .collect(),
    }
}

pub fn equipment_sheet(inspections: &[Inspection]) -> Sheet {
    Sheet {
        name: "Equipment",
        headers: &[
            "Review date",
            "Instructor",
            "Branch",
            "Item",
            "Condition",
            "Damage",
            "Recommended actions",
            "Notes",
        ],
        rows: inspections
            .iter()
            .map(|i| {
                vec![
                    i.review_date.clone(),
                    i.instructor.clone(),
                    i.branch.clone(),
                    i.item.clone(),
                    i.condition.as_str().to_owned(),
                    or_na(Some(&i.damage)),
                    or_na(Some(&i.recommended_actions)),
                    or_na(Some(&i.notes)),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, UserType};

    fn record() -> AttendanceRecord {
        AttendanceRecord {
            id: "h1".into(),
            user_id: "u1".into(),
            name: "Ana".into(),
            user_type: UserType::Student,
            branch: "North Campus".into(),
            created_at: "2025-03-10T14:30:00.000Z".into(),
            department: None,
            student_code: Some("2019-1234".into()),
            program: Some("Nursing".into()),
        }
    }

    #[test]
    fn history_rows_fill_missing_values() {
        let sheet = history_sheet(&[record()], chrono_tz::America::Bogota);
        assert_eq!(sheet.name, "History");
        assert_eq!(
            sheet.rows[0],
            vec![
                "2019-1234",
                "Ana",
                "student",
                "Nursing",
                "N/A",
                "North Campus",
                "2025-03-10 09:30"
            ]
        );
    }

    #[test]
    fn equipment_rows_keep_column_order() {
        let inspection = Inspection {
            id: "e1".into(),
            review_date: "2025-03-14".into(),
            instructor: "Marta".into(),
            branch: "North Campus".into(),
            item: "Treadmill".into(),
            condition: Condition::Poor,
            damage: "Torn belt".into(),
            recommended_actions: String::new(),
            notes: String::new(),
            created_at: String::new(),
        };
        let sheet = equipment_sheet(&[inspection]);
        assert_eq!(sheet.headers.len(), sheet.rows[0].len());
        assert_eq!(sheet.rows[0][4], "poor");
        assert_eq!(sheet.rows[0][6], "N/A");
    }

    #[test]
    fn workbook_is_a_zip_archive() {
        let bytes = history_sheet(&[record()], Tz::UTC).to_xlsx().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn empty_sheet_still_exports() {
        let bytes = equipment_sheet(&[]).to_xlsx().unwrap();
        assert!(!bytes.is_empty());
    }
}
