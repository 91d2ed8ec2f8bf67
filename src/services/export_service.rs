use rust_xlsxwriter::*;

use crate::error::Result;
use crate::models::application::{ApplicationDetail, ApplicationStatus};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Canonical import headers, in template order.
pub const STUDENT_TEMPLATE_HEADERS: [&str; 6] =
    ["Name", "Email", "Course", "Institution", "Grade", "Completion Date"];

pub struct ExportService;

impl ExportService {
    fn header_format() -> Format {
        Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x0F172A))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(0xE2E8F0))
    }

    fn status_color(status: &str) -> Color {
        match status.parse::<ApplicationStatus>() {
            Ok(ApplicationStatus::Pending) => Color::RGB(0x3B82F6),
            Ok(ApplicationStatus::Reviewed) => Color::RGB(0xF59E0B),
            Ok(ApplicationStatus::Accepted) => Color::RGB(0x10B981),
            Ok(ApplicationStatus::Rejected) => Color::RGB(0xEF4444),
            Err(_) => Color::RGB(0x64748B),
        }
    }

    fn fit_color(score: i32) -> Color {
        if score >= 70 {
            Color::RGB(0x10B981)
        } else if score >= 40 {
            Color::RGB(0xF59E0B)
        } else {
            Color::RGB(0xEF4444)
        }
    }

    /// Applicants of one job, in the order given (best fit first).
    pub fn applicants_xlsx(job_title: &str, applications: &[ApplicationDetail]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Applicants")?;

        let primary_color = Color::RGB(0x1E293B);
        let border_color = Color::RGB(0xE2E8F0);

        let columns = [
            ("#", 6.0),
            ("Name", 28.0),
            ("Email", 30.0),
            ("Status", 14.0),
            ("Fit score", 12.0),
            ("Resume", 40.0),
            ("Cover letter", 60.0),
            ("Employer notes", 40.0),
            ("Applied at", 20.0),
        ];
        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        let last_col = (columns.len() - 1) as u16;
        worksheet.merge_range(0, 0, 0, last_col, &format!("Applicants: {}", job_title), &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross);
        let exported = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
        worksheet.merge_range(
            1,
            0,
            1,
            last_col,
            &format!("Exported {}  •  {} applicants", exported, applications.len()),
            &subtitle_format,
        )?;

        let header_row = 2;
        let header_format = Self::header_format();
        worksheet.set_row_height(header_row, 26)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 3;
        for (idx, app) in applications.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { Color::RGB(0xF8FAFC) } else { Color::White };
            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let wrap_fmt = base_fmt.clone().set_text_wrap();

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
            worksheet.write_string_with_format(row, 1, &app.applicant_name, &base_fmt.clone().set_bold())?;
            worksheet.write_string_with_format(row, 2, &app.applicant_email, &base_fmt)?;

            let status_fmt = center_fmt
                .clone()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Self::status_color(&app.status));
            worksheet.write_string_with_format(row, 3, &app.status, &status_fmt)?;

            let fit_fmt = center_fmt.clone().set_bold().set_font_color(Self::fit_color(app.fit_score));
            worksheet.write_number_with_format(row, 4, app.fit_score as f64, &fit_fmt)?;

            worksheet.write_string_with_format(row, 5, app.resume_url.as_deref().unwrap_or("-"), &base_fmt)?;
            worksheet.write_string_with_format(row, 6, app.cover_letter.as_deref().unwrap_or("-"), &wrap_fmt)?;
            worksheet.write_string_with_format(row, 7, app.employer_notes.as_deref().unwrap_or("-"), &wrap_fmt)?;
            worksheet.write_string_with_format(
                row,
                8,
                &app.created_at.format("%Y-%m-%d %H:%M").to_string(),
                &center_fmt,
            )?;
        }

        worksheet.set_freeze_panes(3, 0)?;
        let last_row = (data_start_row + applications.len() as u32).saturating_sub(1).max(header_row);
        worksheet.autofilter(header_row, 0, last_row, last_col)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Empty import sheet with the canonical headers and one sample row.
    pub fn student_template_xlsx() -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Students")?;

        let header_format = Self::header_format();
        for (i, name) in STUDENT_TEMPLATE_HEADERS.iter().enumerate() {
            worksheet.set_column_width(i as u16, 24.0)?;
            worksheet.write_string_with_format(0, i as u16, *name, &header_format)?;
        }

        let sample_fmt = Format::new().set_italic().set_font_color(Color::RGB(0x94A3B8));
        let sample = ["Jane Doe", "jane@example.com", "Data Science", "City College", "A", "2026-06-30"];
        for (i, value) in sample.iter().enumerate() {
            worksheet.write_string_with_format(1, i as u16, *value, &sample_fmt)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        Ok(workbook.save_to_buffer()?)
    }
}
