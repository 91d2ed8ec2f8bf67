use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::notification::{CreateNotification, NotificationKind};
use crate::models::student::Student;
use crate::services::job_service::Actor;
use crate::services::notification_service::NotificationService;
use crate::services::student_service::StudentService;

const CERTIFICATE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Certificate {{certificate_id}}</title>
<style>
  @page { size: A4 landscape; margin: 0; }
  body { margin: 0; font-family: Georgia, 'Times New Roman', serif; color: #1e293b; }
  .frame { box-sizing: border-box; width: 297mm; height: 210mm; padding: 18mm; border: 6mm solid #0f172a; text-align: center; }
  h1 { font-size: 42pt; letter-spacing: 2pt; margin: 10mm 0 4mm; }
  .name { font-size: 30pt; font-weight: bold; margin: 8mm 0; }
  .course { font-size: 20pt; font-style: italic; }
  .meta { margin-top: 12mm; font-size: 12pt; color: #475569; }
  .id { position: absolute; bottom: 24mm; right: 30mm; font-size: 10pt; color: #64748b; }
</style>
</head>
<body>
<div class="frame">
  <h1>Certificate of Completion</h1>
  <p>This certifies that</p>
  <p class="name">{{name}}</p>
  <p>has successfully completed</p>
  <p class="course">{{course}}</p>
  <p class="meta">{{institution}} &middot; Grade: {{grade}} &middot; {{date}}</p>
  <p class="id">Certificate ID: {{certificate_id}}</p>
</div>
</body>
</html>
"#;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_certificate(student: &Student) -> String {
    let date = student
        .completion_date
        .unwrap_or_else(|| student.created_at.date_naive())
        .format("%B %-d, %Y")
        .to_string();
    let values = [
        ("{{name}}", student.name.as_str()),
        ("{{course}}", student.course.as_str()),
        ("{{institution}}", student.institution.as_deref().unwrap_or("")),
        ("{{grade}}", student.grade.as_deref().unwrap_or("-")),
        ("{{date}}", date.as_str()),
        ("{{certificate_id}}", student.certificate_id.as_str()),
    ];
    values
        .iter()
        .fold(CERTIFICATE_TEMPLATE.to_string(), |html, (placeholder, value)| {
            html.replace(placeholder, &escape_html(value))
        })
}

#[derive(Clone)]
pub struct CertificateService {
    students: StudentService,
    notifications: NotificationService,
    uploads_dir: String,
    chrome_bin: Option<String>,
}

impl CertificateService {
    pub fn new(
        students: StudentService,
        notifications: NotificationService,
        uploads_dir: String,
        chrome_bin: Option<String>,
    ) -> Self {
        Self {
            students,
            notifications,
            uploads_dir,
            chrome_bin,
        }
    }

    fn certificates_dir(&self) -> PathBuf {
        Path::new(&self.uploads_dir).join("certificates")
    }

    pub async fn generate(&self, student_id: Uuid, actor: Actor) -> Result<Student> {
        let student = self.students.get_managed(student_id, actor).await?;
        let chrome = self
            .chrome_bin
            .clone()
            .ok_or_else(|| Error::ServiceUnavailable("PDF rendering is not configured".into()))?;

        let dir = self.certificates_dir();
        fs::create_dir_all(&dir).await?;
        let html_path = dir.join(format!("{}.html", student.certificate_id));
        let pdf_path = dir.join(format!("{}.pdf", student.certificate_id));
        fs::write(&html_path, render_certificate(&student)).await?;

        let html_abs = fs::canonicalize(&html_path).await?;
        let output = Command::new(&chrome)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", pdf_path.display()))
            .arg(format!("file://{}", html_abs.display()))
            .output()
            .await
            .map_err(|e| Error::Internal(format!("Failed to run headless browser: {}", e)))?;
        if !output.status.success() {
            tracing::error!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                certificate_id = %student.certificate_id,
                "certificate rendering failed"
            );
            return Err(Error::Internal("Certificate rendering failed".into()));
        }

        let public_path = format!("/uploads/certificates/{}.pdf", student.certificate_id);
        let student = self.students.set_pdf_path(student.id, &public_path).await?;
        tracing::info!(certificate_id = %student.certificate_id, "certificate rendered");

        self.notifications
            .notify(CreateNotification {
                recipient_id: student.uploaded_by,
                kind: NotificationKind::CertificateReady,
                title: "Certificate ready".into(),
                body: format!("Certificate for {} ({}) is ready", student.name, student.course),
                link: Some(format!("/api/cert/download/{}", student.certificate_id)),
            })
            .await;

        Ok(student)
    }

    pub async fn verify(&self, certificate_id: &str) -> Result<Student> {
        self.students.find_by_certificate(certificate_id).await
    }

    /// PDF bytes plus the download file name.
    pub async fn download(&self, certificate_id: &str) -> Result<(Vec<u8>, String)> {
        let student = self.students.find_by_certificate(certificate_id).await?;
        if student.pdf_path.is_none() {
            return Err(Error::NotFound("Certificate has not been rendered yet".into()));
        }
        let file_name = format!("{}.pdf", student.certificate_id);
        let bytes = fs::read(self.certificates_dir().join(&file_name))
            .await
            .map_err(|_| Error::NotFound("Certificate file is missing".into()))?;
        Ok((bytes, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn student(name: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            uploaded_by: Uuid::new_v4(),
            name: name.into(),
            email: "s@example.com".into(),
            course: "Data & Systems".into(),
            institution: Some("City College".into()),
            grade: None,
            completion_date: NaiveDate::from_ymd_opt(2026, 6, 30),
            certificate_id: "CERT-2026-AB12CD34".into(),
            pdf_path: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn every_placeholder_is_filled() {
        let html = render_certificate(&student("Ana Lima"));
        assert!(!html.contains("{{"));
        assert!(html.contains("Ana Lima"));
        assert!(html.contains("June 30, 2026"));
        assert!(html.contains("CERT-2026-AB12CD34"));
        assert!(html.contains("Grade: -"));
    }

    #[test]
    fn values_are_html_escaped() {
        let html = render_certificate(&student("<script>alert('x')</script>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("Data &amp; Systems"));
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape_html("Plain text 123"), "Plain text 123");
        assert_eq!(escape_html("a\"b"), "a&quot;b");
    }
}
