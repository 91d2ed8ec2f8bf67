pub mod analytics_service;
pub mod application_service;
pub mod auth_service;
pub mod certificate_service;
pub mod company_service;
pub mod email_service;
pub mod export_service;
pub mod external_job_service;
pub mod fit_service;
pub mod import_service;
pub mod job_service;
pub mod message_service;
pub mod notification_service;
pub mod payment_service;
pub mod realtime_service;
pub mod scheduler_service;
pub mod student_service;
pub mod user_service;
