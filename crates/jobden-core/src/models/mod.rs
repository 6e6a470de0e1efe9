//! Data models for JobDen entities.
//!
//! These records are owned and validated by the backend; the client only
//! stores and displays them. Field names follow the backend's snake_case JSON.
//!
//! - `UserSummary`, `Role`, `TokenPair`: identity and credentials
//! - `Job`, `JobFilters`, `CustomQuestion`: postings and their questionnaires
//! - `Application`, `ApplicationDocument`: submitted applications
//! - `Bookmark`, `Notification`
//! - `JobSeekerProfile`, `EmployerProfile`, `JobApplicant`

pub mod application;
pub mod bookmark;
pub mod employer;
pub mod job;
pub mod notification;
pub mod profile;
pub mod question;
pub mod user;

pub use application::{
    Application, ApplicationDocument, ApplicationJob, ApplicationStatus, CreateApplication,
    DocumentType, UpdateApplication,
};
pub use bookmark::Bookmark;
pub use employer::{
    Applicant, CreateEmployerProfile, DashboardStats, EmployerProfile, EmployerProfileWithStats,
    JobApplicant, JobApplicantsResponse, StatusUpdateResponse, UpdateEmployerProfile,
};
pub use job::{CreateJob, EmployerJobFilters, Job, JobFilters, UpdateJob};
pub use notification::{
    MarkAllReadResponse, Notification, NotificationCreate, NotificationFilters, NotificationKind,
    UnreadCount,
};
pub use profile::{JobSeekerProfile, ProfileStats, ProfileWithStats, UpdateProfile, UploadedFile};
pub use question::{CustomQuestion, QuestionAnswer, QuestionType};
pub use user::{RegisterRequest, Role, TokenPair, UserSummary};
