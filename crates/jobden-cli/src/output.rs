//! Plain-text rendering of backend records.

use jobden_core::models::{Application, Bookmark, Job, JobApplicant, Notification};
use jobden_core::utils::{format_currency, format_date, format_relative_time, strip_html, truncate};

const SUMMARY_WIDTH: usize = 72;

pub fn job_line(job: &Job) -> String {
    let salary = job.salary.map(format_currency).unwrap_or_else(|| "-".to_string());
    format!(
        "#{:<5} {:<32} {:<18} {:>12}  {}",
        job.id,
        truncate(&job.title, 32),
        truncate(job.location.as_deref().unwrap_or("-"), 18),
        salary,
        format_relative_time(&job.created_at),
    )
}

pub fn job_details(job: &Job) {
    println!("{} (#{})", job.title, job.id);
    if let Some(ref location) = job.location {
        println!("Location: {}", location);
    }
    if let Some(ref job_type) = job.job_type {
        println!("Type:     {}", job_type);
    }
    if let Some(salary) = job.salary {
        println!("Salary:   {}", format_currency(salary));
    }
    println!("Posted:   {}", format_date(&job.created_at));
    if !job.is_active {
        println!("This posting is closed.");
    }
    println!();
    println!("{}", strip_html(&job.description));
    if let Some(ref requirements) = job.requirements {
        println!();
        println!("Requirements:");
        println!("{}", strip_html(requirements));
    }

    let questions = job.questions();
    if !questions.is_empty() {
        println!();
        println!("Questions:");
        for q in questions {
            let marker = if q.required { "*" } else { " " };
            println!("  {}[{}] {} ({})", marker, q.id, q.question, q.kind.label());
            for option in q.options() {
                println!("       - {}", option);
            }
        }
    }
}

pub fn application_line(app: &Application) -> String {
    let title = app
        .job
        .as_ref()
        .map(|j| j.title.as_str())
        .unwrap_or("(job removed)");
    format!(
        "#{:<5} {:<36} {:<10} applied {}",
        app.id,
        truncate(title, 36),
        app.status.as_str(),
        format_date(&app.applied_at),
    )
}

pub fn bookmark_line(bookmark: &Bookmark) -> String {
    format!("{}  (saved {})", job_line(&bookmark.job), format_relative_time(&bookmark.created_at))
}

pub fn notification_line(n: &Notification) -> String {
    let marker = if n.is_read { " " } else { "*" };
    format!(
        "{} #{:<5} {} - {} ({})",
        marker,
        n.id,
        n.title,
        truncate(&n.message, SUMMARY_WIDTH),
        format_relative_time(&n.created_at),
    )
}

pub fn applicant_line(a: &JobApplicant) -> String {
    format!(
        "#{:<5} {:<28} {:<30} {:<10} {}",
        a.application_id,
        truncate(a.applicant.display_name(), 28),
        truncate(&a.applicant.email, 30),
        a.status,
        format_date(&a.applied_at),
    )
}
