//! Subcommands and their handlers.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Subcommand;
use serde::Serialize;
use tracing::warn;

use jobden_core::auth::{authorize, landing_path, Access, LOGIN_PATH};
use jobden_core::models::{
    ApplicationStatus, CreateApplication, CreateJob, CustomQuestion, DocumentType, EmployerJobFilters, JobFilters,
    NotificationFilters, QuestionAnswer, QuestionType, Role,
};
use jobden_core::utils::{format_currency, format_date};
use jobden_core::validate::{validate_answers, validate_job_posting, validate_registration, ValidationErrors};
use jobden_core::{ApiClient, Config, Upload};

use crate::output;

const PAGE_SIZE: u32 = 20;

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session
    Login { email: Option<String> },
    /// Create an account
    Register {
        email: String,
        /// Register as an employer instead of a job seeker
        #[arg(long)]
        employer: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Search job postings
    Jobs {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        job_type: Option<String>,
        #[arg(long)]
        min_salary: Option<f64>,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = PAGE_SIZE)]
        limit: u32,
    },
    /// Show one job posting
    Job { id: i64 },
    /// Apply to a job
    Apply {
        job_id: i64,
        #[arg(long)]
        cover_letter: Option<String>,
        /// Answer a screening question: QUESTION_ID=TEXT
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
        /// Attach a resume to the application
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// List your applications
    Applications {
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
    /// Withdraw one of your applications
    Withdraw { application_id: i64 },
    /// List saved jobs
    Bookmarks,
    /// Save a job
    Bookmark { job_id: i64 },
    /// Remove a saved job
    Unbookmark { job_id: i64 },
    /// List notifications
    Notifications {
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read
    Read { id: i64 },
    /// Mark every notification as read
    ReadAll,
    /// Show your profile
    Profile,
    /// Upload a resume to your profile
    UploadResume { path: PathBuf },
    /// Employer overview: stats, postings and unread notifications
    Dashboard,
    /// List your job postings
    MyJobs {
        #[arg(long)]
        active: bool,
    },
    /// Post a new job
    PostJob {
        #[arg(long)]
        title: String,
        /// Description, HTML allowed
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        salary: Option<f64>,
        #[arg(long)]
        job_type: Option<String>,
        #[arg(long)]
        requirements: Option<String>,
        /// Add a required short-answer screening question
        #[arg(long = "question")]
        questions: Vec<String>,
    },
    /// Delete one of your postings
    DeleteJob { id: i64 },
    /// List applicants for one of your postings
    Applicants { job_id: i64 },
    /// Move an application through review
    SetStatus {
        application_id: i64,
        status: ApplicationStatus,
    },
}

impl Command {
    /// Commands that act on the stored session, which is verified first.
    pub fn uses_stored_session(&self) -> bool {
        !matches!(self, Command::Login { .. } | Command::Register { .. } | Command::Logout)
    }
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (id, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION_ID=TEXT, got '{}'", raw))?;
    Ok((id.trim().to_string(), text.to_string()))
}

/// Refuse a command the current session may not run.
fn require(client: &ApiClient, role: Option<Role>) -> Result<()> {
    match authorize(&client.session(), role) {
        Access::Allow => Ok(()),
        Access::Loading => bail!("Session is still loading, try again"),
        Access::RedirectTo(LOGIN_PATH) => bail!("Not logged in. Run `jobden login` first."),
        Access::RedirectTo(home) => bail!("This command is not available for your account (your home is {})", home),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(errors: ValidationErrors) -> anyhow::Error {
    for e in errors.errors() {
        eprintln!("  {}", e);
    }
    anyhow!("Please fix the errors above")
}

pub async fn run(command: Command, client: &ApiClient, config: &mut Config, json: bool) -> Result<()> {
    match command {
        Command::Login { email } => {
            let email = match email.or_else(|| config.last_email.clone()) {
                Some(email) => email,
                None => prompt("Email: ")?,
            };
            let password = rpassword::prompt_password(format!("Password for {}: ", email))?;
            let user = client.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.email, user.role().display_name());
            println!("Start at {}", landing_path(&user));

            config.last_email = Some(email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }

        Command::Register { email, employer } => {
            let password = rpassword::prompt_password("Password: ")?;
            let confirm = rpassword::prompt_password("Confirm password: ")?;
            validate_registration(&email, &password, &confirm).map_err(report)?;
            let user = client.register(&email, &password, employer).await?;
            println!(
                "Registered {} as {}. Run `jobden login` to sign in.",
                user.email,
                user.role().display_name()
            );
        }

        Command::Logout => {
            client.logout()?;
            println!("Logged out");
        }

        Command::Whoami => {
            let session = client.session();
            match session.user() {
                Some(user) if session.is_authenticated() => {
                    if json {
                        return print_json(user);
                    }
                    println!("{} ({}, id {})", user.email, user.role().display_name(), user.id);
                }
                _ => println!("Not logged in"),
            }
        }

        Command::Jobs {
            search,
            location,
            job_type,
            min_salary,
            skip,
            limit,
        } => {
            require(client, None)?;
            let filters = JobFilters {
                location,
                job_type,
                min_salary,
                search,
                skip: Some(skip),
                limit: Some(limit),
            };
            let jobs = client.list_jobs(&filters).await?;
            if json {
                return print_json(&jobs);
            }
            if jobs.is_empty() {
                println!("No jobs match those filters");
            }
            for job in &jobs {
                println!("{}", output::job_line(job));
            }
        }

        Command::Job { id } => {
            require(client, None)?;
            let job = client.get_job(id).await?;
            if json {
                return print_json(&job);
            }
            output::job_details(&job);

            if client.session().role() == Some(Role::JobSeeker) {
                let (applied, saved) = futures::try_join!(client.has_applied(id), client.is_bookmarked(id))?;
                println!();
                if applied {
                    println!("You have applied to this job.");
                }
                if saved {
                    println!("Saved to your bookmarks.");
                }
            }
        }

        Command::Apply {
            job_id,
            cover_letter,
            answers,
            resume,
        } => {
            require(client, Some(Role::JobSeeker))?;
            let job = client.get_job(job_id).await?;
            if !job.is_active {
                bail!("This posting is closed");
            }

            let question_answers: Vec<QuestionAnswer> = job
                .questions()
                .iter()
                .map(|q| {
                    let mut answer = q.blank_answer();
                    if let Some((_, text)) = answers.iter().find(|(id, _)| *id == q.id) {
                        answer.answer = text.clone();
                    }
                    answer
                })
                .collect();
            validate_answers(job.questions(), &question_answers).map_err(report)?;

            // Read the file before creating the application so a bad path aborts early
            let resume = resume
                .map(|path| Upload::from_path(&path).with_context(|| format!("Failed to read {}", path.display())))
                .transpose()?;

            let application = client
                .create_application(&CreateApplication {
                    job_id,
                    cover_letter,
                    question_answers: question_answers.into_iter().filter(|a| !a.answer.trim().is_empty()).collect(),
                })
                .await?;
            println!("Applied to {} (application #{})", job.title, application.id);

            if let Some(file) = resume {
                let document = client
                    .upload_document(application.id, DocumentType::Resume, file)
                    .await?;
                println!("Attached {}", document.file_name);
            }
        }

        Command::Applications { status } => {
            require(client, Some(Role::JobSeeker))?;
            let applications = client.list_applications(status, 0, PAGE_SIZE).await?;
            if json {
                return print_json(&applications);
            }
            if applications.is_empty() {
                println!("No applications yet");
            }
            for app in &applications {
                println!("{}", output::application_line(app));
            }
        }

        Command::Withdraw { application_id } => {
            require(client, Some(Role::JobSeeker))?;
            let current = client.get_application(application_id).await?;
            if !current.status.can_withdraw() {
                bail!("Application #{} is already {}", application_id, current.status);
            }
            let updated = client.withdraw_application(application_id).await?;
            println!("Application #{} is now {}", updated.id, updated.status);
        }

        Command::Bookmarks => {
            require(client, Some(Role::JobSeeker))?;
            let bookmarks = client.list_bookmarks(0, PAGE_SIZE).await?;
            if json {
                return print_json(&bookmarks);
            }
            if bookmarks.is_empty() {
                println!("No saved jobs");
            }
            for bookmark in &bookmarks {
                println!("{}", output::bookmark_line(bookmark));
            }
        }

        Command::Bookmark { job_id } => {
            require(client, Some(Role::JobSeeker))?;
            let bookmark = client.add_bookmark(job_id).await?;
            println!("Saved {}", bookmark.job.title);
        }

        Command::Unbookmark { job_id } => {
            require(client, Some(Role::JobSeeker))?;
            client.remove_bookmark(job_id).await?;
            println!("Removed job #{} from bookmarks", job_id);
        }

        Command::Notifications { unread } => {
            require(client, None)?;
            let filters = NotificationFilters {
                unread_only: unread,
                limit: Some(PAGE_SIZE),
                ..Default::default()
            };
            let notifications = client.list_notifications(&filters).await?;
            if json {
                return print_json(&notifications);
            }
            if notifications.is_empty() {
                println!("No notifications");
            }
            for n in &notifications {
                println!("{}", output::notification_line(n));
            }
        }

        Command::Read { id } => {
            require(client, None)?;
            let n = client.mark_notification_read(id).await?;
            println!("Marked '{}' as read", n.title);
        }

        Command::ReadAll => {
            require(client, None)?;
            let result = client.mark_all_notifications_read().await?;
            println!("Marked {} notifications as read", result.count);
        }

        Command::Profile => {
            require(client, None)?;
            match client.session().role() {
                Some(Role::Employer) => {
                    let profile = client.get_employer_profile_with_stats().await?;
                    if json {
                        return print_json(&profile);
                    }
                    println!("{}", profile.profile.company_name);
                    if let Some(ref website) = profile.profile.company_website {
                        println!("Website:      {}", website);
                    }
                    println!("Jobs:         {} ({} active)", profile.total_jobs, profile.active_jobs);
                    println!("Applications: {}", profile.total_applications);
                }
                _ => {
                    let profile = client.get_profile_with_stats().await?;
                    if json {
                        return print_json(&profile);
                    }
                    println!("{}", profile.profile.full_name);
                    let skills = profile.profile.skill_list();
                    if !skills.is_empty() {
                        println!("Skills:       {}", skills.join(", "));
                    }
                    if let Some(ref resume) = profile.profile.resume_url {
                        println!("Resume:       {}", resume);
                    }
                    println!("Applications: {}", profile.stats.total_applications);
                    println!("Bookmarks:    {}", profile.stats.total_bookmarks);
                }
            }
        }

        Command::UploadResume { path } => {
            require(client, Some(Role::JobSeeker))?;
            let file = Upload::from_path(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            let uploaded = client.upload_resume(file).await?;
            println!("{} ({})", uploaded.message, uploaded.url);
        }

        Command::Dashboard => {
            require(client, Some(Role::Employer))?;
            let filters = EmployerJobFilters {
                limit: Some(5),
                ..Default::default()
            };
            let (stats, jobs, unread) = futures::try_join!(
                client.dashboard_stats(),
                client.list_my_jobs(&filters),
                client.unread_count(),
            )?;
            println!("Jobs:         {} ({} active)", stats.total_jobs, stats.active_jobs);
            println!("Applications: {}", stats.total_applications);
            if let Some(pending) = stats.pending_applications {
                println!("Pending:      {}", pending);
            }
            println!("Unread:       {}", unread);
            if !jobs.is_empty() {
                println!();
                println!("Recent postings:");
                for job in &jobs {
                    println!("{}", output::job_line(job));
                }
            }
        }

        Command::MyJobs { active } => {
            require(client, Some(Role::Employer))?;
            let filters = EmployerJobFilters {
                active_only: active.then_some(true),
                ..Default::default()
            };
            let jobs = client.list_my_jobs(&filters).await?;
            if json {
                return print_json(&jobs);
            }
            for job in &jobs {
                println!("{}", output::job_line(job));
            }
        }

        Command::PostJob {
            title,
            description,
            location,
            salary,
            job_type,
            requirements,
            questions,
        } => {
            require(client, Some(Role::Employer))?;
            let job = CreateJob {
                title,
                description,
                location,
                salary,
                job_type,
                requirements,
                is_active: Some(true),
                custom_questions: questions
                    .into_iter()
                    .enumerate()
                    .map(|(i, question)| CustomQuestion {
                        id: format!("q{}", i + 1),
                        kind: QuestionType::ShortAnswer,
                        question,
                        required: true,
                        options: None,
                    })
                    .collect(),
            };
            validate_job_posting(&job).map_err(report)?;
            let created = client.create_job(&job).await?;
            let salary = created.salary.map(format_currency).unwrap_or_default();
            println!("Posted #{} {} {}", created.id, created.title, salary);
        }

        Command::DeleteJob { id } => {
            require(client, Some(Role::Employer))?;
            client.delete_job(id).await?;
            println!("Deleted job #{}", id);
        }

        Command::Applicants { job_id } => {
            require(client, Some(Role::Employer))?;
            let response = client.list_applicants(job_id, 0, PAGE_SIZE).await?;
            if json {
                return print_json(&response);
            }
            println!("{} applicants for job #{}", response.total_applicants, response.job_id);
            for applicant in &response.applicants {
                println!("{}", output::applicant_line(applicant));
            }
        }

        Command::SetStatus { application_id, status } => {
            require(client, Some(Role::Employer))?;
            let response = client.set_application_status(application_id, status).await?;
            println!("{} (application #{} is now {})", response.message, response.application_id, response.new_status);
        }
    }

    Ok(())
}
