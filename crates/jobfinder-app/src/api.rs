//! Contracts of the job-search backend.
//!
//! The wire types mirror the JSON the backend speaks; [`JobService`] is the
//! seam pages talk to. [`MockJobService`] answers with the same canned data
//! the development server returns.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("file must be PDF or DOCX format")]
    UnsupportedFile(String),

    #[error("job title is required")]
    MissingJobTitle,

    #[error("cannot {action:?} while automation is {status:?}")]
    InvalidControl {
        action: ControlKind,
        status: RunState,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    AnalyzeCv,
    SearchJobs,
    JobStatus,
    JobLogs,
    Control,
}

impl Endpoint {
    pub fn method(self) -> &'static str {
        match self {
            Endpoint::JobStatus | Endpoint::JobLogs => "GET",
            _ => "POST",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::AnalyzeCv => "/analyze-cv",
            Endpoint::SearchJobs => "/search-jobs",
            Endpoint::JobStatus => "/job-status",
            Endpoint::JobLogs => "/job-logs",
            Endpoint::Control => "/control",
        }
    }

    pub fn url(self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub id: u32,
    pub title: String,
    pub match_score: u8,
    pub why_match: String,
    pub responsibilities: Vec<String>,
    pub why_excel: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobSearchResult {
    pub id: u32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub posted: String,
    pub remote: bool,
    pub link: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStatus {
    pub status: RunState,
    pub jobs_total: u32,
    pub jobs_completed: u32,
    pub jobs_failed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job_title: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
    Search,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationLog {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub message: String,
    pub timestamp: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Start,
    Pause,
    Resume,
    Stop,
    Skip,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlAction {
    pub action: ControlKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<u32>,
}

impl ControlAction {
    pub fn new(action: ControlKind) -> Self {
        Self {
            action,
            job_title: None,
            job_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeCvResponse {
    pub job_matches: Vec<JobMatch>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchJobsResponse {
    pub search_results: Vec<JobSearchResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobLogsResponse {
    pub logs: Vec<AutomationLog>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchJobsRequest {
    pub job_title: String,
}

pub fn decode_job_matches(body: &str) -> Result<Vec<JobMatch>, ApiError> {
    Ok(serde_json::from_str::<AnalyzeCvResponse>(body)?.job_matches)
}

pub fn decode_search_results(body: &str) -> Result<Vec<JobSearchResult>, ApiError> {
    Ok(serde_json::from_str::<SearchJobsResponse>(body)?.search_results)
}

pub fn decode_logs(body: &str) -> Result<Vec<AutomationLog>, ApiError> {
    Ok(serde_json::from_str::<JobLogsResponse>(body)?.logs)
}

pub trait JobService {
    /// Matches a CV against open roles. Only `.pdf` and `.docx` are accepted.
    fn analyze_cv(&self, file_name: &str, contents: &[u8]) -> Result<Vec<JobMatch>, ApiError>;
    fn search_jobs(&self, job_title: &str) -> Result<Vec<JobSearchResult>, ApiError>;
    fn job_status(&self) -> Result<AutomationStatus, ApiError>;
    fn job_logs(&self) -> Result<Vec<AutomationLog>, ApiError>;
    fn control(&self, action: &ControlAction) -> Result<AutomationStatus, ApiError>;
}

fn accepted_cv(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".pdf") || lower.ends_with(".docx")
}

struct Automation {
    status: AutomationStatus,
    queue: Vec<JobSearchResult>,
    logs: Vec<AutomationLog>,
    clock: u32,
}

/// Deterministic in-process backend.
pub struct MockJobService {
    automation: RefCell<Automation>,
}

impl Default for MockJobService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJobService {
    pub fn new() -> Self {
        Self {
            automation: RefCell::new(Automation {
                status: AutomationStatus::default(),
                queue: Vec::new(),
                logs: Vec::new(),
                clock: 0,
            }),
        }
    }

    fn log(a: &mut Automation, kind: LogKind, message: String) {
        a.clock += 1;
        let id = a.logs.len() as u32 + 1;
        a.logs.push(AutomationLog {
            id,
            kind,
            message,
            timestamp: format!("T+{}s", a.clock),
        });
    }

    fn focus_next(a: &mut Automation) {
        let done = (a.status.jobs_completed + a.status.jobs_failed) as usize;
        match a.queue.get(done).cloned() {
            Some(job) => {
                a.status.current_job_id = Some(job.id);
                a.status.current_job_title = Some(job.title);
            }
            None => {
                a.status.current_job_id = None;
                a.status.current_job_title = None;
                a.status.status = RunState::Completed;
                Self::log(a, LogKind::Success, "All applications processed".into());
            }
        }
    }
}

fn job_matches() -> Vec<JobMatch> {
    let raw: [(u32, &str, u8, &str, [&str; 3], &str); 5] = [
        (
            1,
            "Senior Frontend Developer",
            92,
            "Your extensive React experience and UI/UX skills align perfectly with this role.",
            [
                "Develop responsive web applications using React",
                "Collaborate with UI/UX designers to implement designs",
                "Optimize application performance and user experience",
            ],
            "Your portfolio demonstrates exceptional UI work and your experience with performance optimization will be valuable.",
        ),
        (
            2,
            "Full Stack Engineer",
            87,
            "Your combined frontend and backend experience makes you an ideal candidate.",
            [
                "Build full-stack web applications",
                "Work with Node.js backends and React frontends",
                "Design and implement database schemas",
            ],
            "Your GitHub projects show proficiency in both frontend and backend technologies.",
        ),
        (
            3,
            "UX/UI Developer",
            85,
            "Your design sensibility combined with development skills is perfect for this hybrid role.",
            [
                "Create wireframes and prototypes",
                "Implement responsive designs in code",
                "Conduct usability testing",
            ],
            "Your attention to detail and understanding of user experience principles are evident in your work.",
        ),
        (
            4,
            "DevOps Engineer",
            78,
            "Your experience with CI/CD pipelines and cloud services is relevant for this position.",
            [
                "Set up and maintain CI/CD pipelines",
                "Manage cloud infrastructure",
                "Optimize deployment workflows",
            ],
            "Your background in automation and infrastructure as code will be particularly valuable.",
        ),
        (
            5,
            "Technical Lead",
            76,
            "Your leadership experience and technical expertise qualify you for this role.",
            [
                "Lead a team of developers",
                "Make architectural decisions",
                "Mentor junior team members",
            ],
            "Your communication skills and experience mentoring junior developers make you a strong fit.",
        ),
    ];
    raw.into_iter()
        .map(|(id, title, score, why, resp, excel)| JobMatch {
            id,
            title: title.into(),
            match_score: score,
            why_match: why.into(),
            responsibilities: resp.iter().map(|s| s.to_string()).collect(),
            why_excel: excel.into(),
        })
        .collect()
}

fn search_results(title: &str) -> Vec<JobSearchResult> {
    let raw = [
        (format!("Senior {title}"), "TechCorp Inc.", "San Francisco, CA", "$120K - $150K", "2 days ago", true),
        (title.to_string(), "Innovation Labs", "New York, NY", "$110K - $140K", "1 week ago", false),
        (format!("{title} (Mid-level)"), "Future Technologies", "Remote", "$100K - $130K", "3 days ago", true),
        (format!("Lead {title}"), "Digital Solutions", "Austin, TX", "$115K - $145K", "5 days ago", false),
        (format!("Junior {title}"), "Tech Innovators", "Seattle, WA", "$80K - $100K", "1 day ago", true),
        (format!("Contract {title}"), "GrowthWorks", "Chicago, IL", "$70/hr - $90/hr", "4 days ago", true),
        (format!("{title} - Startup Environment"), "NextGen Startup", "Miami, FL", "$90K - $120K + equity", "1 week ago", false),
        (format!("{title} - Healthcare Focus"), "HealthTech Solutions", "Boston, MA", "$115K - $135K", "2 weeks ago", true),
    ];
    raw.into_iter()
        .zip(101u32..)
        .map(|((title, company, location, salary, posted, remote), id)| JobSearchResult {
            id,
            description: format!("{company} is hiring for {title}."),
            title,
            company: company.into(),
            location: location.into(),
            salary: salary.into(),
            posted: posted.into(),
            remote,
            link: format!("https://linkedin.com/jobs/view/{}", 123355 + id),
        })
        .collect()
}

impl JobService for MockJobService {
    fn analyze_cv(&self, file_name: &str, contents: &[u8]) -> Result<Vec<JobMatch>, ApiError> {
        if !accepted_cv(file_name) {
            return Err(ApiError::UnsupportedFile(file_name.to_string()));
        }
        log::debug!("analyzing {file_name} ({} bytes)", contents.len());
        Ok(job_matches())
    }

    fn search_jobs(&self, job_title: &str) -> Result<Vec<JobSearchResult>, ApiError> {
        let job_title = job_title.trim();
        if job_title.is_empty() {
            return Err(ApiError::MissingJobTitle);
        }
        let results = search_results(job_title);
        let mut a = self.automation.borrow_mut();
        a.queue = results.clone();
        a.status = AutomationStatus {
            status: RunState::Idle,
            jobs_total: results.len() as u32,
            ..AutomationStatus::default()
        };
        Self::log(
            &mut a,
            LogKind::Search,
            format!("Found {} jobs for \"{job_title}\"", results.len()),
        );
        Ok(results)
    }

    fn job_status(&self) -> Result<AutomationStatus, ApiError> {
        Ok(self.automation.borrow().status.clone())
    }

    fn job_logs(&self) -> Result<Vec<AutomationLog>, ApiError> {
        Ok(self.automation.borrow().logs.clone())
    }

    /// `Skip` marks the current job failed; a job id that is a multiple of
    /// five fails the same way the development server's applications do.
    fn control(&self, action: &ControlAction) -> Result<AutomationStatus, ApiError> {
        let mut a = self.automation.borrow_mut();
        let status = a.status.status;
        let invalid = || ApiError::InvalidControl {
            action: action.action,
            status,
        };
        match (action.action, status) {
            (ControlKind::Start, RunState::Idle | RunState::Completed | RunState::Failed) => {
                if a.queue.is_empty() {
                    return Err(invalid());
                }
                a.status.status = RunState::Running;
                a.status.jobs_completed = 0;
                a.status.jobs_failed = 0;
                Self::log(&mut a, LogKind::Info, "Automation started".into());
                Self::focus_next(&mut a);
            }
            (ControlKind::Pause, RunState::Running) => {
                a.status.status = RunState::Paused;
                Self::log(&mut a, LogKind::Warning, "Automation paused".into());
            }
            (ControlKind::Resume, RunState::Paused) => {
                a.status.status = RunState::Running;
                Self::log(&mut a, LogKind::Info, "Automation resumed".into());
                // A resumed run applies to the job it was focused on.
                if let Some(id) = a.status.current_job_id {
                    if id % 5 == 0 {
                        a.status.jobs_failed += 1;
                        Self::log(&mut a, LogKind::Error, format!("Application {id} failed"));
                    } else {
                        a.status.jobs_completed += 1;
                        Self::log(&mut a, LogKind::Success, format!("Applied to job {id}"));
                    }
                    Self::focus_next(&mut a);
                }
            }
            (ControlKind::Skip, RunState::Running | RunState::Paused) => {
                let skipped = a.status.current_job_title.clone().unwrap_or_default();
                a.status.jobs_failed += 1;
                Self::log(&mut a, LogKind::Warning, format!("Skipped {skipped}"));
                Self::focus_next(&mut a);
            }
            (ControlKind::Stop, RunState::Running | RunState::Paused) => {
                a.status.status = RunState::Idle;
                a.status.current_job_id = None;
                a.status.current_job_title = None;
                Self::log(&mut a, LogKind::Info, "Automation stopped".into());
            }
            _ => return Err(invalid()),
        }
        Ok(a.status.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_pdf_and_docx_are_analyzed() {
        let api = MockJobService::new();
        assert_eq!(api.analyze_cv("cv.PDF", b"%PDF").unwrap().len(), 5);
        assert!(api.analyze_cv("cv.docx", b"").is_ok());
        assert!(matches!(
            api.analyze_cv("cv.txt", b""),
            Err(ApiError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn search_results_carry_the_title() {
        let api = MockJobService::new();
        let results = api.search_jobs("Rust Engineer").unwrap();
        assert_eq!(results.len(), 8);
        assert_eq!(results[0].title, "Senior Rust Engineer");
        assert_eq!(results[0].id, 101);
        assert!(matches!(api.search_jobs("  "), Err(ApiError::MissingJobTitle)));
        assert_eq!(api.job_status().unwrap().jobs_total, 8);
    }

    #[test]
    fn automation_walks_the_queue() {
        let api = MockJobService::new();
        api.search_jobs("Designer").unwrap();
        let s = api.control(&ControlAction::new(ControlKind::Start)).unwrap();
        assert_eq!(s.status, RunState::Running);
        assert_eq!(s.current_job_id, Some(101));

        api.control(&ControlAction::new(ControlKind::Pause)).unwrap();
        let s = api.control(&ControlAction::new(ControlKind::Resume)).unwrap();
        assert_eq!(s.jobs_completed, 1);
        assert_eq!(s.current_job_id, Some(102));

        assert!(matches!(
            api.control(&ControlAction::new(ControlKind::Resume)),
            Err(ApiError::InvalidControl { .. })
        ));

        for _ in 0..7 {
            api.control(&ControlAction::new(ControlKind::Skip)).unwrap();
        }
        let s = api.job_status().unwrap();
        assert_eq!(s.status, RunState::Completed);
        assert_eq!(s.jobs_failed, 7);
        assert!(api.job_logs().unwrap().iter().any(|l| l.kind == LogKind::Search));
    }

    #[test]
    fn envelopes_decode() {
        let body = json!({
            "job_matches": [{
                "id": 1,
                "title": "Technical Lead",
                "matchScore": 76,
                "whyMatch": "x",
                "responsibilities": ["a"],
                "whyExcel": "y"
            }]
        })
        .to_string();
        let matches = decode_job_matches(&body).unwrap();
        assert_eq!(matches[0].match_score, 76);

        let logs = decode_logs(r#"{"logs":[{"id":1,"type":"search","message":"m","timestamp":"t"}]}"#)
            .unwrap();
        assert_eq!(logs[0].kind, LogKind::Search);
        assert!(matches!(decode_search_results("{}"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn control_action_wire_form() {
        let action = ControlAction {
            job_id: Some(7),
            ..ControlAction::new(ControlKind::Skip)
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"action": "skip", "jobId": 7})
        );
        assert_eq!(
            Endpoint::JobLogs.url("http://localhost:5000/api/"),
            "http://localhost:5000/api/job-logs"
        );
        assert_eq!(Endpoint::Control.method(), "POST");
    }
}
