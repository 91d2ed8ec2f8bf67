use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::job::Job;
use crate::models::user::User;

pub const HEADLINE_BONUS: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub score: i32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub headline_bonus: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedJob {
    pub job_id: uuid::Uuid,
    pub title: String,
    pub location: String,
    pub report: FitReport,
}

pub struct FitService;

impl FitService {
    /// Skill overlap as a share of the job's skills, plus a fixed bonus when
    /// the headline mentions the job title, clamped to 0..=100.
    pub fn score(
        candidate_skills: &[String],
        headline: Option<&str>,
        job_title: &str,
        job_skills: &[String],
    ) -> FitReport {
        let have: HashSet<String> = candidate_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let mut seen = HashSet::new();
        let wanted: Vec<&String> = job_skills
            .iter()
            .filter(|s| !s.trim().is_empty())
            .filter(|s| seen.insert(s.trim().to_lowercase()))
            .collect();

        let wanted_len = wanted.len();
        let (matched, missing): (Vec<&String>, Vec<&String>) = wanted
            .into_iter()
            .partition(|s| have.contains(&s.trim().to_lowercase()));

        let ratio_score = if wanted_len == 0 {
            0
        } else {
            ((matched.len() as f64 / wanted_len as f64) * 100.0).round() as i32
        };

        let headline_bonus = headline
            .map(|h| Self::headline_mentions_title(h, job_title))
            .unwrap_or(false);
        let bonus = if headline_bonus { HEADLINE_BONUS } else { 0 };

        FitReport {
            score: (ratio_score + bonus).clamp(0, 100),
            matched_skills: matched.into_iter().map(|s| s.trim().to_string()).collect(),
            missing_skills: missing.into_iter().map(|s| s.trim().to_string()).collect(),
            headline_bonus,
        }
    }

    pub fn score_for(user: &User, job: &Job) -> FitReport {
        Self::score(&user.skills, user.headline.as_deref(), &job.title, &job.skills)
    }

    /// Highest score first; ties keep the incoming (newest-first) order.
    pub fn rank(user: &User, jobs: Vec<Job>, limit: usize) -> Vec<RankedJob> {
        let mut ranked: Vec<RankedJob> = jobs
            .into_iter()
            .map(|job| RankedJob {
                report: Self::score_for(user, &job),
                job_id: job.id,
                title: job.title,
                location: job.location,
            })
            .collect();
        ranked.sort_by(|a, b| b.report.score.cmp(&a.report.score));
        ranked.truncate(limit);
        ranked
    }

    fn headline_mentions_title(headline: &str, job_title: &str) -> bool {
        let headline = headline.to_lowercase();
        let title = job_title.trim().to_lowercase();
        if title.is_empty() || headline.trim().is_empty() {
            return false;
        }
        if headline.contains(&title) {
            return true;
        }
        let headline_words: HashSet<&str> = headline
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 3)
            .any(|w| headline_words.contains(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ratio_of_matched_job_skills() {
        let report = FitService::score(
            &skills(&["rust", "SQL", "docker"]),
            None,
            "Backend Engineer",
            &skills(&["Rust", "sql", "Kubernetes", "AWS"]),
        );
        assert_eq!(report.score, 50);
        assert_eq!(report.matched_skills, skills(&["Rust", "sql"]));
        assert_eq!(report.missing_skills, skills(&["Kubernetes", "AWS"]));
        assert!(!report.headline_bonus);
    }

    #[test]
    fn headline_bonus_applies_on_title_word() {
        let report = FitService::score(
            &skills(&["rust"]),
            Some("Senior backend developer"),
            "Backend Engineer",
            &skills(&["Rust", "Go"]),
        );
        assert!(report.headline_bonus);
        assert_eq!(report.score, 60);
    }

    #[test]
    fn short_title_words_do_not_trigger_bonus() {
        let report = FitService::score(&[], Some("QA at scale"), "QA Lead", &skills(&["Testing"]));
        assert!(!report.headline_bonus);
        assert_eq!(report.score, 0);
    }

    #[test]
    fn score_is_clamped_to_one_hundred() {
        let report = FitService::score(
            &skills(&["rust"]),
            Some("Rust Engineer"),
            "Rust Engineer",
            &skills(&["Rust"]),
        );
        assert_eq!(report.score, 100);
    }

    #[test]
    fn job_without_skills_scores_only_the_bonus() {
        let report = FitService::score(&skills(&["rust"]), Some("Designer"), "Product Designer", &[]);
        assert_eq!(report.score, HEADLINE_BONUS);
        assert!(report.missing_skills.is_empty());
    }

    #[test]
    fn duplicate_job_skills_count_once() {
        let report = FitService::score(
            &skills(&["rust"]),
            None,
            "Engineer",
            &skills(&["Rust", "rust ", "Go"]),
        );
        assert_eq!(report.score, 50);
    }
}
