// src/extractors/facts.rs

// --- Imports ---
use crate::extractors::dates::{Clock, DateRangeScanner, SystemClock, YearMonth};
use crate::extractors::result::{
    Education, ExperienceEstimate, ExtractionResult, FALLBACK_JOB_TITLE, FALLBACK_SKILL,
    MAX_JOB_TITLES, MAX_SKILLS, PREVIEW_CHARS,
};
use crate::extractors::section::SectionLocator;
use crate::extractors::text::PlainText;
use crate::extractors::vocabulary::Vocabulary;
use crate::utils::error::ExtractError;
use std::sync::Arc;

/// Turns résumé text into an `ExtractionResult`.
///
/// Holds only immutable configuration; every call is independent. The clock is read
/// once per `extract` call.
pub struct FactExtractor<C: Clock = SystemClock> {
    vocabulary: Arc<Vocabulary>,
    experience_locator: SectionLocator,
    title_locator: SectionLocator,
    scanner: DateRangeScanner,
    clock: C,
}

impl FactExtractor<SystemClock> {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self::with_clock(vocabulary, SystemClock)
    }
}

impl<C: Clock> FactExtractor<C> {
    pub fn with_clock(vocabulary: Arc<Vocabulary>, clock: C) -> Self {
        Self {
            experience_locator: SectionLocator::new("experience", &vocabulary.experience_section),
            title_locator: SectionLocator::new("job titles", &vocabulary.title_section),
            scanner: DateRangeScanner::new(),
            vocabulary,
            clock,
        }
    }

    /// Blank text is refused; everything else yields a result, with defaults for missing facts.
    pub fn extract(&self, text: &PlainText) -> Result<ExtractionResult, ExtractError> {
        if text.is_blank() {
            return Err(ExtractError::ExtractionFailed(
                "document contains no text".to_string(),
            ));
        }

        let today = self.clock.today();
        let content = text.as_str();
        let lowered = content.to_lowercase();
        let lines = text.lines();

        let skills = self.extract_skills(&lowered);
        let experience = self.estimate_experience(&lines, today);
        let education = self.detect_education(&lowered);
        let job_titles = self.extract_job_titles(&lines);

        tracing::info!(
            "Extracted {} skills, experience '{}', education '{}', titles {:?}",
            skills.len(),
            experience,
            education,
            job_titles
        );

        Ok(ExtractionResult {
            skills,
            experience,
            education,
            job_titles,
            raw_text_preview: content.chars().take(PREVIEW_CHARS).collect(),
        })
    }

    // --- Skills ---

    fn extract_skills(&self, lowered: &str) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();
        for skill in self.vocabulary.skills() {
            if skills.len() == MAX_SKILLS {
                break;
            }
            let needle = skill.trim().to_lowercase();
            if needle.is_empty() {
                continue;
            }
            let already_seen = skills.iter().any(|s| s.eq_ignore_ascii_case(skill));
            if !already_seen && lowered.contains(&needle) {
                skills.push(skill.to_string());
            }
        }

        if skills.is_empty() {
            tracing::debug!("No vocabulary skills matched; using fallback");
            skills.push(FALLBACK_SKILL.to_string());
        }
        skills
    }

    // --- Experience ---

    /// Only dates inside the Experience section count. No section means "0".
    pub fn estimate_experience(&self, lines: &[&str], today: YearMonth) -> ExperienceEstimate {
        let span = self.experience_locator.locate(lines);
        let Some(section_text) = span.text(lines) else {
            return ExperienceEstimate::None;
        };
        tracing::trace!("Experience section text:\n{}", section_text);

        let total_months = self.scanner.scan(&section_text, today);
        let estimate = ExperienceEstimate::from_months(total_months);
        tracing::debug!(
            "Experience: {} months = {:.1} years -> '{}'",
            total_months,
            total_months as f64 / 12.0,
            estimate
        );
        estimate
    }

    // --- Education ---

    fn detect_education(&self, lowered: &str) -> Education {
        let keywords = &self.vocabulary.education;
        let tiers = [
            (Education::PhD, &keywords.phd),
            (Education::Masters, &keywords.masters),
            (Education::Bachelors, &keywords.bachelors),
            (Education::Diploma, &keywords.diploma),
        ];

        tiers
            .into_iter()
            .find(|(_, words)| {
                words.iter().any(|w| {
                    let needle = w.trim().to_lowercase();
                    !needle.is_empty() && lowered.contains(&needle)
                })
            })
            .map(|(level, _)| level)
            .unwrap_or(Education::NotSpecified)
    }

    // --- Job Titles ---

    fn extract_job_titles(&self, lines: &[&str]) -> Vec<String> {
        let span = self.title_locator.locate(lines);
        let section_text = span.text(lines).map(|t| t.to_lowercase()).unwrap_or_default();

        let mut titles: Vec<String> = Vec::new();
        for title in &self.vocabulary.job_titles {
            if titles.len() == MAX_JOB_TITLES {
                break;
            }
            let needle = title.to_lowercase();
            if needle.is_empty() || !section_text.contains(&needle) {
                continue;
            }
            let cased = title_case(&needle);
            if !titles.contains(&cased) {
                titles.push(cased);
            }
        }

        if titles.is_empty() {
            titles.push(FALLBACK_JOB_TITLE.to_string());
        }
        titles
    }
}

/// Uppercases the first letter of every alphabetic run ("technical researcher" -> "Technical Researcher").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
