// src/extractors/result.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of skills kept per document.
pub const MAX_SKILLS: usize = 25;
/// Maximum number of job titles kept per document.
pub const MAX_JOB_TITLES: usize = 3;
/// Characters of document text kept in the preview.
pub const PREVIEW_CHARS: usize = 1000;

pub const FALLBACK_SKILL: &str = "Professional skills";
pub const FALLBACK_JOB_TITLE: &str = "Professional";

const ACHIEVEMENTS_PLACEHOLDER: &str = "Extracted from CV";
const INDUSTRIES_PLACEHOLDER: &str = "Technology, Software Development";

// --- Experience ---

/// Bucketed years of experience. The string form is what downstream prompts see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ExperienceEstimate {
    /// "0"
    None,
    /// "0 (N months)", N in 1..=6
    Months(u32),
    /// "0-1"
    UnderOneYear,
    /// "1"
    OneYear,
    /// "N", N >= 2
    Years(u32),
}

impl ExperienceEstimate {
    pub fn from_months(total_months: u32) -> Self {
        if total_months == 0 {
            return ExperienceEstimate::None;
        }
        let years = total_months as f64 / 12.0;
        if years < 1.0 {
            if total_months <= 6 {
                ExperienceEstimate::Months(total_months)
            } else {
                ExperienceEstimate::UnderOneYear
            }
        } else if years < 2.0 {
            ExperienceEstimate::OneYear
        } else {
            // Half-way values round to even: 30 months -> "2", 42 months -> "4".
            ExperienceEstimate::Years(years.round_ties_even() as u32)
        }
    }
}

impl fmt::Display for ExperienceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceEstimate::None => write!(f, "0"),
            ExperienceEstimate::Months(months) => write!(f, "0 ({} months)", months),
            ExperienceEstimate::UnderOneYear => write!(f, "0-1"),
            ExperienceEstimate::OneYear => write!(f, "1"),
            ExperienceEstimate::Years(years) => write!(f, "{}", years),
        }
    }
}

impl FromStr for ExperienceEstimate {
    type Err = String;

    /// Accepts exactly the strings `Display` produces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let estimate = match s {
            "0" => ExperienceEstimate::None,
            "0-1" => ExperienceEstimate::UnderOneYear,
            "1" => ExperienceEstimate::OneYear,
            _ => match s.strip_prefix("0 (").and_then(|rest| rest.strip_suffix(" months)")) {
                Some(months) => match months.parse::<u32>() {
                    Ok(months @ 1..=6) => ExperienceEstimate::Months(months),
                    _ => return Err(format!("Invalid month count in '{}'", s)),
                },
                None => match s.parse::<u32>() {
                    Ok(years) if years >= 2 => ExperienceEstimate::Years(years),
                    _ => return Err(format!("Unrecognized experience bucket '{}'", s)),
                },
            },
        };

        // Rejects "+3", "007" and padded forms the parser would otherwise accept.
        if estimate.to_string() != s {
            return Err(format!("Non-canonical experience bucket '{}'", s));
        }
        Ok(estimate)
    }
}

impl From<ExperienceEstimate> for String {
    fn from(estimate: ExperienceEstimate) -> Self {
        estimate.to_string()
    }
}

impl TryFrom<String> for ExperienceEstimate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// --- Education ---

/// Highest education level detected, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    PhD,
    Masters,
    Bachelors,
    Diploma,
    NotSpecified,
}

impl Education {
    pub fn label(&self) -> &'static str {
        match self {
            Education::PhD => "PhD",
            Education::Masters => "Master's Degree",
            Education::Bachelors => "Bachelor's Degree",
            Education::Diploma => "Diploma",
            Education::NotSpecified => "Not specified",
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Result ---

/// Structured facts recovered from one résumé.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub skills: Vec<String>,
    pub experience: ExperienceEstimate,
    pub education: Education,
    pub job_titles: Vec<String>,
    pub raw_text_preview: String,
}

impl ExtractionResult {
    pub fn to_profile_record(&self) -> ProfileRecord {
        ProfileRecord::from(self)
    }
}

/// Flat string mapping handed to the job-matching prompt. Field names are part of that contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub skills: String,
    pub experience_years: String,
    pub education: String,
    pub job_titles: String,
    pub achievements: String,
    pub industries: String,
    pub raw_text: String,
}

impl From<&ExtractionResult> for ProfileRecord {
    fn from(result: &ExtractionResult) -> Self {
        Self {
            skills: result.skills.join(", "),
            experience_years: result.experience.to_string(),
            education: result.education.to_string(),
            job_titles: result.job_titles.join(", "),
            achievements: ACHIEVEMENTS_PLACEHOLDER.to_string(),
            industries: INDUSTRIES_PLACEHOLDER.to_string(),
            raw_text: result.raw_text_preview.clone(),
        }
    }
}
