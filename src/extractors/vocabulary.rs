// src/extractors/vocabulary.rs
use crate::extractors::section::{MatchMode, SectionRule};
use crate::utils::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// --- Default Tables ---

const TECHNICAL_SKILLS: &[&str] = &[
    "Python", "Java", "JavaScript", "C++", "C#", "SQL", "HTML", "CSS",
    "React", "Angular", "Vue", "Node.js", "Django", "Flask", "Spring",
    "MongoDB", "PostgreSQL", "MySQL", "AWS", "Azure", "GCP", "Docker",
    "Kubernetes", "Git", "Jenkins", "Agile", "Scrum", "REST API",
    "Machine Learning", "Data Analysis", "Excel", "PowerPoint", "Tableau",
    "Power BI", "Pandas", "NumPy", "TensorFlow", "Scikit-learn", "PHP",
    "Bootstrap", "Cisco", "OOP", "Full Stack", "Web Development", "NoSQL",
    "SQLite", "Plotly", "SMOTE", "SVM", "Random Forest", "K-Means", "DBSCAN",
];

const SOFT_SKILLS: &[&str] = &[
    "Communication", "Leadership", "Teamwork", "Problem Solving",
    "Critical Thinking", "Time Management", "Project Management",
];

const EXPERIENCE_HEADINGS: &[&str] = &[
    "EXPERIENCE", "WORK EXPERIENCE", "PROFESSIONAL EXPERIENCE",
    "EMPLOYMENT HISTORY", "CAREER HISTORY", "WORK HISTORY",
];

const EXPERIENCE_STOP_HEADINGS: &[&str] = &[
    "PROJECTS", "PERSONAL PROJECTS", "GROUP PROJECTS",
    "EDUCATION", "ACADEMIC", "QUALIFICATION",
    "SKILLS", "TECHNICAL SKILLS", "CORE COMPETENCIES",
    "CERTIFICATIONS", "CERTIFICATES", "TRAINING",
    "ACHIEVEMENTS", "AWARDS", "HONORS",
    "PUBLICATIONS", "RESEARCH",
    "REFERENCES", "HOBBIES", "INTERESTS",
];

// Job titles use a looser, substring-based section rule.
const TITLE_HEADINGS: &[&str] = &["EXPERIENCE"];
const TITLE_STOP_HEADINGS: &[&str] = &["PROJECT", "EDUCATION", "SKILL", "CERTIFICATION"];

const JOB_TITLES: &[&str] = &[
    "technical researcher", "research", "engineer", "developer",
    "analyst", "manager", "consultant", "specialist",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// --- Data Structures ---

/// Keywords per education tier. Tiers are checked PhD first, Diploma last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationKeywords {
    pub phd: Vec<String>,
    pub masters: Vec<String>,
    pub bachelors: Vec<String>,
    pub diploma: Vec<String>,
}

impl Default for EducationKeywords {
    fn default() -> Self {
        Self {
            phd: owned(&["phd", "ph.d", "doctorate", "doctoral"]),
            masters: owned(&["master", "m.sc", "m.tech", "m.a", "mba", "mca", "postgraduate"]),
            bachelors: owned(&["bachelor", "b.sc", "b.tech", "b.a", "b.e", "bca", "undergraduate"]),
            diploma: owned(&["diploma", "associate"]),
        }
    }
}

/// Immutable keyword and heading configuration consumed by `FactExtractor`.
///
/// Any field left out of a JSON override keeps its built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub education: EducationKeywords,
    pub job_titles: Vec<String>,
    /// Bounds of the section whose dates count toward experience.
    pub experience_section: SectionRule,
    /// Bounds of the section searched for job titles.
    pub title_section: SectionRule,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            technical_skills: owned(TECHNICAL_SKILLS),
            soft_skills: owned(SOFT_SKILLS),
            education: EducationKeywords::default(),
            job_titles: owned(JOB_TITLES),
            experience_section: SectionRule::new(
                EXPERIENCE_HEADINGS,
                EXPERIENCE_STOP_HEADINGS,
                MatchMode::Prefix,
            ),
            title_section: SectionRule::new(TITLE_HEADINGS, TITLE_STOP_HEADINGS, MatchMode::Contains),
        }
    }
}

impl Vocabulary {
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid vocabulary JSON: {}", e)))
    }

    /// Loads an override file. Fields missing from the file fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read vocabulary file '{}': {}", path.display(), e))
        })?;
        let vocabulary = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded vocabulary from {} ({} technical, {} soft skills, {} titles)",
            path.display(),
            vocabulary.technical_skills.len(),
            vocabulary.soft_skills.len(),
            vocabulary.job_titles.len()
        );
        Ok(vocabulary)
    }

    /// Technical skills first, then soft skills.
    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.technical_skills
            .iter()
            .chain(self.soft_skills.iter())
            .map(String::as_str)
    }
}
