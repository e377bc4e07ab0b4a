//! Typed resume model loaded from JSON.
//!
//! The schema is deliberately forgiving: every field is optional, `skills`
//! may be a flat list or a map of category to description, and `education`
//! may be a single record or a list.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ResumeError
// ---------------------------------------------------------------------------

/// Errors raised while loading the resume dataset.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("failed to read resume file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse resume JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// A JSON value that may appear either bare or wrapped in an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Borrow the contents as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_ref(item),
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

/// Skills either as a plain list or as category → comma separated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    List(Vec<String>),
    Categorized(BTreeMap<String, String>),
}

impl Default for Skills {
    fn default() -> Self {
        Skills::List(Vec::new())
    }
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        match self {
            Skills::List(items) => items.is_empty(),
            Skills::Categorized(map) => map.is_empty(),
        }
    }

    /// One display line per skill or per category (`"Data storage: MySQL, …"`).
    pub fn lines(&self) -> Vec<String> {
        match self {
            Skills::List(items) => items.clone(),
            Skills::Categorized(map) => map
                .iter()
                .map(|(category, value)| format!("{}: {value}", humanize_key(category)))
                .collect(),
        }
    }
}

/// `"dataStorage"` → `"Data storage"`.
pub(crate) fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else if c == '_' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    pub position: Option<String>,
    pub url: Option<OneOrMany<String>>,
    pub achievements: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub location: String,
    pub period: String,
    pub position: String,
    pub description: String,
    pub achievements: Vec<String>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    #[serde(alias = "school")]
    pub institution: String,
    pub location: String,
    pub degree: String,
    pub year: Option<String>,
    pub concentration: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub drupal: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityEngagement {
    pub position: String,
    pub period: String,
    pub description: Option<String>,
    pub achievements: Vec<String>,
}

/// A fixed question with its canned answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ResumeData
// ---------------------------------------------------------------------------

/// The complete resume dataset for one person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub name: String,
    pub title: String,
    pub location: String,
    pub summary: String,
    pub skills: Skills,
    pub certifications: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: OneOrMany<EducationEntry>,
    pub contact: Option<Contact>,
    #[serde(alias = "drupalContributions")]
    pub contributions: Vec<String>,
    pub community_engagement: Option<CommunityEngagement>,
    /// Hand-written Q&A pairs. When empty, [`ResumeData::qa_pairs`] derives
    /// a set from the other fields.
    pub qa_pairs: Vec<QaPair>,
}

impl ResumeData {
    /// Read and parse a resume JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ResumeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ResumeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ResumeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Stand-in used when the dataset cannot be loaded, so the app still
    /// answers (with apologies) instead of failing to start.
    pub fn placeholder() -> Self {
        Self {
            name: "Error Loading Data".into(),
            title: "Resume data could not be loaded".into(),
            ..Self::default()
        }
    }

    /// The Q&A pairs used for keyword matching and as search documents.
    pub fn qa_pairs(&self) -> Vec<QaPair> {
        if self.qa_pairs.is_empty() {
            self.derived_qa_pairs()
        } else {
            self.qa_pairs.clone()
        }
    }

    fn derived_qa_pairs(&self) -> Vec<QaPair> {
        let mut pairs = Vec::new();
        if !self.name.is_empty() {
            pairs.push(QaPair::new("What is your name?", self.name.clone()));
        }
        if !self.title.is_empty() {
            let mut answer = format!("I am a {}", self.title);
            if !self.summary.is_empty() {
                answer.push_str(". ");
                answer.push_str(&self.summary);
            }
            answer.push('.');
            pairs.push(QaPair::new("What do you do?", answer));
        }
        if !self.skills.is_empty() {
            pairs.push(QaPair::new(
                "What are your skills?",
                format!("My key skills include: {}.", self.skills.lines().join(", ")),
            ));
        }
        if !self.contributions.is_empty() {
            pairs.push(QaPair::new(
                "Tell me about your Drupal contributions.",
                format!(
                    "My Drupal contributions include: {}.",
                    self.contributions.join(", ")
                ),
            ));
        }
        if let Some(current) = self.experience.first() {
            pairs.push(QaPair::new(
                "Where do you work?",
                format!("I currently work at {}.", current.company),
            ));
            let companies: Vec<&str> =
                self.experience.iter().map(|e| e.company.as_str()).collect();
            pairs.push(QaPair::new(
                "Tell me about your experience.",
                format!(
                    "I have worked at several companies, including {}. Most recently at {} since {}.",
                    companies.join(", "),
                    current.company,
                    current.period
                ),
            ));
            if !current.projects.is_empty() {
                let projects: Vec<&str> =
                    current.projects.iter().map(|p| p.name.as_str()).collect();
                pairs.push(QaPair::new(
                    "What projects have you worked on?",
                    format!("I've worked on numerous projects, including {}.", projects.join(", ")),
                ));
            }
        }
        if let Some(edu) = self.education.as_slice().first() {
            let mut answer = format!("I have a {} from {}", edu.degree, edu.institution);
            if let Some(year) = &edu.year {
                answer.push_str(&format!(", graduated in {year}"));
            }
            answer.push('.');
            pairs.push(QaPair::new("What is your education?", answer));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "name": "Ada Example",
        "title": "Staff Engineer",
        "skills": { "frameworks": "Axum, Actix", "dataStorage": "Postgres, Redis" },
        "certifications": ["Certified Scrum Master"],
        "experience": [
            { "company": "Acme", "period": "2020 - Present", "position": "Lead",
              "projects": [ { "name": "Rocket", "url": "https://acme.test" } ] }
        ],
        "education": { "school": "State University", "degree": "BSc", "year": "2010" },
        "drupalContributions": ["Core patch"]
    }"#;

    #[test]
    fn parses_categorized_skills_and_single_education() {
        let data = ResumeData::from_json(SAMPLE).unwrap();
        assert!(matches!(data.skills, Skills::Categorized(_)));
        assert_eq!(
            data.skills.lines(),
            vec!["Data storage: Postgres, Redis", "Frameworks: Axum, Actix"]
        );
        assert!(matches!(data.education, OneOrMany::One(_)));
        assert_eq!(data.education.as_slice()[0].institution, "State University");
        assert_eq!(data.contributions, vec!["Core patch"]);
        let url = data.experience[0].projects[0].url.as_ref().unwrap();
        assert_eq!(url.as_slice(), ["https://acme.test".to_string()]);
    }

    #[test]
    fn parses_list_skills_and_education_array() {
        let data = ResumeData::from_json(
            r#"{ "skills": ["Rust", "Go"],
                 "education": [ { "institution": "MIT", "degree": "PhD" } ] }"#,
        )
        .unwrap();
        assert_eq!(data.skills, Skills::List(vec!["Rust".into(), "Go".into()]));
        assert!(matches!(data.education, OneOrMany::Many(ref v) if v.len() == 1));
    }

    #[test]
    fn derived_qa_pairs_when_none_supplied() {
        let data = ResumeData::from_json(SAMPLE).unwrap();
        let pairs = data.qa_pairs();
        assert_eq!(pairs[0], QaPair::new("What is your name?", "Ada Example"));
        assert!(pairs.iter().any(|p| p.question == "Where do you work?"
            && p.answer == "I currently work at Acme."));
        assert!(pairs
            .iter()
            .any(|p| p.answer == "I have a BSc from State University, graduated in 2010."));
    }

    #[test]
    fn explicit_qa_pairs_take_precedence() {
        let data = ResumeData::from_json(
            r#"{ "name": "Ada", "qaPairs": [ { "question": "Q?", "answer": "A." } ] }"#,
        )
        .unwrap();
        assert_eq!(data.qa_pairs(), vec![QaPair::new("Q?", "A.")]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempdir().expect("temp dir");
        let err = ResumeData::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ResumeError::Io { .. }));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("resume.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let data = ResumeData::load(&path).unwrap();
        assert_eq!(data.name, "Ada Example");
    }

    #[test]
    fn placeholder_names_the_failure() {
        let data = ResumeData::placeholder();
        assert_eq!(data.name, "Error Loading Data");
        assert!(data.experience.is_empty());
    }

    #[test]
    fn humanize_camel_case() {
        assert_eq!(humanize_key("systemArchitecture"), "System architecture");
        assert_eq!(humanize_key("security"), "Security");
    }
}
