//! Splits a [`ResumeData`] into short, self-contained text fragments for the
//! similarity search index.

use super::data::ResumeData;

/// Source tag carried by documents built from Q&A pairs.
pub const QA_SOURCE: &str = "QA Pair";

/// A text fragment and the resume section it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    pub text: String,
    pub source: String,
}

impl ResumeDocument {
    fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

impl ResumeData {
    /// Every fragment worth embedding: resume sections followed by one
    /// `"Q: … A: …"` document per Q&A pair.
    pub fn documents(&self) -> Vec<ResumeDocument> {
        let mut docs = self.section_documents();
        docs.extend(self.qa_pairs().into_iter().map(|qa| {
            ResumeDocument::new(format!("Q: {} A: {}", qa.question, qa.answer), QA_SOURCE)
        }));
        docs
    }

    fn section_documents(&self) -> Vec<ResumeDocument> {
        let mut docs = Vec::new();

        if !self.name.is_empty() && !self.title.is_empty() {
            docs.push(ResumeDocument::new(
                format!("My name is {}. I am a {}.", self.name, self.title),
                "Basic Info",
            ));
        }

        if !self.summary.is_empty() {
            docs.push(ResumeDocument::new(self.summary.clone(), "Summary"));
        }

        if !self.skills.is_empty() {
            let lines = self.skills.lines();
            docs.push(ResumeDocument::new(
                format!("My skills include: {}", lines.join(", ")),
                "Skills",
            ));
            docs.extend(lines.into_iter().map(|line| ResumeDocument::new(line, "Skill")));
        }

        if !self.contributions.is_empty() {
            docs.push(ResumeDocument::new(
                format!(
                    "My Drupal contributions include: {}",
                    self.contributions.join(", ")
                ),
                "Drupal Contributions",
            ));
            docs.extend(
                self.contributions
                    .iter()
                    .map(|c| ResumeDocument::new(c.clone(), "Drupal Contribution")),
            );
        }

        if let Some(ce) = &self.community_engagement {
            docs.push(ResumeDocument::new(
                format!(
                    "I work as a {} ({}). {}",
                    ce.position,
                    ce.period,
                    ce.description.as_deref().unwrap_or("")
                )
                .trim_end()
                .to_string(),
                "Community Engagement",
            ));
            docs.extend(ce.achievements.iter().map(|a| {
                ResumeDocument::new(a.clone(), "Community Engagement Achievement")
            }));
        }

        for exp in &self.experience {
            let source = format!("Experience at {}", exp.company);
            docs.push(ResumeDocument::new(
                format!(
                    "I worked as {} at {} during {}.",
                    exp.position, exp.company, exp.period
                ),
                source.clone(),
            ));
            docs.extend(
                exp.achievements
                    .iter()
                    .map(|a| ResumeDocument::new(a.clone(), source.clone())),
            );

            let project_source = format!("Project at {}", exp.company);
            for project in &exp.projects {
                docs.push(ResumeDocument::new(
                    format!(
                        "Project: {} - {}",
                        project.name,
                        project.position.as_deref().unwrap_or("")
                    ),
                    project_source.clone(),
                ));
                if let Some(urls) = &project.url {
                    docs.extend(urls.as_slice().iter().map(|url| {
                        ResumeDocument::new(
                            format!("URL for {}: {url}", project.name),
                            project_source.clone(),
                        )
                    }));
                }
                let detail_source = format!("Project {} at {}", project.name, exp.company);
                docs.extend(
                    project
                        .achievements
                        .iter()
                        .chain(project.notes.iter())
                        .map(|text| ResumeDocument::new(text.clone(), detail_source.clone())),
                );
            }
        }

        for edu in self.education.as_slice() {
            let mut text = format!("I have a {} from {}", edu.degree, edu.institution);
            if let Some(year) = &edu.year {
                text.push_str(&format!(", graduated in {year}"));
            }
            for extra in edu.concentration.iter().chain(edu.notes.iter()) {
                text.push_str(". ");
                text.push_str(extra);
            }
            docs.push(ResumeDocument::new(text, "Education"));
        }

        if !self.certifications.is_empty() {
            docs.push(ResumeDocument::new(
                format!(
                    "My certifications include: {}",
                    self.certifications.join(", ")
                ),
                "Certifications",
            ));
            docs.extend(
                self.certifications
                    .iter()
                    .map(|c| ResumeDocument::new(c.clone(), "Certification")),
            );
        }

        if let Some(contact) = &self.contact {
            let fields = [
                ("Email", &contact.email),
                ("Phone", &contact.phone),
                ("LinkedIn", &contact.linkedin),
                ("Drupal.org", &contact.drupal),
            ];
            let parts: Vec<String> = fields
                .iter()
                .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}: {v}")))
                .collect();
            if !parts.is_empty() {
                docs.push(ResumeDocument::new(
                    format!("Contact information: {}", parts.join(", ")),
                    "Contact",
                ));
            }
        }

        docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::{Contact, Experience, Project, QaPair, Skills};

    fn sample() -> ResumeData {
        ResumeData {
            name: "Ada".into(),
            title: "Engineer".into(),
            summary: "Builds things.".into(),
            skills: Skills::List(vec!["Rust".into(), "SQL".into()]),
            certifications: vec!["CSM".into()],
            experience: vec![Experience {
                company: "Acme".into(),
                period: "2020".into(),
                position: "Lead".into(),
                projects: vec![Project {
                    name: "Rocket".into(),
                    achievements: vec!["Launched it".into()],
                    ..Project::default()
                }],
                ..Experience::default()
            }],
            contact: Some(Contact {
                email: Some("ada@example.com".into()),
                ..Contact::default()
            }),
            qa_pairs: vec![QaPair::new("Who?", "Ada.")],
            ..ResumeData::default()
        }
    }

    #[test]
    fn sections_are_tagged_with_their_source() {
        let docs = sample().documents();
        let sources: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources[0], "Basic Info");
        assert!(sources.contains(&"Summary"));
        assert!(sources.contains(&"Skills"));
        assert_eq!(sources.iter().filter(|s| **s == "Skill").count(), 2);
        assert!(sources.contains(&"Experience at Acme"));
        assert!(sources.contains(&"Project at Acme"));
        assert!(sources.contains(&"Project Rocket at Acme"));
        assert!(sources.contains(&"Certifications"));
        assert!(sources.contains(&"Certification"));
    }

    #[test]
    fn qa_documents_come_last() {
        let docs = sample().documents();
        let last = docs.last().unwrap();
        assert_eq!(last.source, QA_SOURCE);
        assert_eq!(last.text, "Q: Who? A: Ada.");
    }

    #[test]
    fn contact_document_uses_marker_prefix() {
        let docs = sample().documents();
        let contact = docs.iter().find(|d| d.source == "Contact").unwrap();
        assert_eq!(contact.text, "Contact information: Email: ada@example.com");
    }

    #[test]
    fn empty_resume_yields_no_documents() {
        let docs = ResumeData::default().documents();
        assert!(docs.is_empty());
    }
}
