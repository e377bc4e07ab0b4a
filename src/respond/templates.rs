//! Templated answers rendered from resume fields, one per [`Topic`].

use crate::resume::{OneOrMany, ResumeData};

use super::intent::Topic;

/// Spoken when no search hit, Q&A pair or topic matches.
pub const DEFAULT_RESPONSE: &str = "I'm not sure how to respond to that. Could you ask me about \
my experience, skills, education, certifications, or contact information?";

fn bullets(items: impl IntoIterator<Item = String>) -> String {
    items
        .into_iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `https://www.example.com/` → `www.example.com/`.
fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

/// Render the answer for `topic`.
pub fn render(topic: Topic, resume: &ResumeData) -> String {
    match topic {
        Topic::Greeting => format!(
            "Hello! I'm {}, {}. How can I help you today?",
            resume.name, resume.title
        ),
        Topic::Name => format!("My name is {}.", resume.name),
        Topic::Summary => {
            if resume.summary.is_empty() {
                format!(
                    "I'm {}, a {} with experience in the tech industry.",
                    resume.name, resume.title
                )
            } else {
                resume.summary.clone()
            }
        }
        Topic::Experience => experience(resume),
        Topic::Skills => {
            if resume.skills.is_empty() {
                "I have a variety of technical skills.".into()
            } else {
                format!("My key skills include:\n{}", bullets(resume.skills.lines()))
            }
        }
        Topic::Education => education(resume),
        Topic::Contact => contact(resume),
        Topic::Certifications => {
            if resume.certifications.is_empty() {
                "I have various professional certifications.".into()
            } else {
                format!(
                    "My certifications include:\n{}",
                    bullets(resume.certifications.iter().cloned())
                )
            }
        }
        Topic::Contributions => {
            if resume.contributions.is_empty() {
                "I have experience with Drupal.".into()
            } else {
                format!(
                    "My Drupal contributions include:\n{}",
                    bullets(resume.contributions.iter().cloned())
                )
            }
        }
        Topic::CommunityEngagement => community(resume),
        Topic::Location => {
            if resume.location.is_empty() {
                "I prefer not to disclose my exact location.".into()
            } else {
                format!("I'm located in {}.", resume.location)
            }
        }
        Topic::Unknown => DEFAULT_RESPONSE.into(),
    }
}

fn experience(resume: &ResumeData) -> String {
    if resume.experience.is_empty() {
        return "I have professional experience in the tech industry.".into();
    }
    let lines = resume.experience.iter().map(|job| {
        let mut line = job.company.clone();
        if !job.location.is_empty() {
            line.push_str(&format!(", {}", job.location));
        }
        if !job.period.is_empty() {
            line.push_str(&format!(" ({})", job.period));
        }
        if !job.position.is_empty() {
            line.push_str(&format!(" - {}", job.position));
        }
        line
    });
    format!("My professional experience includes:\n{}", bullets(lines))
}

fn education(resume: &ResumeData) -> String {
    match &resume.education {
        OneOrMany::One(edu) => {
            let mut answer = format!("I have a {} from {}", edu.degree, edu.institution);
            if let Some(year) = &edu.year {
                answer.push_str(&format!(", graduating in {year}"));
            }
            answer.push('.');
            answer
        }
        // Only the first listed entry is spoken.
        OneOrMany::Many(entries) => match entries.first() {
            Some(edu) => {
                let mut sentence =
                    format!("I studied at {} and earned a {}", edu.institution, edu.degree);
                if let Some(year) = &edu.year {
                    sentence.push_str(&format!(" in {year}"));
                }
                sentence.push('.');
                sentence
            }
            None => "I have a degree in a technology-related field.".into(),
        },
    }
}

fn contact(resume: &ResumeData) -> String {
    let Some(contact) = &resume.contact else {
        return "Contact information is not available.".into();
    };

    let fields = [
        ("Email", &contact.email, false),
        ("Phone", &contact.phone, false),
        ("LinkedIn", &contact.linkedin, true),
        ("GitHub", &contact.github, true),
        ("Drupal", &contact.drupal, true),
        ("Website", &contact.website, true),
    ];
    let lines: Vec<String> = fields
        .iter()
        .filter_map(|(label, value, is_url)| {
            let value = value.as_deref().filter(|v| !v.is_empty())?;
            let value = if *is_url { strip_scheme(value) } else { value };
            Some(format!("{label}: {value}"))
        })
        .collect();

    if lines.is_empty() {
        return "Contact information is not available.".into();
    }
    format!("You can reach me at:\n{}", lines.join("\n"))
}

fn community(resume: &ResumeData) -> String {
    let Some(engagement) = &resume.community_engagement else {
        return "I am engaged with the tech community.".into();
    };

    let mut answer = format!(
        "I work as a {} ({}).",
        engagement.position, engagement.period
    );
    if let Some(description) = engagement.description.as_deref().filter(|d| !d.is_empty()) {
        answer.push_str("\n\n");
        answer.push_str(description);
    }
    if !engagement.achievements.is_empty() {
        answer.push_str("\n\nKey achievements:\n");
        answer.push_str(&bullets(engagement.achievements.iter().cloned()));
    }
    answer
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
