//! Resume dataset: typed model, Q&A pairs and search documents.

pub mod data;
pub mod documents;

pub use data::{
    CommunityEngagement, Contact, EducationEntry, Experience, OneOrMany, Project, QaPair,
    ResumeData, ResumeError, Skills,
};
pub use documents::{ResumeDocument, QA_SOURCE};
