//! Editing operations behind the builder forms.
//!
//! Each function mutates the document in place and fails without touching it
//! when the target field, index or skill group does not exist.

use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::json_resume::url::strip_protocol;
use crate::models::resume::{
    Education, Project, ResumeData, Skill, SkillGroup, SocialMedia, WorkExperience,
};

/// Object-array sections, named as the forms name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    WorkExperience,
    Education,
    Projects,
    SocialMedia,
}

/// Sections whose items are plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringList {
    Languages,
    Certifications,
}

/// Either kind of list section, as it appears in a route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListSection {
    Objects(Section),
    Strings(StringList),
}

impl ListSection {
    pub fn parse(name: &str) -> Result<Self, AppError> {
        serde_json::from_value(Value::String(name.to_string()))
            .map_err(|_| AppError::NotFound(format!("Unknown section '{name}'")))
    }
}

fn as_text(field: &str, value: &Value) -> Result<String, AppError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(format!("'{field}' expects a string value")))
}

fn as_bool(field: &str, value: &Value) -> Result<bool, AppError> {
    value
        .as_bool()
        .ok_or_else(|| AppError::Validation(format!("'{field}' expects a boolean value")))
}

fn unknown_field(field: &str) -> AppError {
    AppError::Validation(format!("Unknown field '{field}'"))
}

fn out_of_range(what: &str, index: usize) -> AppError {
    AppError::NotFound(format!("No {what} at index {index}"))
}

/// Stored links never carry a protocol; the preview and exports add one back.
fn as_link(field: &str, value: &Value) -> Result<String, AppError> {
    Ok(strip_protocol(as_text(field, value)?.trim()).to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Scalar fields
// ────────────────────────────────────────────────────────────────────────────

/// Sets a top-level scalar field by its form input name.
pub fn set_field(doc: &mut ResumeData, field: &str, value: &Value) -> Result<(), AppError> {
    match field {
        "name" => doc.name = as_text(field, value)?,
        "position" => doc.position = as_text(field, value)?,
        "contactInformation" => doc.contact_information = as_text(field, value)?,
        "email" => doc.email = as_text(field, value)?,
        "address" => doc.address = as_text(field, value)?,
        "calendarLink" => doc.calendar_link = as_text(field, value)?,
        "summary" => doc.summary = as_text(field, value)?,
        "content" => doc.content = as_text(field, value)?,
        "showSummary" => doc.show_summary = as_bool(field, value)?,
        "showEducationDates" => doc.show_education_dates = as_bool(field, value)?,
        "showLanguages" => doc.show_languages = as_bool(field, value)?,
        _ => return Err(unknown_field(field)),
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Object-array sections
// ────────────────────────────────────────────────────────────────────────────

pub fn add_item(doc: &mut ResumeData, section: Section) {
    match section {
        Section::WorkExperience => doc.work_experience.push(WorkExperience::default()),
        Section::Education => doc.education.push(Education::default()),
        Section::Projects => doc.projects.push(Project::default()),
        Section::SocialMedia => doc.social_media.push(SocialMedia::default()),
    }
}

pub fn remove_item(doc: &mut ResumeData, section: Section, index: usize) -> Result<(), AppError> {
    fn remove_at<T>(items: &mut Vec<T>, index: usize, what: &str) -> Result<(), AppError> {
        if index >= items.len() {
            return Err(out_of_range(what, index));
        }
        items.remove(index);
        Ok(())
    }

    match section {
        Section::WorkExperience => remove_at(&mut doc.work_experience, index, "work experience"),
        Section::Education => remove_at(&mut doc.education, index, "education entry"),
        Section::Projects => remove_at(&mut doc.projects, index, "project"),
        Section::SocialMedia => remove_at(&mut doc.social_media, index, "social media link"),
    }
}

/// Sets one field of one item. `url`/`link` fields are stored without protocol.
pub fn update_item(
    doc: &mut ResumeData,
    section: Section,
    index: usize,
    field: &str,
    value: &Value,
) -> Result<(), AppError> {
    match section {
        Section::WorkExperience => {
            let job = doc
                .work_experience
                .get_mut(index)
                .ok_or_else(|| out_of_range("work experience", index))?;
            match field {
                "company" => job.company = as_text(field, value)?,
                "url" => job.url = as_link(field, value)?,
                "position" => job.position = as_text(field, value)?,
                "description" => job.description = as_text(field, value)?,
                "keyAchievements" => job.key_achievements = as_text(field, value)?,
                "startYear" => job.start_year = as_text(field, value)?,
                "endYear" => job.end_year = as_text(field, value)?,
                "technologies" => job.technologies = as_tag_list(field, value)?,
                _ => return Err(unknown_field(field)),
            }
        }
        Section::Education => {
            let edu = doc
                .education
                .get_mut(index)
                .ok_or_else(|| out_of_range("education entry", index))?;
            match field {
                "school" => edu.school = as_text(field, value)?,
                "url" => edu.url = as_link(field, value)?,
                "degree" => edu.degree = as_text(field, value)?,
                "startYear" => edu.start_year = as_text(field, value)?,
                "endYear" => edu.end_year = as_text(field, value)?,
                _ => return Err(unknown_field(field)),
            }
        }
        Section::Projects => {
            let project = doc
                .projects
                .get_mut(index)
                .ok_or_else(|| out_of_range("project", index))?;
            match field {
                "name" => project.name = as_text(field, value)?,
                "link" => project.link = as_link(field, value)?,
                "description" => project.description = as_text(field, value)?,
                "keyAchievements" => project.key_achievements = as_text(field, value)?,
                "startYear" => project.start_year = as_text(field, value)?,
                "endYear" => project.end_year = as_text(field, value)?,
                _ => return Err(unknown_field(field)),
            }
        }
        Section::SocialMedia => {
            let social = doc
                .social_media
                .get_mut(index)
                .ok_or_else(|| out_of_range("social media link", index))?;
            match field {
                "socialMedia" => social.social_media = as_text(field, value)?,
                "link" => social.link = as_link(field, value)?,
                _ => return Err(unknown_field(field)),
            }
        }
    }
    Ok(())
}

/// Tag inputs send either an array of strings or one comma-separated string.
fn as_tag_list(field: &str, value: &Value) -> Result<Vec<String>, AppError> {
    let tags: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .map(|v| as_text(field, v))
            .collect::<Result<_, _>>()?,
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => {
            return Err(AppError::Validation(format!(
                "'{field}' expects a list of strings"
            )))
        }
    };

    Ok(tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

// ────────────────────────────────────────────────────────────────────────────
// String lists (languages, certifications)
// ────────────────────────────────────────────────────────────────────────────

fn string_list(doc: &mut ResumeData, list: StringList) -> &mut Vec<String> {
    match list {
        StringList::Languages => &mut doc.languages,
        StringList::Certifications => &mut doc.certifications,
    }
}

pub fn add_string(doc: &mut ResumeData, list: StringList) {
    string_list(doc, list).push(String::new());
}

pub fn update_string(
    doc: &mut ResumeData,
    list: StringList,
    index: usize,
    value: String,
) -> Result<(), AppError> {
    let slot = string_list(doc, list)
        .get_mut(index)
        .ok_or_else(|| out_of_range("entry", index))?;
    *slot = value;
    Ok(())
}

pub fn remove_string(doc: &mut ResumeData, list: StringList, index: usize) -> Result<(), AppError> {
    let items = string_list(doc, list);
    if index >= items.len() {
        return Err(out_of_range("entry", index));
    }
    items.remove(index);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

fn skill_group<'a>(doc: &'a mut ResumeData, title: &str) -> Result<&'a mut SkillGroup, AppError> {
    doc.skills
        .iter_mut()
        .find(|g| g.title == title)
        .ok_or_else(|| AppError::NotFound(format!("Skill type \"{title}\" not found")))
}

fn skill_at<'a>(group: &'a mut SkillGroup, index: usize) -> Result<&'a mut Skill, AppError> {
    group
        .skills
        .get_mut(index)
        .ok_or_else(|| out_of_range("skill", index))
}

pub fn add_skill_group(doc: &mut ResumeData, title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Skill group title cannot be empty".to_string()));
    }
    if doc.skills.iter().any(|g| g.title == title) {
        return Err(AppError::Validation(format!(
            "Skill type \"{title}\" already exists"
        )));
    }
    doc.skills.push(SkillGroup {
        title: title.to_string(),
        skills: Vec::new(),
    });
    Ok(())
}

pub fn remove_skill_group(doc: &mut ResumeData, title: &str) -> Result<(), AppError> {
    let before = doc.skills.len();
    doc.skills.retain(|g| g.title != title);
    if doc.skills.len() == before {
        return Err(AppError::NotFound(format!("Skill type \"{title}\" not found")));
    }
    Ok(())
}

pub fn add_skill(doc: &mut ResumeData, title: &str) -> Result<(), AppError> {
    skill_group(doc, title)?.skills.push(Skill::default());
    Ok(())
}

pub fn update_skill(
    doc: &mut ResumeData,
    title: &str,
    index: usize,
    text: String,
) -> Result<(), AppError> {
    skill_at(skill_group(doc, title)?, index)?.text = text;
    Ok(())
}

pub fn toggle_highlight(doc: &mut ResumeData, title: &str, index: usize) -> Result<(), AppError> {
    let skill = skill_at(skill_group(doc, title)?, index)?;
    skill.highlight = !skill.highlight;
    Ok(())
}

pub fn remove_skill(doc: &mut ResumeData, title: &str, index: usize) -> Result<(), AppError> {
    let group = skill_group(doc, title)?;
    if index >= group.skills.len() {
        return Err(out_of_range("skill", index));
    }
    group.skills.remove(index);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Profile picture
// ────────────────────────────────────────────────────────────────────────────

/// Stores an uploaded image inline as a `data:` URL, the form the preview embeds.
pub fn set_profile_picture(
    doc: &mut ResumeData,
    mime: &str,
    bytes: &[u8],
) -> Result<(), AppError> {
    if !mime.starts_with("image/") {
        return Err(AppError::Validation("Invalid file type".to_string()));
    }
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded image is empty".to_string()));
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    doc.profile_picture = format!("data:{mime};base64,{encoded}");
    Ok(())
}
