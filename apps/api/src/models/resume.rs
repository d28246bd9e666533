use serde::{Deserialize, Serialize};

/// The shared document edited by every builder form and rendered by the preview.
///
/// Field names follow the form input names (camelCase on the wire), so a form
/// change `{name, value}` maps directly onto a field here. Missing keys fall back
/// to `Default`, which keeps the three visibility flags switched on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub name: String,
    pub position: String,
    pub contact_information: String,
    pub email: String,
    pub address: String,
    /// `data:` URL of the uploaded picture, or empty.
    pub profile_picture: String,
    pub calendar_link: String,
    pub social_media: Vec<SocialMedia>,
    pub summary: String,
    pub show_summary: bool,
    pub education: Vec<Education>,
    pub show_education_dates: bool,
    pub work_experience: Vec<WorkExperience>,
    pub projects: Vec<Project>,
    pub skills: Vec<SkillGroup>,
    pub languages: Vec<String>,
    pub show_languages: bool,
    pub certifications: Vec<String>,
    /// Cover-letter body.
    pub content: String,
}

impl Default for ResumeData {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: String::new(),
            contact_information: String::new(),
            email: String::new(),
            address: String::new(),
            profile_picture: String::new(),
            calendar_link: String::new(),
            social_media: Vec::new(),
            summary: String::new(),
            show_summary: true,
            education: Vec::new(),
            show_education_dates: true,
            work_experience: Vec::new(),
            projects: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            show_languages: true,
            certifications: Vec::new(),
            content: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialMedia {
    /// Network label, e.g. "Github", "LinkedIn", "Website".
    pub social_media: String,
    /// Stored without protocol.
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub school: String,
    pub url: String,
    pub degree: String,
    pub start_year: String,
    pub end_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub company: String,
    pub url: String,
    pub position: String,
    pub description: String,
    /// One achievement per line.
    pub key_achievements: String,
    pub start_year: String,
    /// "Present" for the current role.
    pub end_year: String,
    pub technologies: Vec<String>,
}

impl WorkExperience {
    /// Non-blank achievement lines, trimmed.
    pub fn achievements(&self) -> impl Iterator<Item = &str> {
        self.key_achievements
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    pub link: String,
    pub description: String,
    pub key_achievements: String,
    pub start_year: String,
    pub end_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub title: String,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSkill")]
pub struct Skill {
    pub text: String,
    pub highlight: bool,
}

impl Skill {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlight: false,
        }
    }
}

/// Every shape a skill has been saved in. Older documents stored bare strings,
/// or objects with an `underline` flag instead of `highlight`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSkill {
    Text(String),
    Object {
        #[serde(default)]
        text: String,
        highlight: Option<bool>,
        underline: Option<bool>,
    },
}

impl From<RawSkill> for Skill {
    fn from(raw: RawSkill) -> Self {
        match raw {
            RawSkill::Text(text) => Skill::new(text),
            RawSkill::Object {
                text,
                highlight,
                underline,
            } => Skill {
                text,
                highlight: highlight.or(underline).unwrap_or(false),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_use_defaults() {
        let doc: ResumeData = serde_json::from_value(json!({ "name": "Jane Doe" })).unwrap();
        assert_eq!(doc.name, "Jane Doe");
        assert!(doc.show_summary);
        assert!(doc.show_education_dates);
        assert!(doc.show_languages);
        assert!(doc.work_experience.is_empty());
    }

    #[test]
    fn test_serializes_with_form_field_names() {
        let doc = ResumeData {
            contact_information: "+1 555 0100".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["contactInformation"], "+1 555 0100");
        assert_eq!(value["showEducationDates"], true);
        assert!(value.get("workExperience").is_some());
    }

    #[test]
    fn test_string_skill_is_migrated() {
        let group: SkillGroup =
            serde_json::from_value(json!({ "title": "Languages", "skills": ["Rust", "Go"] }))
                .unwrap();
        assert_eq!(group.skills, vec![Skill::new("Rust"), Skill::new("Go")]);
    }

    #[test]
    fn test_underline_skill_is_migrated_to_highlight() {
        let skill: Skill =
            serde_json::from_value(json!({ "text": "Kubernetes", "underline": true })).unwrap();
        assert!(skill.highlight);
        assert_eq!(skill.text, "Kubernetes");
    }

    #[test]
    fn test_highlight_wins_over_underline() {
        let skill: Skill = serde_json::from_value(
            json!({ "text": "Kafka", "highlight": false, "underline": true }),
        )
        .unwrap();
        assert!(!skill.highlight);
    }

    #[test]
    fn test_achievements_skip_blank_lines() {
        let job = WorkExperience {
            key_achievements: "Built the API\n\n  Cut latency by 40%  \n".to_string(),
            ..Default::default()
        };
        let lines: Vec<&str> = job.achievements().collect();
        assert_eq!(lines, vec!["Built the API", "Cut latency by 40%"]);
    }
}
