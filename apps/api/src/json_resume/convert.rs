//! Mapping between the builder's document and JSON Resume.
//!
//! The two directions are inverses for everything the builder can express:
//! `import(export(doc))` reproduces `doc` apart from fields JSON Resume has no
//! slot for (`calendarLink`, the visibility flags, the cover-letter body).

use chrono::Utc;

use crate::json_resume::schema::{
    Basics, Certificate, EducationEntry, JsonResume, LanguageEntry, Location, Meta, Profile,
    ProjectEntry, SkillEntry, Work, SCHEMA_URL, SCHEMA_VERSION,
};
use crate::json_resume::url::{normalize_url_for_external, strip_protocol};
use crate::models::resume::{
    Education, Project, ResumeData, Skill, SkillGroup, SocialMedia, WorkExperience,
};

const WEBSITE_NETWORK: &str = "Website";
const PRESENT: &str = "Present";
const DEFAULT_FLUENCY: &str = "Native speaker";

// ────────────────────────────────────────────────────────────────────────────
// Export
// ────────────────────────────────────────────────────────────────────────────

pub fn export(data: &ResumeData) -> JsonResume {
    let website = data
        .social_media
        .iter()
        .find(|s| s.social_media.eq_ignore_ascii_case(WEBSITE_NETWORK))
        .map(|s| normalize_url_for_external(&s.link))
        .unwrap_or_default();

    let profiles = data
        .social_media
        .iter()
        .filter(|s| !s.social_media.eq_ignore_ascii_case(WEBSITE_NETWORK))
        .map(|s| Profile {
            network: s.social_media.clone(),
            username: username_from_link(&s.link),
            url: normalize_url_for_external(&s.link),
        })
        .collect();

    JsonResume {
        schema: Some(SCHEMA_URL.to_string()),
        basics: Basics {
            name: data.name.clone(),
            label: data.position.clone(),
            image: data.profile_picture.clone(),
            email: data.email.clone(),
            phone: data.contact_information.clone(),
            url: website,
            summary: data.summary.clone(),
            location: split_address(&data.address),
            profiles,
        },
        work: data.work_experience.iter().map(export_work).collect(),
        education: data.education.iter().map(export_education).collect(),
        certificates: data
            .certifications
            .iter()
            .filter(|c| !c.trim().is_empty())
            .map(|c| Certificate {
                name: c.clone(),
                ..Default::default()
            })
            .collect(),
        skills: data
            .skills
            .iter()
            .map(|group| SkillEntry {
                name: group.title.clone(),
                level: String::new(),
                keywords: group.skills.iter().map(|s| s.text.clone()).collect(),
            })
            .collect(),
        languages: data
            .languages
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| LanguageEntry {
                language: l.clone(),
                fluency: DEFAULT_FLUENCY.to_string(),
            })
            .collect(),
        projects: data.projects.iter().map(export_project).collect(),
        meta: Some(Meta {
            canonical: SCHEMA_URL.to_string(),
            version: SCHEMA_VERSION.to_string(),
            last_modified: Utc::now().format("%Y-%m-%d").to_string(),
        }),
    }
}

fn export_work(job: &WorkExperience) -> Work {
    Work {
        name: job.company.clone(),
        position: job.position.clone(),
        url: normalize_url_for_external(&job.url),
        start_date: job.start_year.clone(),
        end_date: if job.end_year.trim().eq_ignore_ascii_case(PRESENT) {
            String::new()
        } else {
            job.end_year.clone()
        },
        summary: job.description.clone(),
        highlights: job.achievements().map(str::to_string).collect(),
        keywords: job.technologies.clone(),
    }
}

fn export_education(edu: &Education) -> EducationEntry {
    EducationEntry {
        institution: edu.school.clone(),
        url: normalize_url_for_external(&edu.url),
        area: edu.degree.clone(),
        study_type: study_type_for(&edu.degree),
        start_date: edu.start_year.clone(),
        end_date: edu.end_year.clone(),
    }
}

fn export_project(project: &Project) -> ProjectEntry {
    ProjectEntry {
        name: project.name.clone(),
        description: project.description.clone(),
        highlights: lines(&project.key_achievements),
        url: normalize_url_for_external(&project.link),
        start_date: project.start_year.clone(),
        end_date: project.end_year.clone(),
    }
}

fn study_type_for(degree: &str) -> String {
    let lower = degree.to_lowercase();
    if lower.contains("bachelor") {
        "Bachelor's Degree".to_string()
    } else if lower.contains("master") {
        "Master's Degree".to_string()
    } else if lower.contains("doctor") || lower.contains("phd") {
        "Doctorate".to_string()
    } else if lower.contains("diploma") {
        "Diploma".to_string()
    } else {
        degree.to_string()
    }
}

/// Last non-empty path segment of a profile link: `github.com/jane` → `jane`.
fn username_from_link(link: &str) -> String {
    strip_protocol(link)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Splits "street, city, REGION POSTAL, COUNTRY" into JSON Resume location fields.
fn split_address(address: &str) -> Location {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let (region, postal_code) = match parts.get(2) {
        Some(part) => match part.split_once(char::is_whitespace) {
            Some((region, postal)) => (region.to_string(), postal.trim().to_string()),
            None => (part.to_string(), String::new()),
        },
        None => (String::new(), String::new()),
    };

    Location {
        address: parts.first().copied().unwrap_or_default().to_string(),
        city: parts.get(1).copied().unwrap_or_default().to_string(),
        region,
        postal_code,
        country_code: parts.get(3).copied().unwrap_or_default().to_string(),
    }
}

fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Import
// ────────────────────────────────────────────────────────────────────────────

pub fn import(resume: JsonResume) -> ResumeData {
    let basics = resume.basics;

    let mut social_media: Vec<SocialMedia> = basics
        .profiles
        .into_iter()
        .map(|p| SocialMedia {
            link: if p.url.is_empty() {
                p.username
            } else {
                strip_protocol(&p.url).to_string()
            },
            social_media: p.network,
        })
        .collect();
    if !basics.url.trim().is_empty() {
        social_media.push(SocialMedia {
            social_media: WEBSITE_NETWORK.to_string(),
            link: strip_protocol(&basics.url).to_string(),
        });
    }

    ResumeData {
        name: basics.name,
        position: basics.label,
        contact_information: basics.phone,
        email: basics.email,
        address: join_location(&basics.location),
        profile_picture: basics.image,
        social_media,
        summary: basics.summary,
        education: resume
            .education
            .into_iter()
            .map(|e| Education {
                school: e.institution,
                url: strip_protocol(&e.url).to_string(),
                degree: if e.area.trim().is_empty() {
                    e.study_type
                } else {
                    e.area
                },
                start_year: e.start_date,
                end_year: e.end_date,
            })
            .collect(),
        work_experience: resume
            .work
            .into_iter()
            .map(|w| WorkExperience {
                company: w.name,
                url: strip_protocol(&w.url).to_string(),
                position: w.position,
                description: w.summary,
                key_achievements: w.highlights.join("\n"),
                start_year: w.start_date,
                end_year: if w.end_date.trim().is_empty() {
                    PRESENT.to_string()
                } else {
                    w.end_date
                },
                technologies: w.keywords,
            })
            .collect(),
        projects: resume
            .projects
            .into_iter()
            .map(|p| Project {
                name: p.name,
                link: strip_protocol(&p.url).to_string(),
                description: p.description,
                key_achievements: p.highlights.join("\n"),
                start_year: p.start_date,
                end_year: p.end_date,
            })
            .collect(),
        skills: resume
            .skills
            .into_iter()
            .map(|s| SkillGroup {
                title: s.name,
                skills: s.keywords.into_iter().map(Skill::new).collect(),
            })
            .collect(),
        languages: resume.languages.into_iter().map(|l| l.language).collect(),
        certifications: resume.certificates.into_iter().map(|c| c.name).collect(),
        ..ResumeData::default()
    }
}

fn join_location(location: &Location) -> String {
    let region_postal = format!("{} {}", location.region, location.postal_code)
        .trim()
        .to_string();
    [
        location.address.as_str(),
        location.city.as_str(),
        region_postal.as_str(),
        location.country_code.as_str(),
    ]
    .iter()
    .map(|p| p.trim())
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> ResumeData {
        ResumeData {
            name: "Jane Doe".to_string(),
            position: "Software Engineer".to_string(),
            contact_information: "+1 (555) 123-4567".to_string(),
            email: "jane@example.com".to_string(),
            address: "123 Main Street, Toronto, ON M5H 2N2".to_string(),
            social_media: vec![
                SocialMedia {
                    social_media: "Github".to_string(),
                    link: "github.com/janedoe".to_string(),
                },
                SocialMedia {
                    social_media: "Website".to_string(),
                    link: "janedoe.dev".to_string(),
                },
            ],
            summary: "Engineer with 10 years of experience".to_string(),
            work_experience: vec![WorkExperience {
                company: "Tech Corp".to_string(),
                url: "techcorp.com".to_string(),
                position: "Senior Developer".to_string(),
                description: "Led development of key features".to_string(),
                key_achievements: "Increased performance by 50%\nReduced bugs by 30%".to_string(),
                start_year: "2020-01-01".to_string(),
                end_year: "Present".to_string(),
                technologies: vec!["React".to_string(), "Rust".to_string()],
            }],
            education: vec![Education {
                school: "University of Toronto".to_string(),
                url: "utoronto.ca".to_string(),
                degree: "Bachelor of Computer Science".to_string(),
                start_year: "2014".to_string(),
                end_year: "2018".to_string(),
            }],
            skills: vec![SkillGroup {
                title: "Languages".to_string(),
                skills: vec![Skill::new("Rust"), Skill::new("TypeScript")],
            }],
            languages: vec!["English".to_string(), "French".to_string()],
            certifications: vec!["AWS Certified Solutions Architect".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_export_basics_and_profiles() {
        let exported = export(&sample_document());
        assert_eq!(exported.schema.as_deref(), Some(SCHEMA_URL));
        assert_eq!(exported.basics.label, "Software Engineer");
        assert_eq!(exported.basics.phone, "+1 (555) 123-4567");
        assert_eq!(exported.basics.url, "https://janedoe.dev");
        assert_eq!(exported.basics.profiles.len(), 1);
        assert_eq!(exported.basics.profiles[0].username, "janedoe");
        assert_eq!(exported.basics.profiles[0].url, "https://github.com/janedoe");
    }

    #[test]
    fn test_export_location_split() {
        let location = export(&sample_document()).basics.location;
        assert_eq!(location.address, "123 Main Street");
        assert_eq!(location.city, "Toronto");
        assert_eq!(location.region, "ON");
        assert_eq!(location.postal_code, "M5H 2N2");
    }

    #[test]
    fn test_export_work_present_becomes_empty_end_date() {
        let work = &export(&sample_document()).work[0];
        assert_eq!(work.end_date, "");
        assert_eq!(work.url, "https://techcorp.com");
        assert_eq!(work.highlights.len(), 2);
        assert_eq!(work.keywords, vec!["React", "Rust"]);
    }

    #[test]
    fn test_export_education_study_type() {
        let edu = &export(&sample_document()).education[0];
        assert_eq!(edu.study_type, "Bachelor's Degree");
        assert_eq!(edu.area, "Bachelor of Computer Science");
    }

    #[test]
    fn test_round_trip_preserves_builder_fields() {
        let original = sample_document();
        let back = import(export(&original));
        assert_eq!(back, original);
    }

    #[test]
    fn test_import_minimal_document() {
        let resume: JsonResume =
            serde_json::from_value(json!({ "basics": { "name": "Minimal User" } })).unwrap();
        let doc = import(resume);
        assert_eq!(doc.name, "Minimal User");
        assert!(doc.work_experience.is_empty());
        assert!(doc.social_media.is_empty());
        assert_eq!(doc.address, "");
        assert!(doc.show_summary);
    }

    #[test]
    fn test_import_strips_protocols_and_maps_dates() {
        let resume: JsonResume = serde_json::from_value(json!({
            "basics": {
                "name": "John Doe",
                "profiles": [
                    { "network": "LinkedIn", "username": "johndoe", "url": "https://linkedin.com/in/johndoe" }
                ]
            },
            "work": [
                { "name": "Startup Inc", "position": "Full Stack Developer",
                  "url": "https://startup.com", "startDate": "2018-06-01", "endDate": "",
                  "highlights": ["Launched product in 6 months", "Acquired 10k users"],
                  "keywords": ["Python"] }
            ],
            "certificates": [{ "name": "Google Cloud Professional", "issuer": "Google" }],
            "languages": [{ "language": "French", "fluency": "Professional" }]
        }))
        .unwrap();

        let doc = import(resume);
        assert_eq!(doc.social_media[0].link, "linkedin.com/in/johndoe");
        let job = &doc.work_experience[0];
        assert_eq!(job.url, "startup.com");
        assert_eq!(job.end_year, "Present");
        assert_eq!(
            job.key_achievements,
            "Launched product in 6 months\nAcquired 10k users"
        );
        assert_eq!(doc.certifications, vec!["Google Cloud Professional"]);
        assert_eq!(doc.languages, vec!["French"]);
    }

    #[test]
    fn test_username_from_link_without_path() {
        assert_eq!(username_from_link("github.com"), "github.com");
        assert_eq!(username_from_link("https://github.com/jane/"), "jane");
    }
}
