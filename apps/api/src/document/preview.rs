//! Plain-text rendering of the live preview pane.
//!
//! Mirrors what the print layout shows: hidden sections stay hidden, empty
//! sections are dropped, links are shown without protocol and highlighted
//! skills are wrapped in `*`.

use std::fmt::Write;

use serde::Deserialize;

use crate::json_resume::url::normalize_url_for_display;
use crate::models::resume::ResumeData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewKind {
    #[default]
    Resume,
    CoverLetter,
}

pub fn render(doc: &ResumeData, kind: PreviewKind) -> String {
    match kind {
        PreviewKind::Resume => render_resume(doc),
        PreviewKind::CoverLetter => render_cover_letter(doc),
    }
}

fn header(doc: &ResumeData, out: &mut String) {
    if !doc.name.is_empty() {
        let _ = writeln!(out, "{}", doc.name);
    }
    if !doc.position.is_empty() {
        let _ = writeln!(out, "{}", doc.position);
    }

    let contact = [
        doc.contact_information.as_str(),
        doc.email.as_str(),
        doc.address.as_str(),
    ]
    .iter()
    .filter(|s| !s.trim().is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" | ");
    if !contact.is_empty() {
        let _ = writeln!(out, "{contact}");
    }

    let links = doc
        .social_media
        .iter()
        .filter(|s| !s.link.is_empty())
        .map(|s| normalize_url_for_display(&s.link))
        .collect::<Vec<_>>()
        .join(" | ");
    if !links.is_empty() {
        let _ = writeln!(out, "{links}");
    }
}

fn section(out: &mut String, title: &str) {
    let _ = write!(out, "\n{}\n{}\n", title.to_uppercase(), "-".repeat(title.len()));
}

fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (s, "") => s.to_string(),
        ("", e) => e.to_string(),
        (s, e) => format!("{s} - {e}"),
    }
}

fn render_resume(doc: &ResumeData) -> String {
    let mut out = String::new();
    header(doc, &mut out);

    if doc.show_summary && !doc.summary.trim().is_empty() {
        section(&mut out, "Summary");
        let _ = writeln!(out, "{}", doc.summary.trim());
    }

    if !doc.education.is_empty() {
        section(&mut out, "Education");
        for edu in &doc.education {
            let _ = write!(out, "{}", edu.school);
            if doc.show_education_dates {
                let dates = date_range(&edu.start_year, &edu.end_year);
                if !dates.is_empty() {
                    let _ = write!(out, " ({dates})");
                }
            }
            out.push('\n');
            if !edu.degree.is_empty() {
                let _ = writeln!(out, "  {}", edu.degree);
            }
        }
    }

    if !doc.work_experience.is_empty() {
        section(&mut out, "Work Experience");
        for job in &doc.work_experience {
            let _ = write!(out, "{} - {}", job.position, job.company);
            let dates = date_range(&job.start_year, &job.end_year);
            if !dates.is_empty() {
                let _ = write!(out, " ({dates})");
            }
            out.push('\n');
            if !job.description.trim().is_empty() {
                let _ = writeln!(out, "  {}", job.description.trim());
            }
            for line in job.achievements() {
                let _ = writeln!(out, "  • {line}");
            }
            if !job.technologies.is_empty() {
                let _ = writeln!(out, "  Technologies: {}", job.technologies.join(", "));
            }
        }
    }

    if !doc.projects.is_empty() {
        section(&mut out, "Projects");
        for project in &doc.projects {
            let _ = write!(out, "{}", project.name);
            if !project.link.is_empty() {
                let _ = write!(out, " ({})", normalize_url_for_display(&project.link));
            }
            out.push('\n');
            if !project.description.trim().is_empty() {
                let _ = writeln!(out, "  {}", project.description.trim());
            }
            for line in project
                .key_achievements
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
            {
                let _ = writeln!(out, "  • {line}");
            }
        }
    }

    for group in doc.skills.iter().filter(|g| !g.skills.is_empty()) {
        section(&mut out, &group.title);
        let skills = group
            .skills
            .iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| {
                if s.highlight {
                    format!("*{}*", s.text)
                } else {
                    s.text.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "{skills}");
    }

    let languages: Vec<&str> = doc
        .languages
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if doc.show_languages && !languages.is_empty() {
        section(&mut out, "Languages");
        let _ = writeln!(out, "{}", languages.join(", "));
    }

    let certifications: Vec<&str> = doc
        .certifications
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if !certifications.is_empty() {
        section(&mut out, "Certifications");
        for cert in certifications {
            let _ = writeln!(out, "• {cert}");
        }
    }

    out
}

fn render_cover_letter(doc: &ResumeData) -> String {
    let mut out = String::new();
    header(doc, &mut out);
    out.push('\n');
    out.push_str("Dear Hiring Manager,\n\n");
    if !doc.content.trim().is_empty() {
        let _ = writeln!(out, "{}", doc.content.trim());
    }
    out.push_str("\nSincerely,\n");
    let _ = writeln!(out, "{}", doc.name);
    out
}
