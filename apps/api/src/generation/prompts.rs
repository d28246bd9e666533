// All LLM prompt constants for the Generation module.
// Templates use `{placeholder}` markers filled by `generation::generator`.

/// System prompt for cover letter generation.
pub const COVER_LETTER_SYSTEM: &str =
    "You are a professional cover letter writer with expertise in highlighting candidate \
    strengths and tailoring content to job requirements. You write compelling, specific, \
    and achievement-focused cover letters.";

/// System prompt for professional summary generation.
pub const SUMMARY_SYSTEM: &str =
    "You are an expert resume writer specializing in creating compelling professional \
    summaries that highlight key achievements and align with job requirements.";

/// Shared by both document prompts. Enforces the no-fabrication rule.
pub const ACCURACY_REQUIREMENTS: &str = r#"CRITICAL REQUIREMENTS - YOU MUST FOLLOW THESE EXACTLY:
1. ONLY mention qualifications, skills, and experiences that are explicitly listed in the candidate information above
2. DO NOT invent, assume, or fabricate ANY qualifications, certifications, or experiences not shown above
3. DO NOT claim the candidate has skills not listed in their technical skills
4. DO NOT reference companies, positions, or achievements not mentioned in their experience
5. If the job requires something the candidate doesn't have, DO NOT claim they have it - focus on what they DO have
6. Use ONLY the specific metrics, achievements, and details provided in the candidate's experience"#;

pub const ACCURACY_VERIFICATION: &str = r#"ACCURACY VERIFICATION:
Before writing each sentence, verify that ANY claim about the candidate's background is explicitly stated in the candidate information above. If you cannot find it in the provided information, DO NOT include it."#;

/// Cover letter prompt. Replace `{name}`, `{position}`, `{summary}`,
/// `{experience}`, `{skills}`, `{job_description}`, `{accuracy_requirements}`
/// and `{accuracy_verification}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are a professional cover letter writer. Write a compelling, tailored cover letter based STRICTLY on the candidate information provided below.

CANDIDATE INFORMATION:
Name: {name}
Current Role: {position}

Professional Summary:
{summary}

Key Experience:
{experience}

Technical Skills: {skills}

JOB DESCRIPTION:
{job_description}

{accuracy_requirements}

WRITING INSTRUCTIONS:
1. Write a professional cover letter that is 3-4 paragraphs long (approximately 250-350 words)
2. Start with a strong opening that shows enthusiasm and alignment with the role
3. Highlight 2-3 relevant achievements from the candidate's ACTUAL experience that match the job requirements
4. Demonstrate how the candidate's DOCUMENTED skills and experience solve the employer's needs
5. Use ONLY the specific metrics and examples from the candidate's background provided above
6. End with a confident call-to-action
7. Use a professional yet personable tone
8. DO NOT include a salutation (no "Dear Hiring Manager") or signature (no "Sincerely, {name}")
9. DO NOT include placeholders like [Company Name] - infer from job description or omit
10. Write ONLY the body content of the cover letter

{accuracy_verification}

OUTPUT FORMAT:
Return ONLY the cover letter content as plain text, without any additional formatting, markdown, or explanations."#;

/// Professional summary prompt. Same placeholders as the cover letter plus
/// `{education}` and `{languages}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Write a professional summary for the top of this candidate's resume, tailored to the job description below and based STRICTLY on the candidate information provided.

CANDIDATE INFORMATION:
Name: {name}
Current Role: {position}

Current Summary:
{summary}

Key Experience:
{experience}

Education:
{education}

Technical Skills: {skills}

Languages: {languages}

JOB DESCRIPTION:
{job_description}

{accuracy_requirements}

WRITING INSTRUCTIONS:
1. Write 3-4 sentences (approximately 60-100 words)
2. Open with the candidate's role and strongest area of expertise
3. Mention 1-2 concrete achievements or metrics from the candidate's ACTUAL experience that match the job
4. Name the most relevant skills from the candidate's DOCUMENTED skills
5. Do not write in the first person (no "I", "my" or "me")
6. DO NOT include placeholders like [Company Name] or the candidate's name

{accuracy_verification}

OUTPUT FORMAT:
Return ONLY the summary as a single plain-text paragraph, without headings, bullet points, markdown, quotes, or explanations."#;
