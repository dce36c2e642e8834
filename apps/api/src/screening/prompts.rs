// All prompt templates for the screening workflow.
// Placeholders are `{name}` and are filled by `fill_template` in a single pass,
// so substituted text is never scanned for further placeholders.

/// Job description generation. Replace: {job_title}, {experience}, {skills},
/// {company_name}, {employment_type}, {industry}, {location}
pub const JD_GENERATION_PROMPT_TEMPLATE: &str = r#"Generate a detailed and professional job description for the following role:
- Job Title: {job_title}
- Years of Experience: {experience}
- Must-have Skills: {skills}
- Company Name: {company_name}
- Employment Type: {employment_type}
- Industry: {industry}
- Location: {location}

The job description should be engaging and clearly outline the responsibilities and qualifications."#;

/// Resume evaluation. Replace: {jd_text}, {resume_text}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an expert HR professional. Evaluate the following resume against the provided job description.
Provide your evaluation **only in a raw JSON format** with the following keys: "score", "missing_skills", "remarks".
- The "score" must be an integer out of 100.
- "missing_skills" must be a JSON array of strings.
- "remarks" must be a brief, one-sentence explanation.

Job Description:
---
{jd_text}
---

Resume:
---
{resume_text}
---

Output only the JSON object, with no other text or markdown formatting."#;

/// Interview invitation for the top candidate. Replace: {jd_text}, {filename}
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"Generate a personalized and professional interview invitation email for a top candidate.

Job Description (for context):
---
{jd_text}
---

Candidate's Resume Filename: {filename}

The email should be warm, professional, and express excitement about their qualifications."#;

/// Rejection for every other candidate. Replace: {jd_text}, {filename}
pub const REJECTION_PROMPT_TEMPLATE: &str = r#"Generate a polite and professional rejection email for a candidate who was not selected.

Job Description (for context):
---
{jd_text}
---

Candidate's Resume Filename: {filename}

The email should be respectful, brief, and thank them for their interest."#;

/// Replaces every `{name}` in `template` whose name appears in `values`.
/// Unknown placeholders are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let matched = values.iter().find(|(name, _)| {
            tail.strip_prefix(*name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn evaluation_prompt(jd_text: &str, resume_text: &str) -> String {
    fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[("jd_text", jd_text), ("resume_text", resume_text)],
    )
}

pub fn interview_prompt(jd_text: &str, filename: &str) -> String {
    fill_template(
        INTERVIEW_PROMPT_TEMPLATE,
        &[("jd_text", jd_text), ("filename", filename)],
    )
}

pub fn rejection_prompt(jd_text: &str, filename: &str) -> String {
    fill_template(
        REJECTION_PROMPT_TEMPLATE,
        &[("jd_text", jd_text), ("filename", filename)],
    )
}
