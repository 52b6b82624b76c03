// Prompt constants for résumé extraction.
// Placeholder tokens: {schema_json}, {current_year}, {extracted_text}.

use crate::llm_client::SamplingParams;

pub const EXTRACTION_SYSTEM: &str = "\
You are an assistant that extracts structured information from resumes (CVs). \
Keep the language of the CV unchanged. \
Strip special characters that would break a JSON string. \
Never include a $schema key. \
Seniority has exactly four levels: Fresher, Junior, Middle, Senior. \
The fields seniority, careerPath, percentComplete and prediction are required.";

pub const EXTRACTION_PARAMS: SamplingParams = SamplingParams {
    max_tokens: 16000,
    temperature: 1.0,
    top_p: 0.25,
};

/// Default extraction template shown to a new session.
pub const DEFAULT_EXTRACTION_TEMPLATE: &str = r#"Extract every relevant piece of information from the CV below and structure it with the schema that follows. Be precise and consistent.

#### Schema
{schema_json}

#### Guidelines
1. Contact details: list every phone number and email separately in `phoneNumbers` and `emails`.
2. Nationalities: list every nationality mentioned.
3. Profiles: capture each online profile (LinkedIn, GitHub, ...) with its platform name and URL.
4. Dates: use ISO 8601 (YYYY-MM-DDTHH:MM:SS.000). Replace incomplete dates such as 2023-00-00 with 2023-01-01T00:00:00.000. A role with no end date is ongoing; the current year is {current_year}.
5. Work experience:
   - Record every position held, including repeated or overlapping positions at the same employer, each as its own item with job title, period, team and responsibilities.
   - Compute tenure in months for each role.
   - Compute the candidate's age at the start and end of each role. Without a birth year, assume the candidate was 22 in their first year of work.
6. Education: degree, institution, years of study and score (GPA or percentage).
7. Skills: every technical and soft skill mentioned.
8. Awards, certifications and publications with their details.
9. Languages with proficiency (Native, Fluent, Intermediate, ...).
10. Career insights: `careerPath` summarising the trajectory and `industryExperience` listing industries.
11. Completeness: `percentComplete` scores how complete the CV is based on contact, summary, work experience, education and skills (e.g. 70).
12. Seniority: classify as Fresher, Junior, Middle or Senior from experience, responsibilities and expertise.
13. Prediction: estimate `time_to_leave_current_company` from tenure patterns and progression, and list plausible `reasons_for_leaving`.

#### Output
Return only valid JSON that follows the schema above, with no explanations.

#### CV text
{extracted_text}"#;
