// Prompt constants for interview-question generation.
// Placeholder tokens: {candidate_json}.

use crate::llm_client::SamplingParams;

pub const QUESTION_SYSTEM: &str = "\
You are an expert technical interviewer. \
Generate relevant and challenging questions for the candidate based on the provided resume information.";

pub const QUESTION_PARAMS: SamplingParams = SamplingParams {
    max_tokens: 10000,
    temperature: 1.0,
    top_p: 0.25,
};

/// Default question template. `{candidate_json}` receives the extracted
/// record pretty-printed with two-space indentation.
pub const DEFAULT_QUESTION_TEMPLATE: &str = r#"Generate 15 technical multiple-choice interview questions based on the following resume information:
{candidate_json}

The questions must be relevant to the skills and experience listed in the resume.
Adjust the difficulty to the candidate's seniority.

Output format (JSON array):
[
  {
    "question": "Question text",
    "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
    "correct_answer": "Correct option",
    "seniority": "Seniority level",
    "skills": ["Skill 1", "Skill 2"],
    "job_title": "Job title",
    "domains": ["Healthcare", "Banking"]
  }
]"#;
