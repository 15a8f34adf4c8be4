//! Fixed per-kind prompts sent to the vision model.

use sitewire_shared::types::ReportKind;

/// The analysis prompt for a report kind.
pub fn analysis_prompt(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Progress => PROGRESS_PROMPT,
        ReportKind::Issue => ISSUE_PROMPT,
    }
}

const PROGRESS_PROMPT: &str = "\
Analyze this construction site photo for progress reporting. Please provide:

1. Construction phase identification
2. Completion percentage estimate
3. Materials and equipment observed
4. Quality assessment
5. Timeline status
6. Safety observations
7. Specific recommendations

Format your response as a detailed analysis with clear sections. Include a \
confidence level (0-1) and specific actionable recommendations.";

const ISSUE_PROMPT: &str = "\
Analyze this construction site photo for safety issues and problems. Please identify:

1. Issue type and severity (low/medium/high)
2. Specific location description
3. Detailed problem description
4. Potential causes
5. Immediate actions required
6. Safety impact assessment
7. Risk level evaluation
8. Specific recommendations

Format your response as a detailed analysis with clear sections. Include a \
confidence level (0-1) and specific actionable recommendations.";
