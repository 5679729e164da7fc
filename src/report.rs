use crate::model::SubmissionResult;

/// Colouring hint for a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Good,
    Bad,
}

impl Tone {
    pub fn class(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Good => "good",
            Tone::Bad => "bad",
        }
    }

    fn of(passed: bool) -> Tone {
        if passed {
            Tone::Good
        } else {
            Tone::Bad
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub tone: Tone,
}

impl Line {
    fn new(tone: Tone, text: impl Into<String>) -> Self {
        Line {
            text: text.into(),
            tone,
        }
    }
}

fn accepted(status: &str) -> bool {
    status.eq_ignore_ascii_case("accepted")
}

/// Renders a judged submission as lines of a terminal transcript.
pub fn render(result: &SubmissionResult) -> Vec<Line> {
    let mut lines = vec![Line::new(Tone::Neutral, "=== Submission Result ===")];
    if let Some(id) = &result.submission_id {
        lines.push(Line::new(Tone::Neutral, format!("Submission ID: {}", id)));
    }
    if let Some(id) = &result.problem_id {
        lines.push(Line::new(Tone::Neutral, format!("Problem ID: {}", id)));
    }
    lines.push(Line::new(
        Tone::of(accepted(&result.status)),
        format!("Status: {}", result.status),
    ));

    if let Some(error) = &result.error {
        lines.push(Line::new(Tone::Bad, format!("Error: {}", error)));
        return lines;
    }

    lines.push(Line::new(
        Tone::of(result.is_correct),
        format!(
            "Result: {}",
            if result.is_correct {
                "Correct"
            } else {
                "Incorrect"
            }
        ),
    ));
    lines.push(Line::new(
        Tone::Neutral,
        format!("Runtime: {:.2}s", result.runtime),
    ));
    if result.is_correct {
        if let Some(points) = result.points_earned {
            lines.push(Line::new(Tone::Good, format!("Points Earned: {}", points)));
        }
        if let Some(time) = result.time_taken {
            lines.push(Line::new(Tone::Neutral, format!("Time Taken: {:.2}s", time)));
        }
    }

    lines.push(Line::new(Tone::Neutral, ""));
    lines.push(Line::new(Tone::Neutral, "=== Test Cases ==="));
    for (i, test) in result.results.iter().enumerate() {
        lines.push(Line::new(Tone::Neutral, format!("Test Case {}:", i + 1)));
        lines.push(Line::new(
            Tone::of(accepted(&test.status)),
            format!("  Status: {}", test.status),
        ));
        lines.push(Line::new(
            Tone::Neutral,
            format!("  Runtime: {:.2}s", test.runtime),
        ));
        lines.push(Line::new(Tone::Neutral, format!("  Input: {}", test.input)));
        lines.push(Line::new(
            Tone::Neutral,
            format!("  Expected: {}", test.expected),
        ));
        lines.push(Line::new(Tone::Neutral, format!("  Actual: {}", test.actual)));
        if let Some(error) = &test.error {
            lines.push(Line::new(Tone::Bad, format!("  Error: {}", error)));
        }
        lines.push(Line::new(Tone::Neutral, ""));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestResult;

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_render_accepted() {
        let result = SubmissionResult {
            submission_id: Some("s1".to_string()),
            problem_id: Some("p1".to_string()),
            status: "Accepted".to_string(),
            is_correct: true,
            runtime: 0.1234,
            results: vec![TestResult {
                input: "1 2".to_string(),
                expected: "3".to_string(),
                actual: "3".to_string(),
                status: "Accepted".to_string(),
                runtime: 0.05,
                error: None,
            }],
            points_earned: Some(100.0),
            time_taken: Some(12.5),
            error: None,
        };
        let lines = render(&result);
        let texts = texts(&lines);
        assert_eq!(texts[0], "=== Submission Result ===");
        assert!(texts.contains(&"Submission ID: s1"));
        assert!(texts.contains(&"Result: Correct"));
        assert!(texts.contains(&"Runtime: 0.12s"));
        assert!(texts.contains(&"Points Earned: 100"));
        assert!(texts.contains(&"Time Taken: 12.50s"));
        assert!(texts.contains(&"Test Case 1:"));
        assert!(texts.contains(&"  Expected: 3"));
        assert_eq!(lines[3].tone, Tone::Good);
    }

    #[test]
    fn test_render_wrong_answer() {
        let result = SubmissionResult {
            submission_id: Some("s2".to_string()),
            problem_id: None,
            status: "Wrong Answer".to_string(),
            is_correct: false,
            runtime: 1.0,
            results: vec![TestResult {
                input: "2 2".to_string(),
                expected: "4".to_string(),
                actual: "5".to_string(),
                status: "Wrong Answer".to_string(),
                runtime: 0.5,
                error: Some("assertion failed".to_string()),
            }],
            points_earned: Some(0.0),
            time_taken: None,
            error: None,
        };
        let lines = render(&result);
        let texts = texts(&lines);
        assert!(texts.contains(&"Result: Incorrect"));
        assert!(!texts.iter().any(|t| t.starts_with("Points Earned")));
        let error = lines
            .iter()
            .find(|l| l.text == "  Error: assertion failed")
            .unwrap();
        assert_eq!(error.tone, Tone::Bad);
    }

    #[test]
    fn test_render_rejected() {
        let lines = render(&SubmissionResult::rejected("Olympiad is not active"));
        assert_eq!(
            texts(&lines),
            vec![
                "=== Submission Result ===",
                "Status: rejected",
                "Error: Olympiad is not active"
            ]
        );
    }
}
