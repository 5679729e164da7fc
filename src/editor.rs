use std::collections::HashMap;

use crate::model::Problem;

/// Source code typed for each problem of a problem set, keyed by the problem's position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeBuffers {
    buffers: HashMap<usize, String>,
}

impl CodeBuffers {
    /// Fills every buffer with the starter code for `language`.
    pub fn seeded(problems: &[Problem], language: &str) -> Self {
        let buffers = problems
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.starter_code(language)))
            .collect();
        CodeBuffers { buffers }
    }

    pub fn get(&self, index: usize) -> String {
        self.buffers.get(&index).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, index: usize, code: String) {
        self.buffers.insert(index, code);
    }

    /// Swaps starter code over to `to`. Buffers the user has edited are left alone.
    pub fn switch_language(&mut self, problems: &[Problem], from: &str, to: &str) {
        for (i, problem) in problems.iter().enumerate() {
            let untouched = match self.buffers.get(&i) {
                Some(code) => code.is_empty() || *code == problem.starter_code(from),
                None => true,
            };
            if untouched {
                self.buffers.insert(i, problem.starter_code(to));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(id: &str, templates: &[(&str, &str)]) -> Problem {
        Problem {
            id: id.to_string(),
            title: id.to_string(),
            difficulty: "easy".to_string(),
            description: String::new(),
            test_cases: vec![],
            default_code: templates
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_seeded() {
        let problems = vec![
            problem("a", &[("python", "def a():\n")]),
            problem("b", &[]),
        ];
        let buffers = CodeBuffers::seeded(&problems, "python");
        assert_eq!(buffers.get(0), "def a():\n");
        assert_eq!(buffers.get(1), "# Write your python solution here\n");
        assert_eq!(buffers.get(2), "");
    }

    #[test]
    fn test_switch_language_keeps_edits() {
        let problems = vec![
            problem("a", &[("python", "def a():\n"), ("cpp", "int a();\n")]),
            problem("b", &[]),
        ];
        let mut buffers = CodeBuffers::seeded(&problems, "python");
        buffers.set(1, "print('mine')".to_string());

        buffers.switch_language(&problems, "python", "cpp");
        assert_eq!(buffers.get(0), "int a();\n");
        assert_eq!(buffers.get(1), "print('mine')");
    }

    #[test]
    fn test_olympiad_language_reselect_keeps_buffers() {
        use crate::model::{OLYMPIAD_LANGUAGES, PRACTICE_LANGUAGES};

        assert!(OLYMPIAD_LANGUAGES
            .iter()
            .all(|lang| PRACTICE_LANGUAGES.contains(lang)));

        let problems = vec![problem("a", &[("python", "def a():\n")]), problem("b", &[])];
        let (lang, _) = OLYMPIAD_LANGUAGES[0];
        let mut buffers = CodeBuffers::seeded(&problems, lang);
        buffers.set(1, "print('mine')".to_string());

        for (to, _) in OLYMPIAD_LANGUAGES {
            buffers.switch_language(&problems, lang, to);
        }
        assert_eq!(buffers.get(0), "def a():\n");
        assert_eq!(buffers.get(1), "print('mine')");
    }
}
