use crate::model::{Problem, User};

/// What the client knows about the signed-in user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn login_start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn login_success(&mut self, user: Option<User>, token: String) {
        self.user = user;
        self.token = Some(token);
        self.loading = false;
        self.error = None;
    }

    pub fn login_failure(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        self.loading = false;
        self.error = None;
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// The practice problem list and the problem currently open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemsState {
    pub problems: Vec<Problem>,
    pub current: Option<Problem>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProblemsState {
    pub fn pending(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn list_loaded(&mut self, problems: Vec<Problem>) {
        self.loading = false;
        self.problems = problems;
    }

    pub fn problem_loaded(&mut self, problem: Problem) {
        self.loading = false;
        self.current = Some(problem);
    }

    /// Records a failed fetch. Data already loaded is kept.
    pub fn rejected(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn problem(id: &str) -> Problem {
        Problem {
            id: id.to_string(),
            title: format!("Problem {}", id),
            difficulty: "easy".to_string(),
            description: String::new(),
            test_cases: vec![],
            default_code: HashMap::new(),
        }
    }

    #[test]
    fn test_auth_lifecycle() {
        let mut state = AuthState::default();
        assert!(!state.is_authenticated());

        state.login_start();
        assert!(state.loading);

        state.login_failure("Invalid credentials");
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
        assert!(!state.is_authenticated());

        state.login_start();
        assert!(state.error.is_none());
        state.login_success(None, "tok".to_string());
        assert!(state.is_authenticated());
        assert!(state.username().is_none());

        state.logout();
        assert_eq!(state, AuthState::default());
    }

    #[test]
    fn test_problems_lifecycle() {
        let mut state = ProblemsState::default();
        state.pending();
        assert!(state.loading);

        state.list_loaded(vec![problem("1"), problem("2")]);
        assert!(!state.loading);
        assert_eq!(state.problems.len(), 2);

        state.pending();
        state.problem_loaded(problem("2"));
        assert_eq!(state.current.as_ref().map(|p| p.id.as_str()), Some("2"));

        state.pending();
        state.rejected("Failed to fetch problems");
        assert_eq!(state.error.as_deref(), Some("Failed to fetch problems"));
        assert_eq!(state.problems.len(), 2);
    }
}
