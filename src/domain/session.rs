//! Authenticated user session

use std::fmt;

/// Who is taking the interview, passed explicitly at construction
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub linkedin: Option<String>,
    pub access_token: Option<String>,
}

impl UserSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Onboarding questionnaire is done once name and role are known
    pub fn has_completed_onboarding(&self) -> bool {
        non_blank(self.name.as_deref()) && non_blank(self.role.as_deref())
    }

    pub fn has_linkedin(&self) -> bool {
        non_blank(self.linkedin.as_deref())
    }

    /// Display name sent to the backend
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Candidate")
    }

    pub fn email_or_default(&self) -> &str {
        self.email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or("candidate@example.com")
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("linkedin", &self.linkedin)
            .field("access_token", &self.access_token.as_deref().map(mask_secret))
            .finish()
    }
}
