//! Registered gym members

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use gymtrack_core::timestamp_string;

use super::validation::{optional, required};
use super::ValidationError;

/// Collection holding registered members
pub const USERS: &str = "users";

/// Maximum length for registration text fields
const MAX_FIELD_LEN: usize = 200;

/// Anything, an @, anything; no whitespace.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+$").expect("invalid email regex"));

/// Kind of member; decides which affiliation fields are required
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Staff,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "staff" => Ok(Self::Staff),
            _ => Err(ValidationError::InvalidVariant {
                field: "user_type",
                value: s.to_owned(),
            }),
        }
    }
}

/// Registration form as submitted
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub document: String,
    pub email: String,
    pub user_type: String,
    #[serde(default)]
    pub student_code: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Stored member document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub document: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub created_at: String,
}

impl User {
    /// Validate a registration form into a new (not yet stored) member.
    ///
    /// # Rules
    /// - name, document and email are required
    /// - email must look like `something@something`
    /// - students need a student code and a program; staff need a department
    pub fn register(req: &RegistrationRequest, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let name = required("name", &req.name, MAX_FIELD_LEN)?;
        let document = required("document", &req.document, MAX_FIELD_LEN)?;
        let email = required("email", &req.email, MAX_FIELD_LEN)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must be a valid email address",
            });
        }
        let user_type = UserType::parse(&req.user_type)?;

        let mut student_code = optional("student_code", req.student_code.as_deref(), MAX_FIELD_LEN)?;
        let mut program = optional("program", req.program.as_deref(), MAX_FIELD_LEN)?;
        let mut department = optional("department", req.department.as_deref(), MAX_FIELD_LEN)?;

        match user_type {
            UserType::Student => {
                if student_code.is_none() {
                    return Err(ValidationError::Empty { field: "student_code" });
                }
                if program.is_none() {
                    return Err(ValidationError::Empty { field: "program" });
                }
                department = None;
            }
            UserType::Staff => {
                if department.is_none() {
                    return Err(ValidationError::Empty { field: "department" });
                }
                student_code = None;
                program = None;
            }
        }

        Ok(Self {
            id: String::new(),
            name,
            document,
            email,
            user_type,
            student_code,
            program,
            department,
            created_at: timestamp_string(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> RegistrationRequest {
        RegistrationRequest {
            name: " Ana Torres ".into(),
            document: "1020304050".into(),
            email: "ana@example.edu".into(),
            user_type: "student".into(),
            student_code: Some("2019-1234".into()),
            program: Some("Systems Engineering".into()),
            department: Some("ignored".into()),
        }
    }

    #[test]
    fn registers_student() {
        let user = User::register(&student(), Utc::now()).unwrap();
        assert_eq!(user.name, "Ana Torres");
        assert_eq!(user.user_type, UserType::Student);
        assert_eq!(user.department, None);
        assert_eq!(user.program.as_deref(), Some("Systems Engineering"));
    }

    #[test]
    fn student_needs_code_and_program() {
        let mut req = student();
        req.student_code = Some("  ".into());
        assert!(matches!(
            User::register(&req, Utc::now()),
            Err(ValidationError::Empty { field: "student_code" })
        ));
    }

    #[test]
    fn staff_needs_department() {
        let mut req = student();
        req.user_type = "Staff".into();
        req.department = None;
        assert!(matches!(
            User::register(&req, Utc::now()),
            Err(ValidationError::Empty { field: "department" })
        ));

        req.department = Some("Facilities".into());
        let user = User::register(&req, Utc::now()).unwrap();
        assert_eq!(user.student_code, None);
        assert_eq!(user.program, None);
    }

    #[test]
    fn rejects_bad_email() {
        let mut req = student();
        req.email = "ana at example".into();
        assert!(matches!(
            User::register(&req, Utc::now()),
            Err(ValidationError::InvalidFormat { field: "email", .. })
        ));
    }

    #[test]
    fn rejects_unknown_user_type() {
        let mut req = student();
        req.user_type = "visitor".into();
        assert!(matches!(
            User::register(&req, Utc::now()),
            Err(ValidationError::InvalidVariant { field: "user_type", .. })
        ));
    }

    #[test]
    fn stored_fields_are_camel_case() {
        let user = User::register(&student(), Utc::now()).unwrap();
        let fields = gymtrack_core::to_fields(&user).unwrap();
        assert!(fields.contains_key("userType"));
        assert!(fields.contains_key("studentCode"));
        assert!(!fields.contains_key("department"));
        assert!(!fields.contains_key("id"));
    }
}
