use serde::{Deserialize, Serialize};

/// One student's registration in one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i32,
    pub course_id: i32,
    pub student_id: i32,
    pub lecturer_id: Option<i32>,
    pub grade: Option<f64>,
}

/// Enrollment fields as submitted by a client. Required fields are optional
/// here so that a half-filled form can be echoed back with its errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentForm {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub course_id: Option<i32>,
    #[serde(default)]
    pub student_id: Option<i32>,
    #[serde(default)]
    pub lecturer_id: Option<i32>,
    #[serde(default)]
    pub grade: Option<f64>,
}

/// Validated values ready to be written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewEnrollment {
    pub course_id: i32,
    pub student_id: i32,
    pub lecturer_id: Option<i32>,
    pub grade: Option<f64>,
}

impl NewEnrollment {
    pub fn with_id(self, id: i32) -> Enrollment {
        Enrollment {
            id,
            course_id: self.course_id,
            student_id: self.student_id,
            lecturer_id: self.lecturer_id,
            grade: self.grade,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecturer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl Lecturer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    #[serde(alias = "first_name")]
    pub first_name: String,
    #[serde(alias = "last_name")]
    pub last_name: String,
}

/// An enrollment with its course, student and lecturer resolved inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Course,
    pub student: Student,
    pub lecturer: Option<Lecturer>,
}

/// Typeahead hit for the student search box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentMatch {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: i32,
    pub label: String,
}

/// Current choices for populating an enrollment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookups {
    pub courses: Vec<LookupOption>,
    pub students: Vec<LookupOption>,
    pub lecturers: Vec<LookupOption>,
}

/// Result of the guarded add; failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddStudentOutcome {
    pub success: bool,
    pub message: String,
}

impl AddStudentOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
