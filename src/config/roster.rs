use crate::config::substitute_env_vars;
use crate::core::{NewCourse, NewPerson, Roster};
use crate::utils::error::{EnrollError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Seed data for the entities enrollments point at:
///
/// ```toml
/// [[courses]]
/// title = "Databases"
///
/// [[students]]
/// first_name = "Ann"
/// last_name = "Smith"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterFile {
    pub courses: Vec<NewCourse>,
    pub students: Vec<NewPerson>,
    pub lecturers: Vec<NewPerson>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub courses: usize,
    pub students: usize,
    pub lecturers: usize,
}

impl RosterFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EnrollError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EnrollError::ConfigError {
            message: format!("Roster parsing error: {}", e),
        })
    }

    /// 依序寫入課程、學生、講師
    pub async fn load_into<S: Roster>(&self, store: &S) -> Result<SeedSummary> {
        for course in &self.courses {
            store.add_course(course.clone()).await?;
        }
        for student in &self.students {
            store.add_student(student.clone()).await?;
        }
        for lecturer in &self.lecturers {
            store.add_lecturer(lecturer.clone()).await?;
        }

        Ok(SeedSummary {
            courses: self.courses.len(),
            students: self.students.len(),
            lecturers: self.lecturers.len(),
        })
    }
}

impl Validate for RosterFile {
    fn validate(&self) -> Result<()> {
        for (i, course) in self.courses.iter().enumerate() {
            validation::validate_non_empty_string(&format!("courses[{}].title", i), &course.title)?;
        }
        for (kind, people) in [("students", &self.students), ("lecturers", &self.lecturers)] {
            for (i, person) in people.iter().enumerate() {
                validation::validate_non_empty_string(
                    &format!("{}[{}].first_name", kind, i),
                    &person.first_name,
                )?;
                validation::validate_non_empty_string(
                    &format!("{}[{}].last_name", kind, i),
                    &person.last_name,
                )?;
            }
        }
        Ok(())
    }
}
