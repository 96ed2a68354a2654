use diesel::prelude::*;

use super::schema::{courses, enrollments, lecturers, students};
use crate::core::{Course, Enrollment, Lecturer, Student};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EnrollmentRow {
    pub id: i32,
    pub course_id: i32,
    pub student_id: i32,
    pub lecturer_id: Option<i32>,
    pub grade: Option<f64>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CourseRow {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StudentRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = lecturers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LecturerRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            id: row.id,
            course_id: row.course_id,
            student_id: row.student_id,
            lecturer_id: row.lecturer_id,
            grade: row.grade,
        }
    }
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            title: row.title,
        }
    }
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

impl From<LecturerRow> for Lecturer {
    fn from(row: LecturerRow) -> Self {
        Lecturer {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}
