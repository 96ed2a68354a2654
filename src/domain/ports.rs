use crate::domain::model::{
    Course, Enrollment, EnrollmentView, Lecturer, Lookups, NewCourse, NewEnrollment, NewPerson,
    Student, StudentMatch,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence for enrollment records.
///
/// Implementations must enforce the (course, student) uniqueness themselves
/// and report a duplicate as `EnrollError::AlreadyEnrolled`; callers never
/// check for an existing pair first. Dangling course, student or lecturer
/// references are reported as `EnrollError::ValidationError`.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Join views in storage order, optionally restricted to one course.
    async fn list(&self, course_id: Option<i32>) -> Result<Vec<EnrollmentView>>;

    async fn find(&self, id: i32) -> Result<Option<Enrollment>>;

    async fn insert(&self, enrollment: NewEnrollment) -> Result<Enrollment>;

    /// Replaces every mutable field. `EnrollError::NotFound` when `id` is unknown.
    async fn update(&self, id: i32, enrollment: NewEnrollment) -> Result<Enrollment>;

    /// Removes and returns the record. `EnrollError::NotFound` when `id` is unknown.
    async fn delete(&self, id: i32) -> Result<Enrollment>;

    /// Case-sensitive substring match on "first last".
    async fn search_students(&self, term: &str) -> Result<Vec<StudentMatch>>;

    async fn lookups(&self) -> Result<Lookups>;
}

/// Courses, students and lecturers are owned elsewhere; this port only lets
/// them be loaded so enrollments have something to point at.
#[async_trait]
pub trait Roster: Send + Sync {
    async fn add_course(&self, course: NewCourse) -> Result<Course>;
    async fn add_student(&self, student: NewPerson) -> Result<Student>;
    async fn add_lecturer(&self, lecturer: NewPerson) -> Result<Lecturer>;
}
