pub mod enrollment;

pub use crate::domain::model::{
    AddStudentOutcome, Course, Enrollment, EnrollmentForm, EnrollmentView, Lecturer, LookupOption,
    Lookups, NewCourse, NewEnrollment, NewPerson, Student, StudentMatch,
};
pub use crate::domain::ports::{EnrollmentRepository, Roster};
pub use crate::utils::error::Result;
