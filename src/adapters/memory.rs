use crate::core::{
    Course, Enrollment, EnrollmentRepository, EnrollmentView, Lecturer, LookupOption, Lookups,
    NewCourse, NewEnrollment, NewPerson, Roster, Student, StudentMatch,
};
use crate::utils::error::{EnrollError, Result};
use crate::utils::validation::FieldErrors;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    enrollments: BTreeMap<i32, Enrollment>,
    courses: BTreeMap<i32, Course>,
    students: BTreeMap<i32, Student>,
    lecturers: BTreeMap<i32, Lecturer>,
    last_ids: LastIds,
}

/// Ids are never reused, like SQLite `AUTOINCREMENT`.
#[derive(Debug, Default)]
struct LastIds {
    enrollment: i32,
    course: i32,
    student: i32,
    lecturer: i32,
}

fn allocate(last: &mut i32) -> i32 {
    *last += 1;
    *last
}

impl MemoryState {
    fn check_references(&self, enrollment: &NewEnrollment) -> Result<()> {
        let mut errors = FieldErrors::new();
        if !self.courses.contains_key(&enrollment.course_id) {
            errors.push("courseId", format!("course {} does not exist", enrollment.course_id));
        }
        if !self.students.contains_key(&enrollment.student_id) {
            errors.push(
                "studentId",
                format!("student {} does not exist", enrollment.student_id),
            );
        }
        if let Some(lecturer_id) = enrollment.lecturer_id {
            if !self.lecturers.contains_key(&lecturer_id) {
                errors.push("lecturerId", format!("lecturer {} does not exist", lecturer_id));
            }
        }
        errors.into_result()
    }

    fn check_unique(&self, enrollment: &NewEnrollment, except: Option<i32>) -> Result<()> {
        let taken = self.enrollments.values().any(|e| {
            Some(e.id) != except
                && e.course_id == enrollment.course_id
                && e.student_id == enrollment.student_id
        });
        if taken {
            return Err(EnrollError::AlreadyEnrolled {
                course_id: enrollment.course_id,
                student_id: enrollment.student_id,
            });
        }
        Ok(())
    }

    fn view(&self, enrollment: &Enrollment) -> Option<EnrollmentView> {
        Some(EnrollmentView {
            enrollment: enrollment.clone(),
            course: self.courses.get(&enrollment.course_id)?.clone(),
            student: self.students.get(&enrollment.student_id)?.clone(),
            lecturer: enrollment
                .lecturer_id
                .and_then(|id| self.lecturers.get(&id))
                .cloned(),
        })
    }
}

/// In-process store with the same rules as the SQLite store. All state sits
/// behind one mutex, so check and write happen atomically.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| EnrollError::PoolError {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryStore {
    async fn list(&self, course_id: Option<i32>) -> Result<Vec<EnrollmentView>> {
        let state = self.state()?;
        Ok(state
            .enrollments
            .values()
            .filter(|e| course_id.map_or(true, |c| e.course_id == c))
            .filter_map(|e| state.view(e))
            .collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Enrollment>> {
        Ok(self.state()?.enrollments.get(&id).cloned())
    }

    async fn insert(&self, enrollment: NewEnrollment) -> Result<Enrollment> {
        let mut state = self.state()?;
        state.check_references(&enrollment)?;
        state.check_unique(&enrollment, None)?;

        let created = enrollment.with_id(allocate(&mut state.last_ids.enrollment));
        state.enrollments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, enrollment: NewEnrollment) -> Result<Enrollment> {
        let mut state = self.state()?;
        if !state.enrollments.contains_key(&id) {
            return Err(EnrollError::not_found(id));
        }
        state.check_references(&enrollment)?;
        state.check_unique(&enrollment, Some(id))?;

        let updated = enrollment.with_id(id);
        state.enrollments.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<Enrollment> {
        self.state()?
            .enrollments
            .remove(&id)
            .ok_or_else(|| EnrollError::not_found(id))
    }

    async fn search_students(&self, term: &str) -> Result<Vec<StudentMatch>> {
        let state = self.state()?;
        Ok(state
            .students
            .values()
            .map(|s| StudentMatch {
                id: s.id,
                name: s.full_name(),
            })
            .filter(|m| m.name.contains(term))
            .collect())
    }

    async fn lookups(&self) -> Result<Lookups> {
        let state = self.state()?;
        Ok(Lookups {
            courses: state
                .courses
                .values()
                .map(|c| LookupOption {
                    id: c.id,
                    label: c.title.clone(),
                })
                .collect(),
            students: state
                .students
                .values()
                .map(|s| LookupOption {
                    id: s.id,
                    label: s.full_name(),
                })
                .collect(),
            lecturers: state
                .lecturers
                .values()
                .map(|l| LookupOption {
                    id: l.id,
                    label: l.full_name(),
                })
                .collect(),
        })
    }
}

#[async_trait]
impl Roster for MemoryStore {
    async fn add_course(&self, course: NewCourse) -> Result<Course> {
        let mut state = self.state()?;
        let course = Course {
            id: allocate(&mut state.last_ids.course),
            title: course.title,
        };
        state.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn add_student(&self, student: NewPerson) -> Result<Student> {
        let mut state = self.state()?;
        let student = Student {
            id: allocate(&mut state.last_ids.student),
            first_name: student.first_name,
            last_name: student.last_name,
        };
        state.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn add_lecturer(&self, lecturer: NewPerson) -> Result<Lecturer> {
        let mut state = self.state()?;
        let lecturer = Lecturer {
            id: allocate(&mut state.last_ids.lecturer),
            first_name: lecturer.first_name,
            last_name: lecturer.last_name,
        };
        state.lecturers.insert(lecturer.id, lecturer.clone());
        Ok(lecturer)
    }
}
