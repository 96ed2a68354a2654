use crate::core::{
    AddStudentOutcome, Enrollment, EnrollmentForm, EnrollmentRepository, EnrollmentView, Lookups,
    NewEnrollment, StudentMatch,
};
use crate::utils::error::{EnrollError, ErrorCategory, Result};
use crate::utils::validation::{self, FieldErrors};

pub const ADDED_MESSAGE: &str = "Student added successfully.";
pub const ALREADY_ENROLLED_MESSAGE: &str = "Student is already enrolled into course.";
pub const WRONG_DATA_MESSAGE: &str = "Provided data is wrong.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please contact your web administrator.";

impl TryFrom<&EnrollmentForm> for NewEnrollment {
    type Error = EnrollError;

    fn try_from(form: &EnrollmentForm) -> Result<Self> {
        let course_id = validation::validate_required_field("courseId", &form.course_id).copied();
        let student_id =
            validation::validate_required_field("studentId", &form.student_id).copied();
        let grade = form
            .grade
            .map(|grade| validation::validate_grade("grade", grade))
            .transpose();

        match (course_id, student_id, grade) {
            (Ok(course_id), Ok(student_id), Ok(_)) => Ok(NewEnrollment {
                course_id,
                student_id,
                lecturer_id: form.lecturer_id,
                grade: form.grade,
            }),
            // 至少一個欄位失敗，全部收集後一次回報
            (course_id, student_id, grade) => {
                let mut errors = FieldErrors::new();
                errors.check(course_id);
                errors.check(student_id);
                errors.check(grade);
                Err(errors.into_error())
            }
        }
    }
}

/// Enrollment use cases on top of a repository.
pub struct EnrollmentService<R: EnrollmentRepository> {
    repo: R,
}

impl<R: EnrollmentRepository> EnrollmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<EnrollmentView>> {
        let views = self.repo.list(None).await?;
        tracing::debug!("Listed {} enrollments", views.len());
        Ok(views)
    }

    /// Roster of one course. A missing course id matches no enrollment.
    pub async fn list_by_course(&self, course_id: Option<i32>) -> Result<Vec<EnrollmentView>> {
        match course_id {
            Some(course_id) => self.repo.list(Some(course_id)).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, id: Option<i32>) -> Result<Enrollment> {
        let id = id.ok_or_else(|| EnrollError::bad_request("An enrollment id is required"))?;
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| EnrollError::not_found(id))
    }

    pub async fn create(&self, form: &EnrollmentForm) -> Result<Enrollment> {
        let new = NewEnrollment::try_from(form)?;
        let created = self.repo.insert(new).await?;

        tracing::info!(
            "✅ Enrollment {} created (course {}, student {})",
            created.id,
            created.course_id,
            created.student_id
        );
        Ok(created)
    }

    /// Guarded add used by the course page widget. Never fails: every
    /// outcome is folded into a success flag and a message.
    pub async fn add_student_to_course(
        &self,
        course_id: Option<i32>,
        student_id: Option<i32>,
    ) -> AddStudentOutcome {
        let form = EnrollmentForm {
            course_id,
            student_id,
            ..EnrollmentForm::default()
        };

        match self.create(&form).await {
            Ok(_) => AddStudentOutcome::success(ADDED_MESSAGE),
            Err(e) => match e.category() {
                ErrorCategory::Conflict => {
                    tracing::debug!("Guarded add rejected: {}", e);
                    AddStudentOutcome::failure(ALREADY_ENROLLED_MESSAGE)
                }
                ErrorCategory::Validation | ErrorCategory::Input => {
                    tracing::debug!("Guarded add rejected: {}", e);
                    AddStudentOutcome::failure(WRONG_DATA_MESSAGE)
                }
                _ => {
                    tracing::error!(
                        "❌ Guarded add failed for course {:?}, student {:?}: {} (Category: {:?}, Severity: {:?})",
                        course_id,
                        student_id,
                        e,
                        e.category(),
                        e.severity()
                    );
                    AddStudentOutcome::failure(SERVER_ERROR_MESSAGE)
                }
            },
        }
    }

    pub async fn update(&self, id: i32, form: &EnrollmentForm) -> Result<Enrollment> {
        if let Some(form_id) = form.id {
            if form_id != id {
                return Err(EnrollError::bad_request(format!(
                    "Enrollment id {} does not match the requested id {}",
                    form_id, id
                )));
            }
        }

        let new = NewEnrollment::try_from(form)?;
        let updated = self.repo.update(id, new).await?;

        tracing::info!("✏️ Enrollment {} updated", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<Enrollment> {
        let removed = self.repo.delete(id).await?;
        tracing::info!("🗑️ Enrollment {} deleted", removed.id);
        Ok(removed)
    }

    pub async fn search_students_by_name(&self, term: &str) -> Result<Vec<StudentMatch>> {
        self.repo.search_students(term).await
    }

    pub async fn lookups(&self) -> Result<Lookups> {
        self.repo.lookups().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::core::{NewCourse, NewPerson, Roster};
    use async_trait::async_trait;

    struct Fixture {
        service: EnrollmentService<MemoryStore>,
        course: i32,
        other_course: i32,
        ann: i32,
        bob: i32,
        lecturer: i32,
    }

    fn person(first: &str, last: &str) -> NewPerson {
        NewPerson {
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let course = store
            .add_course(NewCourse {
                title: "Databases".to_string(),
            })
            .await
            .unwrap()
            .id;
        let other_course = store
            .add_course(NewCourse {
                title: "Networks".to_string(),
            })
            .await
            .unwrap()
            .id;
        let ann = store.add_student(person("Ann", "Smith")).await.unwrap().id;
        let bob = store.add_student(person("Bob", "Joanna")).await.unwrap().id;
        store.add_student(person("Carl", "Anders")).await.unwrap();
        let lecturer = store.add_lecturer(person("Grace", "Hopper")).await.unwrap().id;

        Fixture {
            service: EnrollmentService::new(store),
            course,
            other_course,
            ann,
            bob,
            lecturer,
        }
    }

    fn form(course: i32, student: i32) -> EnrollmentForm {
        EnrollmentForm {
            course_id: Some(course),
            student_id: Some(student),
            ..EnrollmentForm::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let f = fixture().await;

        let plain = f.service.create(&form(f.course, f.ann)).await.unwrap();
        let full = f
            .service
            .create(&EnrollmentForm {
                lecturer_id: Some(f.lecturer),
                grade: Some(91.5),
                ..form(f.course, f.bob)
            })
            .await
            .unwrap();

        assert_eq!(f.service.get(Some(plain.id)).await.unwrap(), plain);
        let fetched = f.service.get(Some(full.id)).await.unwrap();
        assert_eq!(fetched.lecturer_id, Some(f.lecturer));
        assert_eq!(fetched.grade, Some(91.5));
    }

    #[tokio::test]
    async fn test_create_reports_every_field_error() {
        let f = fixture().await;

        let err = f
            .service
            .create(&EnrollmentForm {
                grade: Some(f64::NAN),
                ..EnrollmentForm::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Validation);
        let fields: Vec<String> = err.field_errors().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["courseId", "studentId", "grade"]);
    }

    #[tokio::test]
    async fn test_missing_student_names_student_field() {
        let f = fixture().await;

        let err = f
            .service
            .create(&EnrollmentForm {
                course_id: Some(f.course),
                ..EnrollmentForm::default()
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.field_errors(),
            vec![crate::utils::error::FieldError::new("studentId", "is required")]
        );
    }

    #[tokio::test]
    async fn test_negative_grade_round_trips() {
        let f = fixture().await;

        let created = f
            .service
            .create(&EnrollmentForm {
                grade: Some(-2.5),
                ..form(f.course, f.ann)
            })
            .await
            .unwrap();

        assert_eq!(f.service.get(Some(created.id)).await.unwrap().grade, Some(-2.5));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_references() {
        let f = fixture().await;

        let err = f.service.create(&form(999, f.ann)).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.field_errors()[0].field, "courseId");
    }

    #[tokio::test]
    async fn test_get_distinguishes_bad_request_and_not_found() {
        let f = fixture().await;

        assert_eq!(
            f.service.get(None).await.unwrap_err().category(),
            ErrorCategory::Input
        );
        assert_eq!(
            f.service.get(Some(4242)).await.unwrap_err().category(),
            ErrorCategory::NotFound
        );
    }

    #[tokio::test]
    async fn test_guarded_add_twice() {
        let f = fixture().await;

        let first = f.service.add_student_to_course(Some(f.course), Some(f.ann)).await;
        assert!(first.success);
        assert_eq!(first.message, ADDED_MESSAGE);

        let second = f.service.add_student_to_course(Some(f.course), Some(f.ann)).await;
        assert!(!second.success);
        assert_eq!(second.message, ALREADY_ENROLLED_MESSAGE);

        assert_eq!(f.service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guarded_add_with_missing_data() {
        let f = fixture().await;

        let outcome = f.service.add_student_to_course(Some(f.course), None).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, WRONG_DATA_MESSAGE);
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let f = fixture().await;
        let created = f.service.create(&form(f.course, f.ann)).await.unwrap();

        let updated = f
            .service
            .update(
                created.id,
                &EnrollmentForm {
                    id: Some(created.id),
                    lecturer_id: Some(f.lecturer),
                    grade: Some(64.0),
                    ..form(f.other_course, f.ann)
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.course_id, f.other_course);
        assert_eq!(updated.grade, Some(64.0));
        assert_eq!(f.service.get(Some(created.id)).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_and_mismatched_ids() {
        let f = fixture().await;

        let missing = f.service.update(77, &form(f.course, f.ann)).await.unwrap_err();
        assert_eq!(missing.category(), ErrorCategory::NotFound);

        let mismatched = f
            .service
            .update(
                77,
                &EnrollmentForm {
                    id: Some(78),
                    ..form(f.course, f.ann)
                },
            )
            .await
            .unwrap_err();
        assert_eq!(mismatched.category(), ErrorCategory::Input);
    }

    #[tokio::test]
    async fn test_update_onto_existing_pair_conflicts() {
        let f = fixture().await;
        f.service.create(&form(f.course, f.ann)).await.unwrap();
        let other = f.service.create(&form(f.course, f.bob)).await.unwrap();

        let err = f
            .service
            .update(other.id, &form(f.course, f.ann))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[tokio::test]
    async fn test_delete() {
        let f = fixture().await;
        let created = f.service.create(&form(f.course, f.ann)).await.unwrap();

        assert_eq!(f.service.delete(created.id).await.unwrap(), created);
        assert_eq!(
            f.service.delete(created.id).await.unwrap_err().category(),
            ErrorCategory::NotFound
        );
    }

    #[tokio::test]
    async fn test_list_by_course() {
        let f = fixture().await;
        f.service.create(&form(f.course, f.ann)).await.unwrap();
        f.service.create(&form(f.other_course, f.ann)).await.unwrap();
        f.service.create(&form(f.course, f.bob)).await.unwrap();

        let roster = f.service.list_by_course(Some(f.course)).await.unwrap();
        let students: Vec<&str> = roster
            .iter()
            .map(|v| v.student.first_name.as_str())
            .collect();
        assert_eq!(students, vec!["Ann", "Bob"]);
        assert!(roster.iter().all(|v| v.course.title == "Databases"));

        assert!(f.service.list_by_course(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_students_by_name() {
        let f = fixture().await;

        let hits = f.service.search_students_by_name("ann").await.unwrap();
        let names: Vec<String> = hits.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Bob Joanna"]);

        let hits = f.service.search_students_by_name("Ann").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, f.ann);
    }

    struct BrokenRepo;

    #[async_trait]
    impl EnrollmentRepository for BrokenRepo {
        async fn list(&self, _course_id: Option<i32>) -> Result<Vec<EnrollmentView>> {
            Err(EnrollError::PoolError {
                message: "pool closed".to_string(),
            })
        }

        async fn find(&self, _id: i32) -> Result<Option<Enrollment>> {
            Ok(None)
        }

        async fn insert(&self, _enrollment: NewEnrollment) -> Result<Enrollment> {
            Err(EnrollError::DatabaseError(
                diesel::result::Error::BrokenTransactionManager,
            ))
        }

        async fn update(&self, id: i32, _enrollment: NewEnrollment) -> Result<Enrollment> {
            Err(EnrollError::not_found(id))
        }

        async fn delete(&self, id: i32) -> Result<Enrollment> {
            Err(EnrollError::not_found(id))
        }

        async fn search_students(&self, _term: &str) -> Result<Vec<StudentMatch>> {
            Ok(Vec::new())
        }

        async fn lookups(&self) -> Result<Lookups> {
            Ok(Lookups::default())
        }
    }

    #[tokio::test]
    async fn test_guarded_add_hides_storage_failures() {
        let service = EnrollmentService::new(BrokenRepo);

        let outcome = service.add_student_to_course(Some(1), Some(2)).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, SERVER_ERROR_MESSAGE);
    }
}
