//! SQLite enrollment store on diesel, pooled with deadpool-diesel.
//!
//! Every call checks out one pooled connection and runs on deadpool's
//! blocking interaction threads. Writes run in an immediate transaction and
//! the unique index on `(course_id, student_id)` decides "already enrolled".

pub mod migrations;
pub mod rows;
pub mod schema;

use async_trait::async_trait;
use deadpool_diesel::sqlite::{Manager, Pool, Runtime};
use diesel::connection::SimpleConnection;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

use self::rows::{CourseRow, EnrollmentRow, LecturerRow, StudentRow};
use self::schema::{courses, enrollments, lecturers, students};
use crate::config::DatabaseConfig;
use crate::core::{
    Course, Enrollment, EnrollmentRepository, EnrollmentView, Lecturer, LookupOption, Lookups,
    NewCourse, NewEnrollment, NewPerson, Roster, Student, StudentMatch,
};
use crate::utils::error::{EnrollError, FieldError, Result};
use crate::utils::validation::FieldErrors;

diesel::define_sql_function! {
    /// 1-based position of `needle` in `haystack`, 0 when absent. Case-sensitive.
    fn instr(haystack: diesel::sql_types::Text, needle: diesel::sql_types::Text) -> diesel::sql_types::Integer;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool,
    busy_timeout_ms: u64,
}

impl SqliteStore {
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let manager = Manager::new(config.url.clone(), Runtime::Tokio1);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .build()
            .map_err(|e| EnrollError::PoolError {
                message: format!("unable to build pool for {}: {}", config.url, e),
            })?;

        tracing::debug!(
            "SQLite pool ready: {} (max {} connections)",
            config.url,
            config.max_connections
        );

        Ok(Self {
            pool,
            busy_timeout_ms: config.busy_timeout_ms,
        })
    }

    /// Connects and brings the schema up to date.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let store = Self::connect(config)?;
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<()> {
        self.interact(migrations::migrate).await?;
        tracing::info!("🗄️ Database schema is up to date");
        Ok(())
    }

    async fn interact<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.pool.get().await.map_err(|e| EnrollError::PoolError {
            message: e.to_string(),
        })?;

        let busy_timeout_ms = self.busy_timeout_ms;
        conn.interact(move |conn| {
            // 每個連線都要設定：foreign_keys 與 busy_timeout 不會持久化
            conn.batch_execute(&format!(
                "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
                busy_timeout_ms
            ))?;
            f(conn)
        })
        .await
        .map_err(|e| EnrollError::PoolError {
            message: format!("database task failed: {}", e),
        })?
    }
}

fn check_references(conn: &mut SqliteConnection, enrollment: &NewEnrollment) -> Result<()> {
    let mut errors = FieldErrors::new();

    let course = diesel::select(exists(
        courses::table.filter(courses::id.eq(enrollment.course_id)),
    ))
    .get_result::<bool>(conn)?;
    if !course {
        errors.push("courseId", format!("course {} does not exist", enrollment.course_id));
    }

    let student = diesel::select(exists(
        students::table.filter(students::id.eq(enrollment.student_id)),
    ))
    .get_result::<bool>(conn)?;
    if !student {
        errors.push(
            "studentId",
            format!("student {} does not exist", enrollment.student_id),
        );
    }

    if let Some(lecturer_id) = enrollment.lecturer_id {
        let lecturer = diesel::select(exists(
            lecturers::table.filter(lecturers::id.eq(lecturer_id)),
        ))
        .get_result::<bool>(conn)?;
        if !lecturer {
            errors.push("lecturerId", format!("lecturer {} does not exist", lecturer_id));
        }
    }

    errors.into_result()
}

fn map_write_error(err: DieselError, enrollment: &NewEnrollment) -> EnrollError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            EnrollError::AlreadyEnrolled {
                course_id: enrollment.course_id,
                student_id: enrollment.student_id,
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            EnrollError::ValidationError {
                errors: vec![FieldError::new("_", info.message())],
            }
        }
        other => EnrollError::DatabaseError(other),
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteStore {
    async fn list(&self, course_id: Option<i32>) -> Result<Vec<EnrollmentView>> {
        self.interact(move |conn| {
            let mut query = enrollments::table
                .inner_join(courses::table)
                .inner_join(students::table)
                .left_join(lecturers::table)
                .select((
                    enrollments::all_columns,
                    courses::all_columns,
                    students::all_columns,
                    lecturers::all_columns.nullable(),
                ))
                .order_by(enrollments::id)
                .into_boxed();
            if let Some(course_id) = course_id {
                query = query.filter(enrollments::course_id.eq(course_id));
            }

            let rows = query
                .load::<(EnrollmentRow, CourseRow, StudentRow, Option<LecturerRow>)>(conn)?;
            Ok(rows
                .into_iter()
                .map(|(enrollment, course, student, lecturer)| EnrollmentView {
                    enrollment: enrollment.into(),
                    course: course.into(),
                    student: student.into(),
                    lecturer: lecturer.map(Lecturer::from),
                })
                .collect())
        })
        .await
    }

    async fn find(&self, id: i32) -> Result<Option<Enrollment>> {
        self.interact(move |conn| {
            let row = enrollments::table
                .find(id)
                .select(EnrollmentRow::as_select())
                .first::<EnrollmentRow>(conn)
                .optional()?;
            Ok(row.map(Enrollment::from))
        })
        .await
    }

    async fn insert(&self, enrollment: NewEnrollment) -> Result<Enrollment> {
        self.interact(move |conn| {
            conn.immediate_transaction::<_, EnrollError, _>(|conn| {
                check_references(conn, &enrollment)?;

                let row = diesel::insert_into(enrollments::table)
                    .values((
                        enrollments::course_id.eq(enrollment.course_id),
                        enrollments::student_id.eq(enrollment.student_id),
                        enrollments::lecturer_id.eq(enrollment.lecturer_id),
                        enrollments::grade.eq(enrollment.grade),
                    ))
                    .returning(EnrollmentRow::as_returning())
                    .get_result::<EnrollmentRow>(conn)
                    .map_err(|e| map_write_error(e, &enrollment))?;
                Ok(Enrollment::from(row))
            })
        })
        .await
    }

    async fn update(&self, id: i32, enrollment: NewEnrollment) -> Result<Enrollment> {
        self.interact(move |conn| {
            conn.immediate_transaction::<_, EnrollError, _>(|conn| {
                let found = diesel::select(exists(enrollments::table.find(id)))
                    .get_result::<bool>(conn)?;
                if !found {
                    return Err(EnrollError::not_found(id));
                }
                check_references(conn, &enrollment)?;

                let row = diesel::update(enrollments::table.find(id))
                    .set((
                        enrollments::course_id.eq(enrollment.course_id),
                        enrollments::student_id.eq(enrollment.student_id),
                        enrollments::lecturer_id.eq(enrollment.lecturer_id),
                        enrollments::grade.eq(enrollment.grade),
                    ))
                    .returning(EnrollmentRow::as_returning())
                    .get_result::<EnrollmentRow>(conn)
                    .map_err(|e| map_write_error(e, &enrollment))?;
                Ok(Enrollment::from(row))
            })
        })
        .await
    }

    async fn delete(&self, id: i32) -> Result<Enrollment> {
        self.interact(move |conn| {
            conn.immediate_transaction::<_, EnrollError, _>(|conn| {
                let row = enrollments::table
                    .find(id)
                    .select(EnrollmentRow::as_select())
                    .first::<EnrollmentRow>(conn)
                    .optional()?
                    .ok_or_else(|| EnrollError::not_found(id))?;

                diesel::delete(enrollments::table.find(id)).execute(conn)?;
                Ok(Enrollment::from(row))
            })
        })
        .await
    }

    async fn search_students(&self, term: &str) -> Result<Vec<StudentMatch>> {
        let term = term.to_string();
        self.interact(move |conn| {
            let full_name = students::first_name.concat(" ").concat(students::last_name);
            let rows = students::table
                .filter(instr(full_name, term).gt(0))
                .order_by(students::id)
                .select(StudentRow::as_select())
                .load::<StudentRow>(conn)?;

            Ok(rows
                .into_iter()
                .map(|row| {
                    let student = Student::from(row);
                    StudentMatch {
                        id: student.id,
                        name: student.full_name(),
                    }
                })
                .collect())
        })
        .await
    }

    async fn lookups(&self) -> Result<Lookups> {
        self.interact(|conn| {
            let courses = courses::table
                .order_by(courses::id)
                .select(CourseRow::as_select())
                .load::<CourseRow>(conn)?;
            let students = students::table
                .order_by(students::id)
                .select(StudentRow::as_select())
                .load::<StudentRow>(conn)?;
            let lecturers = lecturers::table
                .order_by(lecturers::id)
                .select(LecturerRow::as_select())
                .load::<LecturerRow>(conn)?;

            Ok(Lookups {
                courses: courses
                    .into_iter()
                    .map(|c| LookupOption {
                        id: c.id,
                        label: c.title,
                    })
                    .collect(),
                students: students
                    .into_iter()
                    .map(|s| {
                        let s = Student::from(s);
                        LookupOption {
                            id: s.id,
                            label: s.full_name(),
                        }
                    })
                    .collect(),
                lecturers: lecturers
                    .into_iter()
                    .map(|l| {
                        let l = Lecturer::from(l);
                        LookupOption {
                            id: l.id,
                            label: l.full_name(),
                        }
                    })
                    .collect(),
            })
        })
        .await
    }
}

#[async_trait]
impl Roster for SqliteStore {
    async fn add_course(&self, course: NewCourse) -> Result<Course> {
        self.interact(move |conn| {
            let row = diesel::insert_into(courses::table)
                .values(courses::title.eq(course.title))
                .returning(CourseRow::as_returning())
                .get_result::<CourseRow>(conn)?;
            Ok(Course::from(row))
        })
        .await
    }

    async fn add_student(&self, student: NewPerson) -> Result<Student> {
        self.interact(move |conn| {
            let row = diesel::insert_into(students::table)
                .values((
                    students::first_name.eq(student.first_name),
                    students::last_name.eq(student.last_name),
                ))
                .returning(StudentRow::as_returning())
                .get_result::<StudentRow>(conn)?;
            Ok(Student::from(row))
        })
        .await
    }

    async fn add_lecturer(&self, lecturer: NewPerson) -> Result<Lecturer> {
        self.interact(move |conn| {
            let row = diesel::insert_into(lecturers::table)
                .values((
                    lecturers::first_name.eq(lecturer.first_name),
                    lecturers::last_name.eq(lecturer.last_name),
                ))
                .returning(LecturerRow::as_returning())
                .get_result::<LecturerRow>(conn)?;
            Ok(Lecturer::from(row))
        })
        .await
    }
}
