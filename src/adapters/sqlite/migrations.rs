//! Tables and indexes for the enrollment store. Every statement is
//! idempotent, so this runs on every start-up.

use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;

use crate::utils::error::Result;

pub fn migrate(conn: &mut SqliteConnection) -> Result<()> {
    conn.batch_execute(
        "
        PRAGMA journal_mode = WAL;

        CREATE TABLE IF NOT EXISTS courses (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            title   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS students (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lecturers (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id    INTEGER NOT NULL REFERENCES courses(id),
            student_id   INTEGER NOT NULL REFERENCES students(id),
            lecturer_id  INTEGER REFERENCES lecturers(id),
            grade        REAL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS ux_enrollments_course_student
            ON enrollments(course_id, student_id);
        CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id);
        CREATE INDEX IF NOT EXISTS idx_enrollments_lecturer ON enrollments(lecturer_id);
        ",
    )?;
    Ok(())
}
