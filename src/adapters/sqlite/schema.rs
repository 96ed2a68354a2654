// Mirrors the DDL in `migrations.rs`.

diesel::table! {
    courses (id) {
        id -> Integer,
        title -> Text,
    }
}

diesel::table! {
    enrollments (id) {
        id -> Integer,
        course_id -> Integer,
        student_id -> Integer,
        lecturer_id -> Nullable<Integer>,
        grade -> Nullable<Double>,
    }
}

diesel::table! {
    lecturers (id) {
        id -> Integer,
        first_name -> Text,
        last_name -> Text,
    }
}

diesel::table! {
    students (id) {
        id -> Integer,
        first_name -> Text,
        last_name -> Text,
    }
}

diesel::joinable!(enrollments -> courses (course_id));
diesel::joinable!(enrollments -> lecturers (lecturer_id));
diesel::joinable!(enrollments -> students (student_id));

diesel::allow_tables_to_appear_in_same_query!(courses, enrollments, lecturers, students,);
