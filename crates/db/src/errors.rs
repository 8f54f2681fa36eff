//! Classification of sqlx failures carried inside `anyhow::Error`.

const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

fn sqlx_error(err: &anyhow::Error) -> Option<&sqlx::Error> {
    err.chain().find_map(|cause| cause.downcast_ref::<sqlx::Error>())
}

fn database_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    sqlx_error(err)
        .and_then(database_code)
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Failures where the same statement may succeed if simply tried again.
pub fn is_transient(err: &anyhow::Error) -> bool {
    match sqlx_error(err) {
        Some(sqlx::Error::Io(_)) | Some(sqlx::Error::PoolTimedOut) => true,
        Some(other) => database_code(other)
            .is_some_and(|code| code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED),
        None => false,
    }
}
