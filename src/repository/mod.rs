//! Database repository layer

pub mod location_repo;
pub mod pet_repo;
pub mod user_repo;

pub use location_repo::*;
pub use pet_repo::*;
pub use user_repo::*;

use crate::error::AppError;

/// 唯一约束冲突（并发注册同一邮箱）转换为 EmailTaken
pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::EmailTaken,
        _ => AppError::Database(e),
    }
}

/// 外键约束冲突（SQLSTATE 23503）转换为 400
///
/// 处理器先做存在性检查，这里兜住检查与写入之间的并发修改
pub(crate) fn map_foreign_key_violation(
    e: sqlx::Error,
    message: impl FnOnce() -> String,
) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::BadRequest(message())
        }
        _ => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug, Clone, Copy)]
    enum Violation {
        Unique,
        ForeignKey,
        Other,
    }

    #[derive(Debug)]
    struct ConstraintError(Violation);

    impl fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint error: {:?}", self.0)
        }
    }

    impl StdError for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            let code = match self.0 {
                Violation::Unique => "23505",
                Violation::ForeignKey => "23503",
                Violation::Other => "23514",
            };
            Some(Cow::Borrowed(code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                Violation::Unique => ErrorKind::UniqueViolation,
                Violation::ForeignKey => ErrorKind::ForeignKeyViolation,
                Violation::Other => ErrorKind::CheckViolation,
            }
        }
    }

    fn db_error(violation: Violation) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintError(violation)))
    }

    #[test]
    fn test_foreign_key_violation_is_bad_request() {
        let error = map_foreign_key_violation(db_error(Violation::ForeignKey), || {
            "Location 7 does not exist".to_string()
        });

        match error {
            AppError::BadRequest(msg) => assert_eq!(msg, "Location 7 does not exist"),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_stay_database_errors() {
        let check = map_foreign_key_violation(db_error(Violation::Other), String::new);
        assert!(matches!(check, AppError::Database(_)));

        let missing = map_foreign_key_violation(sqlx::Error::RowNotFound, String::new);
        assert!(matches!(missing, AppError::Database(_)));

        let unique = map_foreign_key_violation(db_error(Violation::Unique), String::new);
        assert!(matches!(unique, AppError::Database(_)));
    }

    #[test]
    fn test_unique_violation_is_email_taken() {
        assert!(matches!(
            map_unique_violation(db_error(Violation::Unique)),
            AppError::EmailTaken
        ));
        assert!(matches!(
            map_unique_violation(db_error(Violation::ForeignKey)),
            AppError::Database(_)
        ));
    }
}
