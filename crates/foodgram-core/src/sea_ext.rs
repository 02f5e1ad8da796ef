use sea_orm::{DbErr, SqlErr};

/// Classify driver errors that repositories translate into domain outcomes.
pub trait DbErrExt {
    /// Insert hit a unique index or composite primary key.
    fn is_unique_violation(&self) -> bool;
    /// Insert referenced a row that no longer exists.
    fn is_foreign_key_violation(&self) -> bool;
}

impl DbErrExt for DbErr {
    fn is_unique_violation(&self) -> bool {
        matches!(self.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }

    fn is_foreign_key_violation(&self) -> bool {
        matches!(self.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
    }
}
