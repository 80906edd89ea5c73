pub mod consumption;
pub mod document_number;
pub mod purchases;
pub mod stock;
pub mod supplies;
pub mod totals;

use sea_orm::{DbErr, SqlErr};

use crate::errors::ServiceError;

/// Maps storage constraint violations to client errors. Duplicate line items
/// and dangling references are the caller's mistake, not a server fault, and
/// are never retried.
pub(crate) fn map_constraint_err(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ServiceError::Conflict(msg),
        _ => ServiceError::db_error(e),
    }
}
