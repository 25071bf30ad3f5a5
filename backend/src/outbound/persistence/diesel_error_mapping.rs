//! Diesel and pool failures mapped onto port error constructors.
//!
//! Every repository funnels its failures through here so connection problems
//! surface as `Connection` (HTTP 503) and everything else as `Query`
//! (HTTP 500). Constraint names are matched by the callers that give them
//! meaning, using [`violates_unique`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool checkout or build failure onto a connection error.
pub fn pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    debug!(reason = %message, "database pool unavailable");
    connection(message)
}

/// Map a Diesel failure onto query or connection constructors.
///
/// Messages are fixed strings; the driver's own text only reaches the debug
/// log because it can echo row values.
pub fn diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => debug!(
            ?kind,
            db_message = info.message(),
            constraint = info.constraint_name(),
            "diesel operation failed"
        ),
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        )
        | DieselError::BrokenTransactionManager => connection("database connection error"),
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            query("row rejected by a table constraint")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            query("referenced row does not exist")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("concurrent update aborted the transaction")
        }
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        _ => query("database error"),
    }
}

/// Whether `error` is a unique violation of `constraint`.
pub fn violates_unique(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct Info(Option<&'static str>);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "boom"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(constraint)))
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(&'static str),
    }

    fn map(error: DieselError) -> Mapped {
        diesel_error(error, Mapped::Query, Mapped::Connection)
    }

    #[rstest]
    #[case(DatabaseErrorKind::ClosedConnection)]
    #[case(DatabaseErrorKind::UnableToSendCommand)]
    fn lost_connections_map_to_connection_errors(#[case] kind: DatabaseErrorKind) {
        assert!(matches!(map(database(kind, None)), Mapped::Connection(_)));
    }

    #[rstest]
    #[case(DatabaseErrorKind::CheckViolation, "row rejected by a table constraint")]
    #[case(DatabaseErrorKind::ForeignKeyViolation, "referenced row does not exist")]
    #[case(DatabaseErrorKind::UniqueViolation, "database error")]
    fn constraint_failures_map_to_fixed_query_messages(
        #[case] kind: DatabaseErrorKind,
        #[case] expected: &'static str,
    ) {
        assert_eq!(map(database(kind, Some("c"))), Mapped::Query(expected));
    }

    #[rstest]
    fn pool_failures_keep_their_message() {
        let mapped = pool_error(PoolError::checkout("timed out"), |m| m);
        assert_eq!(mapped, "timed out");
    }

    #[rstest]
    #[case(Some("users_email_key"), true)]
    #[case(Some("other_key"), false)]
    #[case(None, false)]
    fn unique_violations_match_by_constraint(
        #[case] constraint: Option<&'static str>,
        #[case] expected: bool,
    ) {
        let error = database(DatabaseErrorKind::UniqueViolation, constraint);
        assert_eq!(violates_unique(&error, "users_email_key"), expected);
    }
}
