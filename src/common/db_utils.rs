// src/common/db_utils.rs

use sqlx::{Executor, Postgres};

use crate::common::error::AppError;

/// Classificação dos erros do Postgres que interessam para a API.
#[derive(Debug, PartialEq, Eq)]
pub enum DbErrorKind {
    NotFound,
    UniqueViolation(String),
    ForeignKeyViolation(String),
    Other,
}

pub fn classify_db_error(err: &sqlx::Error) -> DbErrorKind {
    match err {
        sqlx::Error::RowNotFound => DbErrorKind::NotFound,
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                DbErrorKind::UniqueViolation(constraint)
            } else if db_err.is_foreign_key_violation() {
                DbErrorKind::ForeignKeyViolation(constraint)
            } else {
                DbErrorKind::Other
            }
        }
        _ => DbErrorKind::Other,
    }
}

/// Converte violação de FK num DELETE em "registro em uso".
/// Qualquer outro erro segue o caminho normal.
pub fn in_use_on_fk(entity: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match classify_db_error(&e) {
        DbErrorKind::ForeignKeyViolation(_) => AppError::ResourceInUse(entity),
        _ => AppError::DatabaseError(e),
    }
}

// ---
// Lock consultivo por transação (pg_advisory_xact_lock)
// ---
/// Serializa quem disputa a mesma chave até o fim da transação corrente.
/// Só faz sentido dentro de uma transação: fora dela o lock é liberado na hora.
pub async fn advisory_xact_lock<'e, E>(executor: E, key: &str) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(key)
        .execute(executor)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_classified_as_not_found() {
        assert_eq!(classify_db_error(&sqlx::Error::RowNotFound), DbErrorKind::NotFound);
    }

    #[test]
    fn pool_errors_are_not_business_errors() {
        assert_eq!(classify_db_error(&sqlx::Error::PoolClosed), DbErrorKind::Other);

        let mapped = in_use_on_fk("vendor")(sqlx::Error::PoolClosed);
        assert!(matches!(mapped, AppError::DatabaseError(_)));
    }
}
