use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::sync::OnceCell;

use crate::error::StoreError;

/// Process-wide pool, created on first use and reused afterwards / 全局连接池
static POOL: OnceCell<SqlitePool> = OnceCell::const_new();

/// Open (once) the shared connection pool. Later calls return the cached pool
/// regardless of the arguments.
pub async fn connect_cached(database_url: &str, max_connections: u32) -> Result<SqlitePool, StoreError> {
    let pool = POOL
        .get_or_try_init(|| async {
            tracing::info!("Opening certificate database");
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect(database_url)
                .await
        })
        .await?;
    Ok(pool.clone())
}

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS certificates (
            id TEXT PRIMARY KEY,
            certificate_number TEXT NOT NULL UNIQUE,
            holder TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            issue_date TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('Valid', 'Expired', 'Revoked')),
            compliance_body TEXT NOT NULL DEFAULT '',
            country_of_origin TEXT NOT NULL DEFAULT '',
            design_url TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_certificates_holder ON certificates(holder)")
        .execute(pool)
        .await?;

    tracing::debug!("Certificate schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let insert = "INSERT INTO certificates (id, certificate_number, issue_date, status) VALUES (?, ?, '2024-01-01', 'Valid')";
        sqlx::query(insert).bind("a").bind("CERT-1").execute(&pool).await.unwrap();
        // certificate_number is unique
        assert!(sqlx::query(insert).bind("b").bind("CERT-1").execute(&pool).await.is_err());
    }

    #[tokio::test]
    async fn test_connect_cached_reuses_pool() {
        let first = connect_cached("sqlite::memory:", 1).await.unwrap();
        run_migrations(&first).await.unwrap();
        sqlx::query("INSERT INTO certificates (id, certificate_number, issue_date, status) VALUES ('x', 'CERT-X', '2024-01-01', 'Valid')")
            .execute(&first)
            .await
            .unwrap();

        // A different URL still yields the memoized pool
        let second = connect_cached("sqlite::memory:?other", 1).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certificates WHERE id = 'x'")
            .fetch_one(&second)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
