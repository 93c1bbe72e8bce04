//! Certificate store - read-only access to the certificates table / 证书存储
//!
//! Free-text lookups run in two steps: SQLite narrows candidates with `LIKE`
//! on each clause's first token, then the loose regex decides. SQLite only
//! folds case for ASCII, so the narrowing is skipped for any token the
//! regex could match through a non-ASCII case variant.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::StoreError;
use crate::models::Certificate;
use crate::query::{Filter, TextClause};

const SELECT_CERTIFICATES: &str = "SELECT id, certificate_number, holder, address, issue_date, status, \
     compliance_body, country_of_origin, design_url FROM certificates";

#[derive(Clone)]
pub struct CertificateStore {
    db: SqlitePool,
}

/// Escape `%`, `_` and `\` for a LIKE ... ESCAPE '\' pattern
fn escape_like(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len() + 2);
    for c in token.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Token usable for the LIKE narrowing. Besides non-ASCII tokens, this rules
/// out `k` and `s`, which fold to KELVIN SIGN (U+212A) and LONG S (U+017F).
fn like_token(token: &str) -> Option<&str> {
    let safe = token
        .chars()
        .all(|c| c.is_ascii() && !matches!(c.to_ascii_lowercase(), 'k' | 's'));
    if safe {
        Some(token)
    } else {
        None
    }
}

impl CertificateStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Certificate>, StoreError> {
        let certificate = sqlx::query_as::<_, Certificate>(&format!("{} WHERE id = ?", SELECT_CERTIFICATES))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(certificate)
    }

    pub async fn find_by_certificate_number(&self, number: &str) -> Result<Option<Certificate>, StoreError> {
        let certificate = sqlx::query_as::<_, Certificate>(&format!(
            "{} WHERE certificate_number = ?",
            SELECT_CERTIFICATES
        ))
        .bind(number)
        .fetch_optional(&self.db)
        .await?;
        Ok(certificate)
    }

    /// Records matching every clause, ordered by certificate number
    pub async fn search(&self, clauses: &[TextClause]) -> Result<Vec<Certificate>, StoreError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_CERTIFICATES);
        let mut first_condition = true;

        for clause in clauses {
            let token = match clause.pattern.tokens().first().and_then(|t| like_token(t)) {
                Some(token) => token,
                None => continue,
            };
            let like = format!("%{}%", escape_like(token));

            builder.push(if first_condition { " WHERE (" } else { " AND (" });
            first_condition = false;
            for (i, field) in clause.fields.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder.push(field.column());
                builder.push(" LIKE ");
                builder.push_bind(like.clone());
                builder.push(" ESCAPE '\\'");
            }
            builder.push(")");
        }
        builder.push(" ORDER BY certificate_number ASC");

        let candidates: Vec<Certificate> = builder.build_query_as().fetch_all(&self.db).await?;
        let candidate_count = candidates.len();

        let results: Vec<Certificate> = candidates
            .into_iter()
            .filter(|c| clauses.iter().all(|clause| clause.matches(c)))
            .collect();

        tracing::debug!(
            "Search narrowed {} candidates to {} results",
            candidate_count,
            results.len()
        );
        Ok(results)
    }

    /// Run a filter. Identifier filters yield at most one record.
    pub async fn find(&self, filter: &Filter) -> Result<Vec<Certificate>, StoreError> {
        match filter {
            Filter::ById(id) => Ok(self.find_by_id(id).await?.into_iter().collect()),
            Filter::ByCertificateNumber(number) => {
                Ok(self.find_by_certificate_number(number).await?.into_iter().collect())
            }
            Filter::Text(clauses) => self.search(clauses).await,
        }
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certificates")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::run_migrations;
    use crate::models::CertificateStatus;
    use crate::query::LookupParams;
    use sqlx::sqlite::SqlitePoolOptions;

    pub(crate) fn sample(number: &str, holder: &str, address: &str, country: &str) -> Certificate {
        Certificate {
            id: uuid::Uuid::new_v4().to_string(),
            certificate_number: number.to_string(),
            holder: holder.to_string(),
            address: address.to_string(),
            issue_date: "2023-06-15".to_string(),
            status: CertificateStatus::Valid,
            compliance_body: "Euro Standards Institute".to_string(),
            country_of_origin: country.to_string(),
            design_url: format!("https://assets.example.com/designs/{}.png", number),
        }
    }

    pub(crate) async fn insert(pool: &SqlitePool, c: &Certificate) {
        sqlx::query(
            "INSERT INTO certificates (id, certificate_number, holder, address, issue_date, status, \
             compliance_body, country_of_origin, design_url) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&c.id)
        .bind(&c.certificate_number)
        .bind(&c.holder)
        .bind(&c.address)
        .bind(&c.issue_date)
        .bind(c.status)
        .bind(&c.compliance_body)
        .bind(&c.country_of_origin)
        .bind(&c.design_url)
        .execute(pool)
        .await
        .unwrap();
    }

    /// In-memory store seeded with a few records
    pub(crate) async fn seeded_store() -> (CertificateStore, Vec<Certificate>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();

        let mut revoked = sample("CERT-0003", "Dillon Shareholder Trust", "7 Canal St\nAmsterdam", "Netherlands");
        revoked.status = CertificateStatus::Revoked;
        let records = vec![
            sample("CERT-0001", "First Example Holdings", "1 High Street, London", "United Kingdom"),
            sample("CERT-0002", "Second Example Estates Ltd", "22 Dill Road, Leeds", "United Kingdom"),
            revoked,
            sample("CERT-50%_X", "Société Générale d'Essais", "3 Rue Haute, Lyon", "France"),
        ];
        for record in &records {
            insert(&pool, record).await;
        }
        (CertificateStore::new(pool), records)
    }

    async fn search(store: &CertificateStore, term: &str) -> Vec<String> {
        let filter = Filter::from_params(&LookupParams {
            search: Some(term.to_string()),
            ..Default::default()
        })
        .unwrap();
        store
            .find(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.certificate_number)
            .collect()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_x"), "50\\%\\_x");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_like_token() {
        assert_eq!(like_token("dil"), Some("dil"));
        assert_eq!(like_token("50%_"), Some("50%_"));
        assert_eq!(like_token("kelvin"), None);
        assert_eq!(like_token("EstateS"), None);
        assert_eq!(like_token("société"), None);
    }

    #[tokio::test]
    async fn test_search_unicode_case_variants() {
        let (store, _) = seeded_store().await;
        insert(store.pool(), &sample("CERT-0201", "\u{212A}elvin Instruments", "", "Ireland")).await;
        insert(store.pool(), &sample("CERT-0202", "Gla\u{17F}gow Ma\u{17F}ons", "", "Ireland")).await;

        assert_eq!(search(&store, "kelvin").await, vec!["CERT-0201"]);
        assert_eq!(search(&store, "glasgow masons").await, vec!["CERT-0202"]);
    }

    #[tokio::test]
    async fn test_find_by_identifiers() {
        let (store, records) = seeded_store().await;

        let found = store.find_by_id(&records[1].id).await.unwrap().unwrap();
        assert_eq!(found, records[1]);
        assert!(store.find_by_id("missing").await.unwrap().is_none());

        let found = store.find_by_certificate_number("CERT-0003").await.unwrap().unwrap();
        assert_eq!(found.status, CertificateStatus::Revoked);
        assert!(store.find_by_certificate_number("cert-0003").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_loose_multi_field() {
        let (store, _) = seeded_store().await;

        assert_eq!(search(&store, "example").await, vec!["CERT-0001", "CERT-0002"]);
        assert_eq!(search(&store, "EXAMPLE estates").await, vec!["CERT-0002"]);
        assert_eq!(search(&store, "united kingdom").await, vec!["CERT-0001", "CERT-0002"]);
        assert_eq!(search(&store, "canal amsterdam").await, vec!["CERT-0003"]);
        assert_eq!(search(&store, "dil holder").await, vec!["CERT-0003"]);
        assert!(search(&store, "estates example").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_literal_wildcards() {
        let (store, _) = seeded_store().await;

        assert_eq!(search(&store, "50%_").await, vec!["CERT-50%_X"]);
        // '%' must not act as a LIKE wildcard
        assert!(search(&store, "0%1").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_non_ascii_first_token() {
        let (store, _) = seeded_store().await;

        assert_eq!(search(&store, "SOCIÉTÉ essais").await, vec!["CERT-50%_X"]);
    }

    #[tokio::test]
    async fn test_empty_result_and_all() {
        let (store, records) = seeded_store().await;

        assert!(search(&store, "nowhere").await.is_empty());
        let all = store.find(&Filter::Text(Vec::new())).await.unwrap();
        assert_eq!(all.len(), records.len());
        assert_eq!(store.count().await.unwrap(), records.len() as i64);
    }
}
