use crate::{
    model::{Contest, ContestStatus},
    store::{
        ContestQuery, ContestStore, Result, SortOrder, StatusTransition, StoreError, UpsertOutcome,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    migrate::Migrator,
    postgres::{PgPoolOptions, Postgres},
    FromRow, Pool, QueryBuilder,
};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const SELECT_CONTESTS: &str = r#"
    SELECT
        "platform",
        "external_id",
        "name",
        "url",
        "start_time",
        "end_time",
        "duration_minutes",
        "status"
    FROM
        "contests"
    WHERE
        TRUE"#;

#[derive(Debug, FromRow)]
pub struct ContestRow {
    pub platform: String,
    pub external_id: String,
    pub name: String,
    pub url: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: String,
}

impl TryFrom<ContestRow> for Contest {
    type Error = StoreError;

    fn try_from(row: ContestRow) -> Result<Self> {
        let platform = row
            .platform
            .parse()
            .map_err(|e| StoreError::CorruptedRecord(format!("{}", e)))?;
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::CorruptedRecord(format!("{}", e)))?;

        Ok(Contest {
            platform,
            external_id: row.external_id,
            name: row.name,
            url: row.url,
            start_time: row.start_time,
            end_time: row.end_time,
            duration_minutes: row.duration_minutes,
            status,
        })
    }
}

/// Escape `%`, `_` and the escape character itself for use in a LIKE pattern.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Names compare by byte order regardless of the database collation.
fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::StartTimeAsc => r#""start_time" ASC, "external_id" ASC"#,
        SortOrder::StartTimeDesc => r#""start_time" DESC, "external_id" ASC"#,
        SortOrder::EndTimeAsc => r#""end_time" ASC, "start_time" ASC, "external_id" ASC"#,
        SortOrder::NameAsc => r#""name" COLLATE "C" ASC, "start_time" ASC, "external_id" ASC"#,
        SortOrder::NameDesc => r#""name" COLLATE "C" DESC, "start_time" ASC, "external_id" ASC"#,
    }
}

fn time_predicate(status: ContestStatus) -> &'static str {
    match status {
        ContestStatus::Upcoming => r#""start_time" > $3"#,
        ContestStatus::Ongoing => r#""start_time" <= $3 AND "end_time" > $3"#,
        ContestStatus::Completed => r#""end_time" <= $3"#,
    }
}

pub struct PgContestStore {
    pool: Pool<Postgres>,
}

impl PgContestStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ContestStore for PgContestStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "contests""#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    /// Insert the contest, or update every column of the row with the same
    /// `(platform, external_id)`.
    ///
    /// Identical input writes nothing, so `updated_at` stays put.
    async fn upsert(&self, contest: &Contest) -> Result<UpsertOutcome> {
        let inserted: Option<bool> = sqlx::query_scalar(
            r#"
            INSERT INTO "contests" (
                "platform",
                "external_id",
                "name",
                "url",
                "start_time",
                "end_time",
                "duration_minutes",
                "status"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT ("platform", "external_id") DO UPDATE SET (
                "name",
                "url",
                "start_time",
                "end_time",
                "duration_minutes",
                "status",
                "updated_at"
            ) = (
                EXCLUDED."name",
                EXCLUDED."url",
                EXCLUDED."start_time",
                EXCLUDED."end_time",
                EXCLUDED."duration_minutes",
                EXCLUDED."status",
                NOW()
            )
            WHERE (
                "contests"."name",
                "contests"."url",
                "contests"."start_time",
                "contests"."end_time",
                "contests"."duration_minutes",
                "contests"."status"
            ) IS DISTINCT FROM (
                EXCLUDED."name",
                EXCLUDED."url",
                EXCLUDED."start_time",
                EXCLUDED."end_time",
                EXCLUDED."duration_minutes",
                EXCLUDED."status"
            )
            RETURNING ("xmax" = 0) AS "inserted";
            "#,
        )
        .bind(contest.platform.as_str())
        .bind(&contest.external_id)
        .bind(&contest.name)
        .bind(&contest.url)
        .bind(contest.start_time)
        .bind(contest.end_time)
        .bind(contest.duration_minutes)
        .bind(contest.status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let outcome = match inserted {
            Some(true) => UpsertOutcome::Inserted,
            Some(false) => UpsertOutcome::Updated,
            None => UpsertOutcome::Unchanged,
        };

        Ok(outcome)
    }

    async fn transition_status(&self, transition: &StatusTransition) -> Result<u64> {
        let sql = format!(
            r#"UPDATE "contests" SET "status" = $1, "updated_at" = NOW() WHERE "status" = $2 AND {}"#,
            time_predicate(transition.to())
        );

        let result = sqlx::query(&sql)
            .bind(transition.to().as_str())
            .bind(transition.from().as_str())
            .bind(transition.now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find(&self, query: &ContestQuery) -> Result<Vec<Contest>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_CONTESTS);

        if let Some(platform) = query.platform {
            builder.push(r#" AND "platform" = "#).push_bind(platform.as_str());
        }
        if let Some(status) = query.status {
            builder.push(r#" AND "status" = "#).push_bind(status.as_str());
        }
        if let Some(after) = query.starts_after {
            builder.push(r#" AND "start_time" > "#).push_bind(after);
        }
        if let Some(since) = query.starts_since {
            builder.push(r#" AND "start_time" >= "#).push_bind(since);
        }
        if let Some(keyword) = &query.keyword {
            builder
                .push(r#" AND "name" ILIKE "#)
                .push_bind(format!("%{}%", escape_like(keyword)));
        }
        builder.push(" ORDER BY ").push(order_clause(query.sort));
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows: Vec<ContestRow> = builder
            .build_query_as::<ContestRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Contest::try_from).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Platform;
    use chrono::TimeZone;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("Weekly Contest"), "Weekly Contest");
    }

    #[test]
    fn test_name_order_ignores_database_collation() {
        assert!(order_clause(SortOrder::NameAsc).starts_with(r#""name" COLLATE "C" ASC"#));
        assert!(order_clause(SortOrder::NameDesc).starts_with(r#""name" COLLATE "C" DESC"#));
        assert!(!order_clause(SortOrder::StartTimeAsc).contains("COLLATE"));
    }

    #[test]
    fn test_corrupted_row_is_rejected() {
        let row = ContestRow {
            platform: String::from("atcoder"),
            external_id: String::from("abc300"),
            name: String::from("ABC 300"),
            url: String::from("https://atcoder.jp/contests/abc300"),
            start_time: Utc.timestamp_opt(0, 0).unwrap(),
            end_time: Utc.timestamp_opt(6000, 0).unwrap(),
            duration_minutes: 100,
            status: String::from("upcoming"),
        };

        assert!(matches!(
            Contest::try_from(row),
            Err(StoreError::CorruptedRecord(_))
        ));
    }

    /// Test scenario against a live database.
    ///
    /// Run this test with `DATABASE_URL` pointing at a disposable PostgreSQL 15 instance.
    ///
    /// ```ignore
    /// docker run --rm -d -p 5432:5432 -e POSTGRES_PASSWORD=postgres postgres:15
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_scenario() {
        let database_url = std::env::var("DATABASE_URL").unwrap();
        let store = PgContestStore::connect(&database_url, 1).await.unwrap();
        store.migrate().await.unwrap();
        sqlx::query(r#"DELETE FROM "contests""#)
            .execute(&store.pool)
            .await
            .unwrap();

        let contest = Contest::scheduled(
            Platform::Codeforces,
            "1000",
            "Codeforces Round",
            "https://codeforces.com/contest/1000",
            1000,
            7200,
            Utc.timestamp_opt(0, 0).unwrap(),
        )
        .unwrap();

        assert_eq!(store.upsert(&contest).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(store.upsert(&contest).await.unwrap(), UpsertOutcome::Unchanged);

        let transition = StatusTransition::new(
            ContestStatus::Upcoming,
            ContestStatus::Completed,
            Utc.timestamp_opt(9000, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(store.transition_status(&transition).await.unwrap(), 1);

        let found = store
            .find(&ContestQuery {
                status: Some(ContestStatus::Completed),
                keyword: Some(String::from("round")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_time.timestamp_millis(), 1_000_000);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
