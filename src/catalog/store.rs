/// SQLite persistence layer for the workflow catalog
///
/// Stores catalog records in a relational table mirrored by an FTS5
/// full-text index over name/description/tags/use_cases/integrations.
/// Triggers keep the index transactionally consistent with the primary
/// table, so every insert/update/delete re-derives the index entry in the
/// same transaction. List-valued fields are encoded as JSON text, boolean
/// flags as 0/1, timestamps as ISO-8601 strings; the row codec lives
/// entirely in this module.

use crate::catalog::types::{
    CategoryCount, Compatibility, CompatibilityStatus, DifficultyLevel, Requirements,
    WorkflowMetadata, WorkflowRecord, WorkflowStats,
};
use anyhow::{anyhow, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow},
    Row,
};
use std::path::Path;

/// Search parameters for catalog queries
///
/// `query` uses full-text token match semantics; all other filters are
/// exact-match conjunctions. Tag filters require the record's tag set to
/// contain each requested tag as an exact element.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub local_ai_only: bool,
    pub tags: Vec<String>,
    pub limit: i64,
    pub offset: i64,
}

/// SQLite-backed catalog store
///
/// Each operation acquires a pooled connection for its own scope and
/// releases it on every exit path. Reads may run concurrently; writes rely
/// on SQLite's native transaction isolation.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the catalog database at the given path
    pub async fn connect(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow!("Failed to create database directory '{}': {}", parent.display(), e)
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        Ok(Self::new(pool))
    }

    /// Initialize the catalog schema
    ///
    /// Idempotent (IF NOT EXISTS everywhere); safe to call repeatedly.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                subcategory TEXT,
                difficulty TEXT NOT NULL,
                author TEXT,
                source_repo TEXT NOT NULL,
                source_url TEXT,
                json_path TEXT NOT NULL,
                tags TEXT,
                department TEXT,
                use_cases TEXT,

                node_count INTEGER,
                integrations TEXT,
                node_types TEXT,
                has_webhook INTEGER DEFAULT 0,
                has_schedule INTEGER DEFAULT 0,
                estimated_runtime TEXT,

                credentials TEXT,
                services TEXT,
                external_apis TEXT,
                min_version TEXT,

                local_ai INTEGER DEFAULT 0,
                requires_external_api INTEGER DEFAULT 0,
                works_offline INTEGER DEFAULT 1,
                pozi_compatible INTEGER DEFAULT 0,
                compatibility_status TEXT,
                compatibility_score REAL,

                popularity_score INTEGER DEFAULT 0,
                import_count INTEGER DEFAULT 0,
                success_rate REAL DEFAULT 0.0,
                avg_setup_time TEXT,

                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_synced TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // FTS5 external-content index over the searchable text columns
        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE IF NOT EXISTS workflows_fts USING fts5(
                name,
                description,
                tags,
                use_cases,
                integrations,
                content=workflows,
                content_rowid=rowid
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Triggers keep the FTS index consistent within the writing transaction
        sqlx::query(
            r#"
            CREATE TRIGGER IF NOT EXISTS workflows_ai AFTER INSERT ON workflows BEGIN
                INSERT INTO workflows_fts(rowid, name, description, tags, use_cases, integrations)
                VALUES (new.rowid, new.name, new.description, new.tags, new.use_cases, new.integrations);
            END
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TRIGGER IF NOT EXISTS workflows_ad AFTER DELETE ON workflows BEGIN
                INSERT INTO workflows_fts(workflows_fts, rowid, name, description, tags, use_cases, integrations)
                VALUES ('delete', old.rowid, old.name, old.description, old.tags, old.use_cases, old.integrations);
            END
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TRIGGER IF NOT EXISTS workflows_au AFTER UPDATE ON workflows BEGIN
                INSERT INTO workflows_fts(workflows_fts, rowid, name, description, tags, use_cases, integrations)
                VALUES ('delete', old.rowid, old.name, old.description, old.tags, old.use_cases, old.integrations);
                INSERT INTO workflows_fts(rowid, name, description, tags, use_cases, integrations)
                VALUES (new.rowid, new.name, new.description, new.tags, new.use_cases, new.integrations);
            END
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Indexes for the common filter and ranking paths
        for stmt in [
            "CREATE INDEX IF NOT EXISTS idx_workflows_category ON workflows(category)",
            "CREATE INDEX IF NOT EXISTS idx_workflows_difficulty ON workflows(difficulty)",
            "CREATE INDEX IF NOT EXISTS idx_workflows_local_ai ON workflows(local_ai)",
            "CREATE INDEX IF NOT EXISTS idx_workflows_compatibility ON workflows(compatibility_status)",
            "CREATE INDEX IF NOT EXISTS idx_workflows_popularity ON workflows(popularity_score DESC)",
        ] {
            sqlx::query(stmt).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// Insert a new catalog record
    ///
    /// The FTS index entry is derived by trigger inside the same implicit
    /// transaction as the insert, so a failure leaves both views untouched.
    pub async fn insert(&self, record: &WorkflowRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflows (
                id, name, description, category, subcategory, difficulty,
                author, source_repo, source_url, json_path, tags, department,
                use_cases, node_count, integrations, node_types, has_webhook,
                has_schedule, estimated_runtime, credentials, services,
                external_apis, min_version, local_ai, requires_external_api,
                works_offline, pozi_compatible, compatibility_status,
                compatibility_score, popularity_score, import_count,
                success_rate, avg_setup_time, created_at, updated_at, last_synced
            ) VALUES (
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            )
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(&record.category)
        .bind(&record.subcategory)
        .bind(record.difficulty.as_str())
        .bind(&record.author)
        .bind(&record.source_repo)
        .bind(&record.source_url)
        .bind(&record.json_path)
        .bind(serde_json::to_string(&record.tags)?)
        .bind(&record.department)
        .bind(serde_json::to_string(&record.use_cases)?)
        .bind(record.metadata.node_count as i64)
        .bind(serde_json::to_string(&record.metadata.integrations)?)
        .bind(serde_json::to_string(&record.metadata.node_types)?)
        .bind(record.metadata.has_webhook as i64)
        .bind(record.metadata.has_schedule as i64)
        .bind(&record.metadata.estimated_runtime)
        .bind(serde_json::to_string(&record.requirements.credentials)?)
        .bind(serde_json::to_string(&record.requirements.services)?)
        .bind(serde_json::to_string(&record.requirements.external_apis)?)
        .bind(&record.requirements.min_version)
        .bind(record.compatibility.local_ai as i64)
        .bind(record.compatibility.requires_external_api as i64)
        .bind(record.compatibility.works_offline as i64)
        .bind(record.compatibility.pozi_compatible as i64)
        .bind(record.compatibility.status.as_str())
        .bind(record.compatibility.compatibility_score)
        .bind(record.stats.popularity_score)
        .bind(record.stats.import_count)
        .bind(record.stats.success_rate)
        .bind(&record.stats.avg_setup_time)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .bind(&record.last_synced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieve a record by ID; absent records are Ok(None), not errors
    pub async fn get_by_id(&self, id: &str) -> Result<Option<WorkflowRecord>> {
        let row = sqlx::query("SELECT * FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(decode_record(&row)?)),
            None => Ok(None),
        }
    }

    /// Search the catalog with filters, ranking, and pagination
    ///
    /// Results are ordered by popularity_score descending then name
    /// ascending; never returns more than `limit` rows.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<WorkflowRecord>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(query) = filters.query.as_deref().filter(|q| !q.is_empty()) {
            conditions.push(
                "rowid IN (SELECT rowid FROM workflows_fts WHERE workflows_fts MATCH ?)"
                    .to_string(),
            );
            params.push(query.to_string());
        }

        if let Some(category) = &filters.category {
            conditions.push("category = ?".to_string());
            params.push(category.clone());
        }

        if let Some(difficulty) = filters.difficulty {
            conditions.push("difficulty = ?".to_string());
            params.push(difficulty.as_str().to_string());
        }

        if filters.local_ai_only {
            conditions.push("local_ai = 1".to_string());
        }

        // Tag containment: the JSON encoding quotes every element, so the
        // quoted pattern matches exact tokens only, never substrings.
        for tag in &filters.tags {
            conditions.push("tags LIKE ?".to_string());
            params.push(format!("%\"{}\"%", tag));
        }

        let where_clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };

        let sql = format!(
            "SELECT * FROM workflows WHERE {} \
             ORDER BY popularity_score DESC, name ASC \
             LIMIT ? OFFSET ?",
            where_clause
        );

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = query.bind(param);
        }
        query = query.bind(filters.limit).bind(filters.offset);

        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(decode_record).collect()
    }

    /// List distinct categories with live record counts, ordered by name
    pub async fn list_categories(&self) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) as workflow_count
            FROM workflows
            GROUP BY category
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryCount::new(row.get("category"), row.get("workflow_count")))
            .collect())
    }

    /// Total record count
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as total FROM workflows")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }

    /// Partially update a record's stats, bumping updated_at
    ///
    /// No-op when neither field is given. Stats are the only mutable fields
    /// of a persisted record.
    pub async fn update_stats(
        &self,
        id: &str,
        import_count: Option<i64>,
        success_rate: Option<f64>,
    ) -> Result<()> {
        let mut updates: Vec<&str> = Vec::new();
        if import_count.is_some() {
            updates.push("import_count = ?");
        }
        if success_rate.is_some() {
            updates.push("success_rate = ?");
        }
        if updates.is_empty() {
            return Ok(());
        }
        updates.push("updated_at = ?");

        let sql = format!("UPDATE workflows SET {} WHERE id = ?", updates.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(count) = import_count {
            query = query.bind(count);
        }
        if let Some(rate) = success_rate {
            query = query.bind(rate);
        }
        query = query
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id);

        query.execute(&self.pool).await?;

        Ok(())
    }
}

/// Decode one relational row into an in-memory record
///
/// JSON-encoded list columns are expanded back into typed vectors here;
/// serialized text never reaches business logic.
fn decode_record(row: &SqliteRow) -> Result<WorkflowRecord> {
    let difficulty_raw: String = row.get("difficulty");
    let difficulty = DifficultyLevel::parse(&difficulty_raw)
        .ok_or_else(|| anyhow!("invalid difficulty in row: {}", difficulty_raw))?;

    let status_raw: String = row.get("compatibility_status");
    let status = CompatibilityStatus::parse(&status_raw)
        .ok_or_else(|| anyhow!("invalid compatibility status in row: {}", status_raw))?;

    Ok(WorkflowRecord {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
        difficulty,
        author: row.get("author"),
        source_repo: row.get("source_repo"),
        source_url: row.get("source_url"),
        json_path: row.get("json_path"),
        tags: decode_list(row, "tags")?,
        department: row.get("department"),
        use_cases: decode_list(row, "use_cases")?,
        metadata: WorkflowMetadata {
            node_count: row.get::<i64, _>("node_count") as usize,
            integrations: decode_list(row, "integrations")?,
            node_types: decode_list(row, "node_types")?,
            has_webhook: row.get::<i64, _>("has_webhook") != 0,
            has_schedule: row.get::<i64, _>("has_schedule") != 0,
            estimated_runtime: row.get("estimated_runtime"),
        },
        requirements: Requirements {
            credentials: match row.get::<Option<String>, _>("credentials") {
                Some(text) if !text.is_empty() => serde_json::from_str(&text)?,
                _ => Vec::new(),
            },
            services: decode_list(row, "services")?,
            external_apis: decode_list(row, "external_apis")?,
            min_version: row.get("min_version"),
        },
        compatibility: Compatibility {
            local_ai: row.get::<i64, _>("local_ai") != 0,
            requires_external_api: row.get::<i64, _>("requires_external_api") != 0,
            works_offline: row.get::<i64, _>("works_offline") != 0,
            pozi_compatible: row.get::<i64, _>("pozi_compatible") != 0,
            status,
            compatibility_score: row.get("compatibility_score"),
        },
        stats: WorkflowStats {
            popularity_score: row.get("popularity_score"),
            import_count: row.get("import_count"),
            success_rate: row.get("success_rate"),
            avg_setup_time: row.get("avg_setup_time"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_synced: row.get("last_synced"),
    })
}

/// Decode a JSON-encoded string-list column
fn decode_list(row: &SqliteRow, column: &str) -> Result<Vec<String>> {
    let raw: Option<String> = row.get(column);
    match raw {
        Some(text) if !text.is_empty() => Ok(serde_json::from_str(&text)?),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::WorkflowParser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn test_store(dir: &TempDir) -> CatalogStore {
        let db_path = dir.path().join("catalog.db");
        let store = CatalogStore::connect(db_path.to_str().unwrap())
            .await
            .unwrap();
        store.init_schema().await.unwrap();
        store
    }

    fn sample_record(name: &str, popularity: i64) -> WorkflowRecord {
        let raw = format!(
            r#"{{
                "name": "{name}",
                "description": "send email summaries from the inbox",
                "nodes": [
                    {{ "type": "n8n-nodes-base.gmail",
                       "credentials": {{ "gmailOAuth2": {{}} }} }}
                ]
            }}"#
        );
        let mut record = WorkflowParser::new()
            .parse_workflow(&raw, name, "acme/n8n-workflows", "data/sample.json")
            .unwrap();
        record.stats.popularity_score = popularity;
        record
    }

    fn local_ai_record(name: &str) -> WorkflowRecord {
        let raw = format!(
            r#"{{
                "name": "{name}",
                "nodes": [
                    {{ "type": "@n8n/n8n-nodes-langchain.lmChatOllama",
                       "credentials": {{ "ollamaApi": {{}} }} }}
                ]
            }}"#
        );
        WorkflowParser::new()
            .parse_workflow(&raw, name, "acme/n8n-workflows", "data/local.json")
            .unwrap()
    }

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        store.insert(&sample_record("alpha", 0)).await.unwrap();
        store.init_schema().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_every_field() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let record = sample_record("roundtrip", 7);
        store.insert(&record).await.unwrap();

        let loaded = store.get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn get_by_id_absent_is_none() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;
        assert!(store.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_reports_failure() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let record = sample_record("dup", 0);
        store.insert(&record).await.unwrap();
        assert!(store.insert(&record).await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn full_text_search_matches_tokens() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        store.insert(&sample_record("inbox digest", 0)).await.unwrap();
        store.insert(&local_ai_record("ollama chat")).await.unwrap();

        let filters = SearchFilters {
            query: Some("summaries".to_string()),
            limit: 20,
            ..SearchFilters::default()
        };
        let results = store.search(&filters).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "inbox digest");
    }

    #[tokio::test]
    async fn local_ai_only_filters_records() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        store.insert(&sample_record("plain", 0)).await.unwrap();
        store.insert(&local_ai_record("local chat")).await.unwrap();

        let filters = SearchFilters {
            local_ai_only: true,
            limit: 20,
            ..SearchFilters::default()
        };
        let results = store.search(&filters).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].compatibility.local_ai);
    }

    #[tokio::test]
    async fn tag_filter_matches_exact_tokens_only() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let mut tagged = sample_record("tagged", 0);
        tagged.tags = vec!["email".to_string(), "gmail".to_string()];
        store.insert(&tagged).await.unwrap();

        let mut near_miss = sample_record("near miss", 0);
        near_miss.tags = vec!["emailing".to_string()];
        store.insert(&near_miss).await.unwrap();

        let filters = SearchFilters {
            tags: vec!["email".to_string()],
            limit: 20,
            ..SearchFilters::default()
        };
        let results = store.search(&filters).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "tagged");
    }

    #[tokio::test]
    async fn results_are_ordered_by_popularity_then_name() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        store.insert(&sample_record("bravo", 5)).await.unwrap();
        store.insert(&sample_record("alpha", 5)).await.unwrap();
        store.insert(&sample_record("charlie", 9)).await.unwrap();

        let filters = SearchFilters {
            limit: 20,
            ..SearchFilters::default()
        };
        let names: Vec<String> = store
            .search(&filters)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["charlie", "alpha", "bravo"]);
    }

    #[tokio::test]
    async fn pagination_slices_the_global_ordering() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        for i in 0..45 {
            store
                .insert(&sample_record(&format!("wf-{i:03}"), 0))
                .await
                .unwrap();
        }

        let all = store
            .search(&SearchFilters { limit: 100, ..SearchFilters::default() })
            .await
            .unwrap();
        let page = store
            .search(&SearchFilters { limit: 20, offset: 20, ..SearchFilters::default() })
            .await
            .unwrap();

        assert_eq!(page.len(), 20);
        assert_eq!(page, all[20..40].to_vec());
    }

    #[tokio::test]
    async fn categories_report_live_counts_ordered_by_name() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        store.insert(&sample_record("one", 0)).await.unwrap();
        store.insert(&sample_record("two", 0)).await.unwrap();
        store.insert(&local_ai_record("three")).await.unwrap();

        let categories = store.list_categories().await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);

        let total: i64 = categories.iter().map(|c| c.workflow_count).sum();
        assert_eq!(total, 3);
        assert!(categories.iter().all(|c| !c.slug.contains(' ')));
    }

    #[tokio::test]
    async fn update_stats_is_partial_and_bumps_updated_at() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;

        let record = sample_record("stats", 0);
        store.insert(&record).await.unwrap();

        store
            .update_stats(&record.id, Some(3), None)
            .await
            .unwrap();
        let loaded = store.get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.stats.import_count, 3);
        assert_eq!(loaded.stats.success_rate, 0.0);
        assert_ne!(loaded.updated_at, record.updated_at);

        // No fields given: nothing changes
        store.update_stats(&record.id, None, None).await.unwrap();
        let unchanged = store.get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(unchanged, loaded);
    }
}
