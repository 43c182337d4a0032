use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::dao::{
    catalog_store::CatalogStore,
    models::{LeaderboardEntryEntity, LogoEntity, NewLeaderboardEntry, QuestionEntity},
    storage::StorageResult,
};

use super::{
    config::PostgrestConfig,
    error::{PostgrestError, PostgrestResult},
    models::{
        LEADERBOARD_COLUMNS, LEADERBOARD_TABLE, LOGO_COLUMNS, LOGOS_TABLE, LeaderboardInsert,
        LeaderboardRow, LogoRow, QUESTION_COLUMNS, QUESTIONS_TABLE, QuestionRow,
    },
};

/// Rows requested per catalog page. Supabase answers with at most 1000 rows per request by default.
const CATALOG_PAGE_SIZE: usize = 1000;

/// Query for one page of a catalog table, ordered by id so consecutive pages never overlap.
fn page_query(columns: &str, offset: usize) -> [(&'static str, String); 4] {
    [
        ("select", columns.to_string()),
        ("order", "id.asc".to_string()),
        ("limit", CATALOG_PAGE_SIZE.to_string()),
        ("offset", offset.to_string()),
    ]
}

#[derive(Clone)]
pub struct PostgrestCatalogStore {
    client: Client,
    rest_url: Arc<str>,
    api_key: Arc<str>,
}

impl PostgrestCatalogStore {
    /// Build the HTTP client and verify the endpoint answers.
    pub async fn connect(config: PostgrestConfig) -> PostgrestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| PostgrestError::ClientBuilder { source })?;

        let rest_url = Arc::<str>::from(format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.rest_path.trim_matches('/')
        ));

        let store = Self {
            client,
            rest_url,
            api_key: Arc::from(config.api_key),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.rest_url, table);
        self.client
            .request(method, url)
            .header("apikey", self.api_key.as_ref())
            .bearer_auth(self.api_key.as_ref())
    }

    async fn select<T>(&self, table: &str, query: &[(&str, String)]) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|source| PostgrestError::RequestSend {
                table: table.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(PostgrestError::RequestStatus {
                table: table.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| PostgrestError::DecodeResponse {
                table: table.to_string(),
                source,
            })
    }

    /// Read a whole catalog table page by page.
    ///
    /// Paging stops on the first empty page, so a server-side row cap lower than
    /// [`CATALOG_PAGE_SIZE`] still yields the full table.
    async fn select_all<T>(&self, table: &str, columns: &str) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut rows = Vec::new();
        loop {
            let page = self
                .select::<T>(table, &page_query(columns, rows.len()))
                .await?;
            if page.is_empty() {
                return Ok(rows);
            }
            rows.extend(page);
        }
    }

    async fn insert(&self, entry: &NewLeaderboardEntry) -> PostgrestResult<()> {
        let response = self
            .request(Method::POST, LEADERBOARD_TABLE)
            .header("Prefer", "return=minimal")
            .json(&LeaderboardInsert::from(entry))
            .send()
            .await
            .map_err(|source| PostgrestError::RequestSend {
                table: LEADERBOARD_TABLE.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::CREATED | StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            status => Err(PostgrestError::RequestStatus {
                table: LEADERBOARD_TABLE.to_string(),
                status,
            }),
        }
    }

    async fn ping(&self) -> PostgrestResult<()> {
        let query = [("select", "id".to_string()), ("limit", "1".to_string())];
        self.select::<serde_json::Value>(LOGOS_TABLE, &query)
            .await
            .map(|_| ())
    }
}

impl CatalogStore for PostgrestCatalogStore {
    fn fetch_logos(&self) -> BoxFuture<'static, StorageResult<Vec<LogoEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .select_all::<LogoRow>(LOGOS_TABLE, LOGO_COLUMNS)
                .await?;
            debug!(count = rows.len(), "fetched logo catalog");
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn fetch_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .select_all::<QuestionRow>(QUESTIONS_TABLE, QUESTION_COLUMNS)
                .await?;
            debug!(count = rows.len(), "fetched question catalog");
            rows.into_iter()
                .map(|row| QuestionEntity::try_from(row).map_err(Into::into))
                .collect()
        })
    }

    fn append_score(&self, entry: NewLeaderboardEntry) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(&entry).await.map_err(Into::into) })
    }

    fn top_scores(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("select", LEADERBOARD_COLUMNS.to_string()),
                ("order", "score.desc".to_string()),
                ("limit", limit.to_string()),
            ];
            let rows = store
                .select::<LeaderboardRow>(LEADERBOARD_TABLE, &query)
                .await?;
            rows.into_iter()
                .map(|row| LeaderboardEntryEntity::try_from(row).map_err(Into::into))
                .collect()
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
