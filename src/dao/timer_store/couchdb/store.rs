use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dao::{
    models::TimerEntity,
    storage::{StorageError, StorageResult},
    timer_store::TimerStore,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{CouchTimerDocument, END_SUFFIX, FindResponse, OWNER_INDEX, TIMER_PREFIX, timer_doc_id},
};

/// Database-level requests target the database itself rather than a document.
const DATABASE: &str = "";
const SAVE_ATTEMPTS: u32 = 2;
const OWNER_QUERY_LIMIT: u32 = 1000;

/// Timer store persisting one CouchDB document per timer, levels embedded.
#[derive(Clone)]
pub struct CouchTimerStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchTimerStore {
    /// Connect and make sure the database and the owner index exist.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::Client { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            database: Arc::from(config.database),
            auth: config
                .username
                .zip(config.password)
                .map(|(user, pass)| (Arc::from(user), Arc::from(pass))),
        };

        store.prepare().await?;
        Ok(store)
    }

    async fn prepare(&self) -> CouchResult<()> {
        self.ensure_database().await?;
        self.ensure_owner_index().await
    }

    fn target<'a>(&'a self, path: &'a str) -> &'a str {
        if path.is_empty() {
            self.database.as_ref()
        } else {
            path
        }
    }

    /// Send a request for `path` below the database, letting `build` add a body or query.
    async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> CouchResult<Response> {
        let url = if path.is_empty() {
            format!("{}/{}", self.base_url, self.database)
        } else {
            format!("{}/{}/{}", self.base_url, self.database, path)
        };
        let mut builder = self.client.request(method.clone(), url);
        if let Some((user, pass)) = &self.auth {
            builder = builder.basic_auth(user.as_ref(), Some(pass.as_ref()));
        }

        build(builder)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                method,
                target: self.target(path).to_string(),
                source,
            })
    }

    fn unexpected(&self, method: Method, path: &str, status: StatusCode) -> CouchDaoError {
        CouchDaoError::Status {
            method,
            target: self.target(path).to_string(),
            status,
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let response = self.send(Method::GET, DATABASE, |req| req).await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let created = self.send(Method::PUT, DATABASE, |req| req).await?;
                match created.status() {
                    // 412: another instance created it first.
                    status if status.is_success() || status == StatusCode::PRECONDITION_FAILED => {
                        debug!(database = %self.database, "created CouchDB database");
                        Ok(())
                    }
                    status => Err(self.unexpected(Method::PUT, DATABASE, status)),
                }
            }
            status => Err(self.unexpected(Method::GET, DATABASE, status)),
        }
    }

    /// Mango index backing owner lookups; CouchDB treats a repeat as a no-op.
    async fn ensure_owner_index(&self) -> CouchResult<()> {
        const PATH: &str = "_index";
        let index = json!({
            "index": { "fields": ["owner_id"] },
            "name": OWNER_INDEX,
            "type": "json",
        });
        let response = self.send(Method::POST, PATH, |req| req.json(&index)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.unexpected(Method::POST, PATH, response.status()))
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, path: &str) -> CouchResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|source| CouchDaoError::Decode {
                target: self.target(path).to_string(),
                source,
            })
    }

    async fn get_timer_document(&self, doc_id: &str) -> CouchResult<Option<CouchTimerDocument>> {
        let response = self.send(Method::GET, doc_id, |req| req).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => self.decode(response, doc_id).await.map(Some),
            status => Err(self.unexpected(Method::GET, doc_id, status)),
        }
    }

    async fn put_timer_document(&self, doc: &CouchTimerDocument) -> CouchResult<()> {
        let response = self.send(Method::PUT, &doc.id, |req| req.json(doc)).await?;
        match response.status() {
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                doc_id: doc.id.clone(),
            }),
            status if status.is_success() => Ok(()),
            status => Err(self.unexpected(Method::PUT, &doc.id, status)),
        }
    }

    async fn find_by_owner(&self, owner_id: &str) -> CouchResult<Vec<CouchTimerDocument>> {
        const PATH: &str = "_find";
        let query = json!({
            "selector": {
                "owner_id": owner_id,
                "_id": {
                    "$gt": TIMER_PREFIX,
                    "$lt": format!("{TIMER_PREFIX}{END_SUFFIX}"),
                },
            },
            "use_index": OWNER_INDEX,
            "limit": OWNER_QUERY_LIMIT,
        });

        let response = self.send(Method::POST, PATH, |req| req.json(&query)).await?;
        if !response.status().is_success() {
            return Err(self.unexpected(Method::POST, PATH, response.status()));
        }
        let found: FindResponse = self.decode(response, PATH).await?;
        if found.docs.len() as u32 >= OWNER_QUERY_LIMIT {
            warn!(owner_id, limit = OWNER_QUERY_LIMIT, "owner query hit its limit");
        }
        Ok(found.docs)
    }

    /// Overwrite the whole document. A revision that moved since it was read
    /// is refetched once, so the last writer wins as with the memory store.
    async fn save(&self, timer: TimerEntity) -> StorageResult<TimerEntity> {
        let doc_id = timer_doc_id(timer.id);
        let mut attempt = 1;
        loop {
            let (previous, rev) = match self.get_timer_document(&doc_id).await? {
                Some(doc) => {
                    let rev = doc.rev.clone();
                    (Some(TimerEntity::try_from(doc)?), rev)
                }
                None => (None, None),
            };

            let stored = timer.clone().stamped(previous.as_ref(), SystemTime::now());
            match self
                .put_timer_document(&CouchTimerDocument::from((stored.clone(), rev)))
                .await
            {
                Ok(()) => return Ok(stored),
                Err(CouchDaoError::Conflict { .. }) if attempt < SAVE_ATTEMPTS => {
                    debug!(%doc_id, attempt, "revision moved during save; retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn delete(&self, id: Uuid) -> StorageResult<bool> {
        let doc_id = timer_doc_id(id);
        let Some(existing) = self.get_timer_document(&doc_id).await? else {
            return Ok(false);
        };
        let Some(rev) = existing.rev else {
            return Err(StorageError::corrupt(doc_id, "document has no revision"));
        };

        let response = self
            .send(Method::DELETE, &doc_id, |req| req.query(&[("rev", rev)]))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict { doc_id }.into()),
            status if status.is_success() => Ok(true),
            status => Err(self.unexpected(Method::DELETE, &doc_id, status).into()),
        }
    }
}

impl TimerStore for CouchTimerStore {
    fn find_timer(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TimerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = store.get_timer_document(&timer_doc_id(id)).await?;
            Ok(doc.map(TimerEntity::try_from).transpose()?)
        })
    }

    fn list_timers_by_owner(
        &self,
        owner_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<TimerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut timers = store
                .find_by_owner(&owner_id)
                .await?
                .into_iter()
                .map(TimerEntity::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            timers.sort_by_key(|timer| timer.created_at);
            Ok(timers)
        })
    }

    fn save_timer(&self, timer: TimerEntity) -> BoxFuture<'static, StorageResult<TimerEntity>> {
        let store = self.clone();
        Box::pin(async move { store.save(timer).await })
    }

    fn delete_timer(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete(id).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let response = store.send(Method::HEAD, DATABASE, |req| req).await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(store
                    .unexpected(Method::HEAD, DATABASE, response.status())
                    .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.prepare().await?) })
    }
}
