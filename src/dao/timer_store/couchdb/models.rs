use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{LevelEntity, TimerEntity};

use super::error::CouchDaoError;

/// Prefix of every timer document ID.
pub const TIMER_PREFIX: &str = "timer::";
/// Upper bound appended to a prefix in `_id` range queries.
pub const END_SUFFIX: &str = "\u{ffff}";
/// Name of the Mango index on `owner_id`.
pub const OWNER_INDEX: &str = "timers-by-owner";

/// Response body of a Mango `_find` query.
#[derive(Debug, Deserialize)]
pub struct FindResponse {
    /// Matching documents.
    pub docs: Vec<CouchTimerDocument>,
}

/// Timer as stored in CouchDB, levels embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchTimerDocument {
    /// `timer::<uuid>`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Current revision, absent on the first write.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Timer fields stored next to `_id` and `_rev`.
    #[serde(flatten)]
    pub timer: TimerBody,
}

/// Document fields besides `_id` and `_rev`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerBody {
    /// User allowed to see and change the timer.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Levels in playing order.
    pub levels: Vec<LevelEntity>,
    /// Zero-based playback cursor.
    pub current_level: usize,
    /// Playback advanced past the last level.
    pub is_complete: bool,
    /// Set on the first save.
    pub created_at: SystemTime,
    /// Set on every save.
    pub updated_at: SystemTime,
}

impl From<(TimerEntity, Option<String>)> for CouchTimerDocument {
    fn from((timer, rev): (TimerEntity, Option<String>)) -> Self {
        Self {
            id: timer_doc_id(timer.id),
            rev,
            timer: TimerBody {
                owner_id: timer.owner_id,
                name: timer.name,
                levels: timer.levels,
                current_level: timer.current_level,
                is_complete: timer.is_complete,
                created_at: timer.created_at,
                updated_at: timer.updated_at,
            },
        }
    }
}

impl TryFrom<CouchTimerDocument> for TimerEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchTimerDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            owner_id: doc.timer.owner_id,
            name: doc.timer.name,
            levels: doc.timer.levels,
            current_level: doc.timer.current_level,
            is_complete: doc.timer.is_complete,
            created_at: doc.timer.created_at,
            updated_at: doc.timer.updated_at,
        })
    }
}

/// Document ID of the timer `id`.
pub fn timer_doc_id(id: Uuid) -> String {
    format!("{}{}", TIMER_PREFIX, id)
}

/// Timer UUID encoded in a document ID.
pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let id = doc_id
        .strip_prefix(TIMER_PREFIX)
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing timer prefix",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use serde_json::json;

    use super::*;
    use crate::dao::models::LevelKindEntity;

    #[test]
    fn document_flattens_the_timer_body() {
        let id = Uuid::new_v4();
        let entity = TimerEntity {
            id,
            owner_id: "alice".into(),
            name: "Friday".into(),
            levels: vec![LevelEntity {
                id: Uuid::new_v4(),
                kind: LevelKindEntity::Blind,
                timer_id: id,
                small_blind: 5,
                big_blind: 10,
                ante: 0,
                duration_minutes: 15,
                duration_seconds: 900,
            }],
            current_level: 0,
            is_complete: false,
            created_at: UNIX_EPOCH,
            updated_at: UNIX_EPOCH,
        };

        let doc = CouchTimerDocument::from((entity.clone(), Some("1-abc".into())));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_id"], json!(format!("timer::{id}")));
        assert_eq!(value["_rev"], json!("1-abc"));
        assert_eq!(value["owner_id"], json!("alice"));
        assert_eq!(value["levels"][0]["kind"], json!("blind"));

        let back = TimerEntity::try_from(doc).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn foreign_document_ids_are_rejected() {
        assert!(matches!(
            extract_uuid("game::123"),
            Err(CouchDaoError::InvalidDocId { .. })
        ));
        assert!(matches!(
            extract_uuid("timer::not-a-uuid"),
            Err(CouchDaoError::InvalidDocId { kind: "invalid UUID", .. })
        ));
    }
}
