//! In-memory store of exams awaiting answers, keyed by the session cookie.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use examforge_core::ExamSession;

/// Name of the cookie carrying the session key.
pub const SESSION_COOKIE: &str = "examforge_session";

/// An unanswered exam is dropped once this many multiples of its allotted
/// time have passed since it started.
pub const EXPIRY_FACTOR: i64 = 3;

/// When `session` stops being answerable.
pub fn expires_at(session: &ExamSession) -> DateTime<Utc> {
    let ttl = Duration::minutes(i64::from(session.params.total_time) * EXPIRY_FACTOR);
    session
        .started_at
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Shared map of session key to pending exam.
///
/// Expired exams are pruned on every insert and are never returned. The lock
/// is never held across an `.await`.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, ExamSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ExamSession>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store `session` under `key`, replacing any exam already there.
    pub fn insert(&self, key: Uuid, session: ExamSession) {
        self.insert_at(key, session, Utc::now());
    }

    /// Like [`Self::insert`], pruning against `now`.
    pub fn insert_at(&self, key: Uuid, session: ExamSession, now: DateTime<Utc>) {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| expires_at(s) > now);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "dropped expired exam sessions");
        }
        sessions.insert(key, session);
    }

    pub fn get(&self, key: &Uuid) -> Option<ExamSession> {
        self.get_at(key, Utc::now())
    }

    /// The exam under `key`, unless it has expired by `now`.
    pub fn get_at(&self, key: &Uuid, now: DateTime<Utc>) -> Option<ExamSession> {
        let mut sessions = self.lock();
        match sessions.get(key) {
            Some(session) if expires_at(session) > now => Some(session.clone()),
            Some(_) => {
                sessions.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, key: &Uuid) -> Option<ExamSession> {
        self.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Pull the session key out of a `Cookie` header value.
pub fn session_key_from_cookie(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for `key`.
pub fn session_cookie(key: Uuid) -> String {
    format!("{SESSION_COOKIE}={key}; Path=/; HttpOnly; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use examforge_core::model::{ExamParams, Question, Questions};

    fn exam_session() -> ExamSession {
        ExamSession::new(
            ExamParams {
                subject: "Physics".into(),
                topic: "Optics".into(),
                num_questions: 1,
                marks_per_question: 5,
                total_time: 10,
                comment: String::new(),
            },
            Questions {
                questions: vec![Question {
                    question_text: "Define refraction.".into(),
                    marks: 5,
                }],
            },
            Utc::now(),
        )
    }

    #[test]
    fn parse_cookie_header() {
        let key = Uuid::new_v4();
        let header = format!("theme=dark; {SESSION_COOKIE}={key}; other=1");
        assert_eq!(session_key_from_cookie(&header), Some(key));
        assert_eq!(session_key_from_cookie("theme=dark"), None);
        assert_eq!(
            session_key_from_cookie(&format!("{SESSION_COOKIE}=not-a-uuid")),
            None
        );
    }

    #[test]
    fn cookie_round_trips_through_header() {
        let key = Uuid::new_v4();
        let set_cookie = session_cookie(key);
        let value = set_cookie.split(';').next().unwrap();
        assert_eq!(session_key_from_cookie(value), Some(key));
    }

    #[test]
    fn store_insert_get_remove() {
        let store = SessionStore::new();
        let key = Uuid::new_v4();
        assert!(store.is_empty());

        store.insert(key, exam_session());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key).unwrap().params.topic, "Optics");

        assert!(store.remove(&key).is_some());
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn expired_sessions_are_not_returned() {
        let store = SessionStore::new();
        let key = Uuid::new_v4();
        let session = exam_session();
        let expiry = expires_at(&session);
        assert_eq!(expiry - session.started_at, Duration::minutes(30));

        store.insert(key, session);
        assert!(store.get_at(&key, expiry - Duration::seconds(1)).is_some());
        assert!(store.get_at(&key, expiry).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn insert_prunes_abandoned_exams() {
        let store = SessionStore::new();
        let started = Utc::now();
        for _ in 0..500 {
            store.insert_at(Uuid::new_v4(), exam_session(), started);
        }
        assert_eq!(store.len(), 500);

        let later = started + Duration::hours(1);
        let fresh = Uuid::new_v4();
        let mut session = exam_session();
        session.started_at = later;
        store.insert_at(fresh, session, later);
        assert_eq!(store.len(), 1);
        assert!(store.get_at(&fresh, later).is_some());
    }
}
