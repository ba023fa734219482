//! In-Memory Session Store Adapter
//!
//! Process-local session state behind a single `RwLock`. Every mutation runs
//! under the write lock, so each port operation is atomic.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::domain::persona::PersonaId;
use crate::domain::session::{DetectionState, IntelCategory, Message, Session};
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions held.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Apply `f` to a session under the write lock.
    async fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> T + Send,
    ) -> Result<T, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionStoreError::NotFound(id.clone()))?;
        Ok(f(session))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_if_absent(&self, id: &SessionId) -> Result<Session, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id.clone()));
        Ok(session.clone())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.read().await.contains_key(id))
    }

    async fn append_message(
        &self,
        id: &SessionId,
        message: Message,
    ) -> Result<u64, SessionStoreError> {
        self.with_session(id, |s| s.append_message(message)).await
    }

    async fn replace_messages(
        &self,
        id: &SessionId,
        messages: Vec<Message>,
    ) -> Result<bool, SessionStoreError> {
        self.with_session(id, |s| s.replace_messages(messages)).await
    }

    async fn update_detection(
        &self,
        id: &SessionId,
        detection: DetectionState,
    ) -> Result<bool, SessionStoreError> {
        self.with_session(id, |s| s.record_detection(detection)).await
    }

    async fn update_persona(
        &self,
        id: &SessionId,
        persona_id: PersonaId,
    ) -> Result<bool, SessionStoreError> {
        self.with_session(id, |s| s.assign_persona(persona_id)).await
    }

    async fn add_extracted(
        &self,
        id: &SessionId,
        category: IntelCategory,
        value: &str,
    ) -> Result<bool, SessionStoreError> {
        self.with_session(id, |s| s.add_extracted(category, value)).await
    }

    async fn mark_completed(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        self.with_session(id, |s| s.mark_completed()).await
    }

    async fn idle_epoch(&self, id: &SessionId) -> Result<u64, SessionStoreError> {
        self.with_session(id, |s| s.idle_epoch()).await
    }

    async fn begin_report(
        &self,
        id: &SessionId,
        expected_epoch: Option<u64>,
    ) -> Result<Session, SessionStoreError> {
        self.with_session(id, |s| {
            s.begin_report(expected_epoch)
                .map(|()| s.clone())
                .map_err(|reason| SessionStoreError::ReportRefused {
                    session_id: id.clone(),
                    reason,
                })
        })
        .await?
    }

    async fn finish_report(
        &self,
        id: &SessionId,
        delivered: bool,
    ) -> Result<bool, SessionStoreError> {
        self.with_session(id, |s| s.finish_report(delivered)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::ReportRefusal;
    use proptest::prelude::*;

    fn sid(id: &str) -> SessionId {
        SessionId::new(id).unwrap()
    }

    #[tokio::test]
    async fn create_if_absent_is_idempotent() {
        let store = InMemorySessionStore::new();
        let id = sid("s1");

        store.create_if_absent(&id).await.unwrap();
        store.append_message(&id, Message::scammer("hi")).await.unwrap();
        let again = store.create_if_absent(&id).await.unwrap();

        assert_eq!(again.total_messages(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_yield_one_session() {
        let store = InMemorySessionStore::new();
        let id = sid("race");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    store.create_if_absent(&id).await.unwrap();
                    store.append_message(&id, Message::scammer("x")).await.unwrap()
                })
            })
            .collect();

        let mut epochs = Vec::new();
        for handle in handles {
            epochs.push(handle.await.unwrap());
        }
        epochs.sort_unstable();

        assert_eq!(store.len().await, 1);
        assert_eq!(epochs, (1..=16).collect::<Vec<u64>>());
        assert_eq!(store.idle_epoch(&id).await.unwrap(), 16);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let err = store.idle_epoch(&sid("nope")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.get(&sid("nope")).await.unwrap().is_none());
        assert!(!store.exists(&sid("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn report_lease_round_trip() {
        let store = InMemorySessionStore::new();
        let id = sid("lease");
        store.create_if_absent(&id).await.unwrap();
        store
            .update_detection(&id, DetectionState::new(true, "phishing", 0.9))
            .await
            .unwrap();

        let snapshot = store.begin_report(&id, None).await.unwrap();
        assert!(snapshot.is_report_in_flight());

        let second = store.begin_report(&id, None).await.unwrap_err();
        assert_eq!(
            second,
            SessionStoreError::ReportRefused {
                session_id: id.clone(),
                reason: ReportRefusal::InFlight
            }
        );

        assert!(store.finish_report(&id, true).await.unwrap());
        let session = store.get(&id).await.unwrap().unwrap();
        assert!(session.is_completed());
    }

    #[tokio::test]
    async fn only_one_concurrent_lease_is_granted() {
        let store = InMemorySessionStore::new();
        let id = sid("contended");
        store.create_if_absent(&id).await.unwrap();
        store
            .update_detection(&id, DetectionState::new(true, "lottery", 0.8))
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move { store.begin_report(&id, None).await.is_ok() })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }
        assert_eq!(granted, 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Scammer(String),
        Agent(String),
        Extract(u8, String),
        Replace(usize),
        Complete,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[a-z ]{0,12}".prop_map(Op::Scammer),
            "[a-z ]{0,12}".prop_map(Op::Agent),
            (0u8..5, "[a-z@. ]{0,6}").prop_map(|(c, v)| Op::Extract(c, v)),
            (0usize..12).prop_map(Op::Replace),
            Just(Op::Complete),
        ]
    }

    proptest! {
        #[test]
        fn store_invariants_hold(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = InMemorySessionStore::new();
                let id = sid("prop");
                store.create_if_absent(&id).await.unwrap();

                let mut expected_epoch = 0u64;
                let mut frozen: Option<Session> = None;

                for op in ops {
                    match op {
                        Op::Scammer(text) => {
                            let epoch = store.append_message(&id, Message::scammer(text)).await.unwrap();
                            expected_epoch += 1;
                            prop_assert_eq!(epoch, expected_epoch);
                        }
                        Op::Agent(text) => {
                            let epoch = store.append_message(&id, Message::agent_reply(text)).await.unwrap();
                            prop_assert_eq!(epoch, expected_epoch);
                        }
                        Op::Extract(c, value) => {
                            store.add_extracted(&id, IntelCategory::ALL[c as usize], &value).await.unwrap();
                        }
                        Op::Replace(len) => {
                            let history = vec![Message::scammer("h"); len];
                            if store.replace_messages(&id, history).await.unwrap() {
                                expected_epoch = 0;
                            }
                        }
                        Op::Complete => {
                            store.mark_completed(&id).await.unwrap();
                        }
                    }

                    let session = store.get(&id).await.unwrap().unwrap();
                    prop_assert_eq!(session.total_messages(), session.messages().len());
                    prop_assert_eq!(session.idle_epoch(), expected_epoch);

                    for category in IntelCategory::ALL {
                        let values = session.extracted().get(category);
                        let mut unique = values.to_vec();
                        unique.sort();
                        unique.dedup();
                        prop_assert_eq!(unique.len(), values.len());
                        prop_assert!(values.iter().all(|v| !v.trim().is_empty()));
                    }

                    if let Some(before) = frozen.as_ref() {
                        prop_assert_eq!(before.extracted(), session.extracted());
                        prop_assert_eq!(before.detection(), session.detection());
                        prop_assert_eq!(before.persona_id(), session.persona_id());
                    }
                    if frozen.is_none() && session.is_completed() {
                        frozen = Some(session);
                    }
                }
                Ok(())
            })?;
        }
    }
}
