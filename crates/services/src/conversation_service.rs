use std::sync::Arc;

use tracing::{debug, warn};

use coach_core::model::{ConversationError, ConversationId, ConversationRecord, Turn};

use crate::Clock;
use crate::ai::{AiGateway, GatewayError, GatewayErrorKind, prompt};
use crate::conversation_store::ConversationSessionStore;
use crate::error::ConversationServiceError;

/// Scenario role-play: relays user turns to the gateway and saves the dialogue.
#[derive(Clone)]
pub struct ConversationService {
    clock: Clock,
    gateway: Option<Arc<dyn AiGateway>>,
    store: ConversationSessionStore,
}

impl ConversationService {
    #[must_use]
    pub fn new(
        clock: Clock,
        gateway: Option<Arc<dyn AiGateway>>,
        store: ConversationSessionStore,
    ) -> Self {
        Self {
            clock,
            gateway,
            store,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.gateway.is_some()
    }

    #[must_use]
    pub fn store(&self) -> &ConversationSessionStore {
        &self.store
    }

    /// Send `message` in `scenario`, continuing `conversation` or starting a
    /// new one, and return the saved dialogue including the reply.
    ///
    /// Input is validated before any I/O. When the gateway fails nothing is
    /// saved and the passed-in conversation is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ConversationServiceError::Conversation` for a blank scenario or
    /// message or a `conversation` from another scenario, `Disabled` without a
    /// gateway, `Gateway` when the vendor call
    /// fails, and `Storage` if the dialogue cannot be saved.
    pub async fn send(
        &self,
        scenario: &str,
        conversation: Option<ConversationRecord>,
        message: &str,
    ) -> Result<ConversationRecord, ConversationServiceError> {
        let scenario = scenario.trim();
        if scenario.is_empty() {
            return Err(ConversationError::EmptyScenario.into());
        }
        let user_turn = Turn::user(message)?;
        if let Some(record) = conversation.as_ref().filter(|r| r.scenario != scenario) {
            return Err(ConversationError::ScenarioMismatch {
                requested: scenario.to_string(),
                found: record.scenario.clone(),
            }
            .into());
        }
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(ConversationServiceError::Disabled)?;

        let mut record = match conversation {
            Some(record) => record,
            None => ConversationRecord::start(scenario, self.clock.now())?,
        };

        let system = prompt::conversation_system_prompt(&record.scenario);
        let reply = gateway
            .chat(&system, &record.turns, &user_turn.content)
            .await
            .inspect_err(|err| warn!(scenario, error = %err, "conversation reply failed"))?;
        let assistant_turn = Turn::assistant(reply)
            .map_err(|_| GatewayError::new(GatewayErrorKind::EmptyResponse, "reply was blank"))?;

        let now = self.clock.now();
        record.push(user_turn, now);
        record.push(assistant_turn, now);
        self.store.upsert(record.clone()).await?;
        debug!(id = %record.id, turns = record.turns.len(), "conversation saved");
        Ok(record)
    }

    /// Saved dialogues for `scenario`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ConversationServiceError::Storage` if the history cannot be read.
    pub async fn history(
        &self,
        scenario: &str,
    ) -> Result<Vec<ConversationRecord>, ConversationServiceError> {
        Ok(self.store.list(scenario).await?)
    }

    /// The dialogue to continue for `scenario`, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `ConversationServiceError::Storage` if the history cannot be read.
    pub async fn resume(
        &self,
        scenario: &str,
    ) -> Result<Option<ConversationRecord>, ConversationServiceError> {
        Ok(self.store.latest(scenario).await?)
    }

    /// # Errors
    ///
    /// Returns `ConversationServiceError::Storage` if the history cannot be written.
    pub async fn forget(&self, id: &ConversationId) -> Result<bool, ConversationServiceError> {
        Ok(self.store.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use coach_core::model::{Role, VocabularyItem};
    use coach_core::time::fixed_clock;
    use storage::repository::InMemoryStore;

    use crate::ai::{AiProvider, GrammarCorrection};

    #[derive(Default)]
    struct ScriptedGateway {
        fail: bool,
        seen: Mutex<Vec<(String, usize, String)>>,
    }

    #[async_trait]
    impl AiGateway for ScriptedGateway {
        fn provider(&self) -> AiProvider {
            AiProvider::OpenAi
        }

        async fn chat(
            &self,
            system: &str,
            history: &[Turn],
            message: &str,
        ) -> Result<String, GatewayError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), history.len(), message.to_string()));
            if self.fail {
                return Err(GatewayError::new(GatewayErrorKind::RateLimited, "slow down"));
            }
            Ok(format!("echo: {message}"))
        }

        async fn vocabulary_list(
            &self,
            _level: &str,
            _count: usize,
        ) -> Result<Vec<VocabularyItem>, GatewayError> {
            Err(GatewayError::new(GatewayErrorKind::NotConfigured, "unused"))
        }

        async fn correct_grammar(&self, _text: &str) -> Result<GrammarCorrection, GatewayError> {
            Err(GatewayError::new(GatewayErrorKind::NotConfigured, "unused"))
        }
    }

    fn service(gateway: Option<Arc<dyn AiGateway>>) -> ConversationService {
        let store = ConversationSessionStore::new(Arc::new(InMemoryStore::new()));
        ConversationService::new(fixed_clock(), gateway, store)
    }

    #[tokio::test]
    async fn send_starts_and_saves_dialogue() {
        let gateway = Arc::new(ScriptedGateway::default());
        let service = service(Some(gateway.clone()));

        let record = service.send("cafe", None, "One latte, please").await.unwrap();
        assert_eq!(record.scenario, "cafe");
        assert_eq!(record.turns.len(), 2);
        assert_eq!(record.turns[0].role, Role::User);
        assert_eq!(record.turns[1].content, "echo: One latte, please");

        let seen = gateway.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.contains("in a cafe scenario"));
        assert_eq!(seen[0].1, 0);

        assert_eq!(service.resume("cafe").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn send_continues_with_history() {
        let gateway = Arc::new(ScriptedGateway::default());
        let service = service(Some(gateway.clone()));

        let first = service.send("cafe", None, "Hi").await.unwrap();
        let second = service
            .send("cafe", Some(first.clone()), "Large, please")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.turns.len(), 4);
        assert_eq!(gateway.seen.lock().unwrap()[1].1, 2);

        let history = service.history("cafe").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].turns.len(), 4);
    }

    #[tokio::test]
    async fn conversation_from_other_scenario_is_rejected() {
        let gateway = Arc::new(ScriptedGateway::default());
        let service = service(Some(gateway.clone()));

        let cafe = service.send("cafe", None, "Hi").await.unwrap();
        let err = service
            .send("airport", Some(cafe.clone()), "Where is gate 12?")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConversationServiceError::Conversation(ConversationError::ScenarioMismatch {
                ref requested,
                ref found,
            }) if requested == "airport" && found == "cafe"
        ));
        assert_eq!(gateway.seen.lock().unwrap().len(), 1);
        assert_eq!(service.resume("cafe").await.unwrap(), Some(cafe));
        assert!(service.resume("airport").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_gateway() {
        let gateway = Arc::new(ScriptedGateway::default());
        let service = service(Some(gateway.clone()));

        let err = service.send("  ", None, "hello").await.unwrap_err();
        assert!(matches!(
            err,
            ConversationServiceError::Conversation(ConversationError::EmptyScenario)
        ));
        let err = service.send("cafe", None, " ").await.unwrap_err();
        assert!(matches!(
            err,
            ConversationServiceError::Conversation(ConversationError::EmptyMessage)
        ));
        assert!(gateway.seen.lock().unwrap().is_empty());
        assert!(service.store().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_failure_leaves_store_untouched() {
        let ok = service(Some(Arc::new(ScriptedGateway::default())));
        let saved = ok.send("cafe", None, "Hi").await.unwrap();

        let failing = ConversationService::new(
            fixed_clock(),
            Some(Arc::new(ScriptedGateway {
                fail: true,
                ..ScriptedGateway::default()
            })),
            ok.store().clone(),
        );
        let err = failing
            .send("cafe", Some(saved.clone()), "Another one")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConversationServiceError::Gateway(GatewayError {
                kind: GatewayErrorKind::RateLimited,
                ..
            })
        ));
        assert_eq!(ok.store().list_all().await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn missing_gateway_is_disabled() {
        let service = service(None);
        assert!(!service.enabled());
        let err = service.send("cafe", None, "Hi").await.unwrap_err();
        assert!(matches!(err, ConversationServiceError::Disabled));
    }

    #[tokio::test]
    async fn forget_removes_dialogue() {
        let service = service(Some(Arc::new(ScriptedGateway::default())));
        let record = service.send("hotel", None, "Check in").await.unwrap();
        assert!(service.forget(&record.id).await.unwrap());
        assert!(service.history("hotel").await.unwrap().is_empty());
    }
}
