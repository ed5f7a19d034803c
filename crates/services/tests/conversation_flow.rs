use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coach_core::model::{RecallQuality, Turn, VocabularyItem};
use coach_core::time::fixed_now;
use services::{
    AiGateway, AiProvider, AppServices, Clock, GatewayError, GatewayErrorKind, GrammarCorrection,
    VocabularySource,
};
use storage::repository::Storage;

struct CannedGateway;

#[async_trait]
impl AiGateway for CannedGateway {
    fn provider(&self) -> AiProvider {
        AiProvider::OpenAi
    }

    async fn chat(
        &self,
        _system: &str,
        history: &[Turn],
        message: &str,
    ) -> Result<String, GatewayError> {
        Ok(format!("({}) You said: {message}", history.len()))
    }

    async fn vocabulary_list(
        &self,
        _level: &str,
        _count: usize,
    ) -> Result<Vec<VocabularyItem>, GatewayError> {
        Err(GatewayError::new(GatewayErrorKind::Network, "offline"))
    }

    async fn correct_grammar(&self, text: &str) -> Result<GrammarCorrection, GatewayError> {
        Ok(GrammarCorrection {
            corrected: text.replace("don't", "doesn't"),
            feedback: "3인칭 단수에는 doesn't를 씁니다.".to_string(),
        })
    }
}

async fn services(name: &str) -> AppServices {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let storage = Storage::sqlite(&url).await.expect("connect sqlite");
    AppServices::from_parts(
        storage,
        Some(Arc::new(CannedGateway)),
        Clock::fixed(fixed_now()),
        Duration::ZERO,
    )
    .expect("services")
}

#[tokio::test]
async fn dialogue_is_saved_and_resumed_across_turns() {
    let services = services("memdb_conversation_flow").await;
    let conversations = services.conversations();

    let first = conversations
        .send("restaurant", None, "A table for two, please.")
        .await
        .expect("first turn");
    let resumed = conversations
        .resume("restaurant")
        .await
        .expect("resume")
        .expect("saved dialogue");
    assert_eq!(resumed.id, first.id);

    let second = conversations
        .send("restaurant", Some(resumed), "Could we see the menu?")
        .await
        .expect("second turn");
    assert_eq!(second.turns.len(), 4);
    assert_eq!(second.turns[3].content, "(2) You said: Could we see the menu?");
    assert_eq!(second.preview(), "A table for two, please.");

    let history = conversations.history("restaurant").await.expect("history");
    assert_eq!(history.len(), 1);
    assert!(conversations.history("airport").await.expect("history").is_empty());
}

#[tokio::test]
async fn vocabulary_falls_back_and_words_can_be_reviewed() {
    let services = services("memdb_vocabulary_flow").await;

    let list = services
        .vocabulary()
        .vocabulary_list("A1", Some(3))
        .await
        .expect("vocabulary");
    assert_eq!(list.source, VocabularySource::Fallback);
    assert_eq!(list.items.len(), 3);

    let reviews = services.reviews();
    for item in list.items {
        reviews.add_word(item).await.expect("add word");
    }
    assert_eq!(reviews.due_words().await.expect("due").len(), 3);

    let quality = RecallQuality::new(4).expect("quality");
    let state = reviews.review("hello", quality).await.expect("review");
    assert_eq!(state.repetitions(), 1);

    let due: Vec<_> = reviews
        .due_words()
        .await
        .expect("due")
        .iter()
        .map(|w| w.word().to_string())
        .collect();
    assert_eq!(due, vec!["book", "water"]);
}

#[tokio::test]
async fn corrected_writing_is_listed_and_extends_streak() {
    let services = services("memdb_writing_flow").await;

    let record = services
        .writing()
        .correct("He don't like apples.")
        .await
        .expect("correction");
    assert_eq!(record.corrected, "He doesn't like apples.");

    let history = services.writing().history().await.expect("history");
    assert_eq!(history, vec![record]);
    let progress = services.progress().progress().await.expect("progress");
    assert_eq!(progress.streak, 1);
    assert_eq!(progress.last_date, Some(fixed_now().date_naive()));
}
