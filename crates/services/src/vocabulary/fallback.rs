use coach_core::model::{CefrLevel, VocabularyItem};

// (word, meaning, example)
type Entry = (&'static str, &'static str, &'static str);

const A1: &[Entry] = &[
    ("hello", "안녕하세요", "You say hello, I say goodbye."),
    ("book", "책", "I am reading a very interesting book."),
    ("water", "물", "Please drink plenty of water."),
    ("apple", "사과", "An apple a day keeps the doctor away."),
    ("house", "집", "My house is in the city center."),
];

const B2: &[Entry] = &[
    ("articulate", "분명히 표현하다", "She is a highly articulate speaker."),
    (
        "comprehensive",
        "종합적인",
        "He has a comprehensive knowledge of the subject.",
    ),
    ("elaborate", "상세히 설명하다", "Could you elaborate on that point?"),
    (
        "feasible",
        "실행 가능한",
        "We need to find a feasible solution to this problem.",
    ),
    ("meticulous", "꼼꼼한", "He was meticulous in his work."),
];

/// Built-in word lists used when no vendor can supply vocabulary.
///
/// Only A1 and B2 have tables; every other level, including unparsable
/// input, gets the A1 list.
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabularyFallbackProvider;

impl VocabularyFallbackProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The first `count` words for `level`. Never fails; same input, same output.
    #[must_use]
    pub fn get(&self, level: &str, count: usize) -> Vec<VocabularyItem> {
        let table = match level.parse::<CefrLevel>() {
            Ok(CefrLevel::B2) => B2,
            _ => A1,
        };
        table
            .iter()
            .take(count)
            .filter_map(|(word, meaning, example)| {
                VocabularyItem::new(*word, *meaning, *example).ok()
            })
            .collect()
    }
}
