//! Prompt text and response parsing shared by the vendor clients.

use serde::Deserialize;

use coach_core::model::VocabularyItem;

use super::gateway::{GatewayError, GatewayErrorKind, GrammarCorrection};

/// Language used for vocabulary translations and grammar feedback.
pub const TRANSLATION_LANGUAGE: &str = "Korean";

#[must_use]
pub fn conversation_system_prompt(scenario: &str) -> String {
    format!(
        "You are a helpful English conversation partner in a {scenario} scenario. \
         Respond naturally and helpfully in English."
    )
}

#[must_use]
pub fn vocabulary_prompt(level: &str, count: usize) -> String {
    format!(
        "Please generate a list of {count} English vocabulary words suitable for the CEFR level \"{level}\".\n\
         For each word, provide its IPA transcription, definition in English, translation in \
         {TRANSLATION_LANGUAGE}, an example sentence, and a simple mnemonic.\n\
         Your response MUST be a valid JSON array of objects, with no other text, explanations, \
         or markdown formatting.\n\
         Each object in the array should have the following structure: \
         {{ \"word\": \"...\", \"ipa\": \"...\", \"definition\": \"...\", \"translation\": \"...\", \
         \"exampleSentence\": \"...\", \"mnemonic\": \"...\" }}."
    )
}

#[must_use]
pub fn grammar_system_prompt() -> String {
    format!(
        "You are an expert English grammar tutor. Correct grammar errors and provide \
         detailed feedback in {TRANSLATION_LANGUAGE}.\n\
         Your response MUST be a valid JSON object with no other text or markdown formatting, \
         shaped like {{ \"corrected\": \"...\", \"feedback\": \"...\" }}."
    )
}

#[must_use]
pub fn grammar_prompt(text: &str) -> String {
    format!("Please correct the following English text and provide detailed feedback:\n\n{text}")
}

/// Remove a surrounding markdown code fence, if any.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) up to the first newline.
        text = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWord {
    word: String,
    #[serde(alias = "definition")]
    meaning: String,
    #[serde(default, alias = "exampleSentence")]
    example: String,
    #[serde(default)]
    ipa: Option<String>,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    mnemonic: Option<String>,
}

/// Parse a vendor vocabulary payload into validated items.
///
/// # Errors
///
/// Returns `EmptyResponse` for blank text or an empty array, and
/// `InvalidResponse` for anything that is not an array of words.
pub fn parse_vocabulary(raw: &str) -> Result<Vec<VocabularyItem>, GatewayError> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(GatewayError::new(
            GatewayErrorKind::EmptyResponse,
            "vocabulary response was empty",
        ));
    }

    let words: Vec<WireWord> = serde_json::from_str(text)
        .map_err(|e| GatewayError::new(GatewayErrorKind::InvalidResponse, e.to_string()))?;
    if words.is_empty() {
        return Err(GatewayError::new(
            GatewayErrorKind::EmptyResponse,
            "vocabulary response contained no words",
        ));
    }

    words
        .into_iter()
        .map(|w| {
            let mut item = VocabularyItem::new(w.word, w.meaning, w.example)
                .map_err(|e| GatewayError::new(GatewayErrorKind::InvalidResponse, e.to_string()))?;
            if let Some(ipa) = w.ipa {
                item = item.with_ipa(ipa);
            }
            if let Some(translation) = w.translation {
                item = item.with_translation(translation);
            }
            if let Some(mnemonic) = w.mnemonic {
                item = item.with_mnemonic(mnemonic);
            }
            Ok(item)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct WireCorrection {
    corrected: String,
    #[serde(default, alias = "explanation")]
    feedback: String,
}

/// Parse a vendor grammar-correction payload.
///
/// # Errors
///
/// Returns `EmptyResponse` for blank text or a blank correction, and
/// `InvalidResponse` for anything that is not a correction object.
pub fn parse_correction(raw: &str) -> Result<GrammarCorrection, GatewayError> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(GatewayError::new(
            GatewayErrorKind::EmptyResponse,
            "grammar response was empty",
        ));
    }

    let wire: WireCorrection = serde_json::from_str(text)
        .map_err(|e| GatewayError::new(GatewayErrorKind::InvalidResponse, e.to_string()))?;
    let corrected = wire.corrected.trim();
    if corrected.is_empty() {
        return Err(GatewayError::new(
            GatewayErrorKind::EmptyResponse,
            "grammar response had no corrected text",
        ));
    }
    Ok(GrammarCorrection {
        corrected: corrected.to_string(),
        feedback: wire.feedback.trim().to_string(),
    })
}
