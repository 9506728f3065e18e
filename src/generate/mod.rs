// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod client;
pub mod parser;
pub mod prompt;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::generate::client::OllamaClient;
use crate::generate::parser::GeneratedCard;
use crate::generate::parser::parse_generated_cards;
use crate::generate::prompt::card_prompt;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

const AI_TAG: &str = "ai";

/// Cap on the fallback answer when the model output has no Q/A structure.
const FALLBACK_ANSWER_CHARS: usize = 200;

/// Generate cards for an existing deck and insert them with fresh review
/// states. Returns the model used and the number of cards added.
pub async fn generate_cards(
    collection: &Collection,
    deck_name: &str,
    topic: &str,
    count: usize,
) -> Fallible<(String, usize)> {
    let deck = match collection.db.get_deck(deck_name)? {
        Some(deck) => deck,
        None => return fail("deck does not exist."),
    };

    let client = OllamaClient::new(&collection.config.ollama);
    let prompt = card_prompt(topic, count);
    let (model, response) = client
        .generate_any(&collection.config.ollama.models, &prompt)
        .await?;
    log::debug!("Model {model} produced {} bytes.", response.len());

    let mut cards = parse_generated_cards(&response);
    if cards.is_empty() {
        // Nothing structured came back. Keep the session useful by turning
        // the raw response into a single card.
        cards.push(GeneratedCard {
            question: format!("Explain: {topic}"),
            answer: truncate_chars(response.trim(), FALLBACK_ANSWER_CHARS).to_string(),
        });
    }

    let tags = vec![AI_TAG.to_string()];
    let added = cards.len();
    for card in cards {
        let state = ReviewState::new(Timestamp::now());
        collection
            .db
            .add_card(deck.deck_id, &card.question, &card.answer, &tags, &state)?;
    }
    Ok((model, added))
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        // Truncation counts characters, not bytes.
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
    }
}
