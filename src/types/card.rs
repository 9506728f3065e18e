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

use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

pub type DeckId = i64;
pub type CardId = i64;

/// A named group of cards. The scheduler is deck-agnostic: decks only exist
/// for organization and filtering.
#[derive(Clone)]
pub struct Deck {
    pub deck_id: DeckId,
    pub name: String,
    #[allow(dead_code)]
    pub created_at: Timestamp,
}

/// A flashcard. Embeds exactly one review state, which only the scheduler
/// replaces.
#[derive(Clone)]
pub struct Card {
    pub card_id: CardId,
    #[allow(dead_code)]
    pub deck_id: DeckId,
    pub question: String,
    pub answer: String,
    pub tags: Vec<String>,
    pub state: ReviewState,
}
