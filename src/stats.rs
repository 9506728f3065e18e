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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::queue::due_cards;
use crate::types::review_state::Status;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    deck_count: usize,
    card_count: usize,
    new_card_count: usize,
    due_card_count: usize,
    total_review_count: u64,
}

pub fn print_stats(collection: &Collection, format: StatsFormat, now: Timestamp) -> Fallible<()> {
    let decks = collection.db.list_decks()?;
    let cards = collection.db.list_cards(None)?;

    let stats = Stats {
        deck_count: decks.len(),
        card_count: cards.len(),
        new_card_count: cards
            .iter()
            .filter(|card| card.state.status == Status::New)
            .count(),
        due_card_count: due_cards(&cards, now).len(),
        total_review_count: cards
            .iter()
            .map(|card| card.state.review_count as u64)
            .sum(),
    };

    match format {
        StatsFormat::Text => {
            println!("Decks:   {}", stats.deck_count);
            println!("Cards:   {}", stats.card_count);
            println!("New:     {}", stats.new_card_count);
            println!("Due:     {}", stats.due_card_count);
            println!("Reviews: {}", stats.total_review_count);
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}
