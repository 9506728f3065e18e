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

use clap::Parser;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::generate::generate_cards;
use crate::proxy::start_proxy;
use crate::stats::StatsFormat;
use crate::stats::print_stats;
use crate::study::server::start_server;
use crate::types::card::CardId;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Study cards in the browser.
    Study {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Restrict the session to one deck.
        #[arg(long)]
        deck: Option<String>,
        /// Override the configured port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate cards for a deck with a local language model.
    Generate {
        /// The topic to generate cards about.
        topic: String,
        /// The deck to add the cards to.
        #[arg(long)]
        deck: String,
        /// How many cards to ask for.
        #[arg(long, default_value_t = 3)]
        count: usize,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Add a card by hand.
    Add {
        /// The deck to add the card to.
        #[arg(long)]
        deck: String,
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Create a deck.
    NewDeck {
        name: String,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// List decks.
    Decks {
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Delete a deck and all its cards.
    DeleteDeck {
        name: String,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Delete a card by id.
    DeleteCard {
        id: CardId,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Print collection statistics.
    Stats {
        /// Optional path to the collection directory.
        directory: Option<String>,
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Run the CORS relay in front of the inference server.
    Proxy {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Override the configured port.
        #[arg(long)]
        port: Option<u16>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Study {
            directory,
            deck,
            port,
        } => {
            let collection = Collection::open(directory)?;
            let port = port.unwrap_or(collection.config.study.port);
            start_server(collection, deck, port).await
        }
        Command::Generate {
            topic,
            deck,
            count,
            directory,
        } => {
            if count == 0 {
                return fail("count must be positive.");
            }
            let collection = Collection::open(directory)?;
            let (model, added) = generate_cards(&collection, &deck, &topic, count).await?;
            println!("Added {added} cards to {deck} with {model}.");
            Ok(())
        }
        Command::Add {
            deck,
            question,
            answer,
            tags,
            directory,
        } => {
            let collection = Collection::open(directory)?;
            let deck = match collection.db.get_deck(&deck)? {
                Some(deck) => deck,
                None => return fail("deck does not exist."),
            };
            let tags: Vec<String> = match tags {
                Some(tags) => tags.split(',').map(|t| t.trim().to_string()).collect(),
                None => Vec::new(),
            };
            let state = ReviewState::new(Timestamp::now());
            let card_id = collection
                .db
                .add_card(deck.deck_id, &question, &answer, &tags, &state)?;
            println!("Added card {card_id} to {}.", deck.name);
            Ok(())
        }
        Command::NewDeck { name, directory } => {
            let collection = Collection::open(directory)?;
            collection.db.create_deck(&name, Timestamp::now())?;
            println!("Created deck {name}.");
            Ok(())
        }
        Command::Decks { directory } => {
            let collection = Collection::open(directory)?;
            let decks = collection.db.list_decks()?;
            if decks.is_empty() {
                println!("No decks yet.");
            }
            for deck in decks {
                let count = collection.db.card_count(Some(deck.deck_id))?;
                println!("{} ({count} cards)", deck.name);
            }
            Ok(())
        }
        Command::DeleteDeck { name, directory } => {
            let collection = Collection::open(directory)?;
            let deck = match collection.db.get_deck(&name)? {
                Some(deck) => deck,
                None => return fail("deck does not exist."),
            };
            collection.db.delete_deck(deck.deck_id)?;
            println!("Deleted deck {name}.");
            Ok(())
        }
        Command::DeleteCard { id, directory } => {
            let collection = Collection::open(directory)?;
            collection.db.delete_card(id)?;
            println!("Deleted card {id}.");
            Ok(())
        }
        Command::Stats { directory, format } => {
            let collection = Collection::open(directory)?;
            print_stats(&collection, format, Timestamp::now())
        }
        Command::Proxy { directory, port } => {
            let collection = Collection::open(directory)?;
            let port = port.unwrap_or(collection.config.proxy.port);
            start_proxy(port, collection.config.ollama).await
        }
    }
}
