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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::card::Deck;
use crate::types::card::DeckId;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// The deck/card store. The connection sits behind a mutex so that
/// read-modify-write of a card's review state is serialized per database,
/// which is stricter than the per-card serialization the scheduler needs.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Create a new deck. Deck names are unique.
    pub fn create_deck(&self, name: &str, created_at: Timestamp) -> Fallible<DeckId> {
        if self.get_deck(name)?.is_some() {
            return fail("a deck with that name already exists.");
        }
        let conn = self.acquire();
        let sql = "insert into decks (name, created_at) values (?, ?) returning deck_id;";
        let deck_id: DeckId = conn.query_row(sql, (name, created_at), |row| row.get(0))?;
        Ok(deck_id)
    }

    pub fn list_decks(&self) -> Fallible<Vec<Deck>> {
        let conn = self.acquire();
        let sql = "select deck_id, name, created_at from decks order by deck_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut decks = Vec::new();
        while let Some(row) = rows.next()? {
            decks.push(Deck {
                deck_id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            });
        }
        Ok(decks)
    }

    pub fn get_deck(&self, name: &str) -> Fallible<Option<Deck>> {
        let conn = self.acquire();
        let sql = "select deck_id, name, created_at from decks where name = ?;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Deck {
                deck_id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Delete a deck and, through the foreign key cascade, its cards.
    pub fn delete_deck(&self, deck_id: DeckId) -> Fallible<()> {
        let conn = self.acquire();
        let affected = conn.execute("delete from decks where deck_id = ?;", [deck_id])?;
        if affected == 0 {
            return fail("no such deck.");
        }
        Ok(())
    }

    pub fn add_card(
        &self,
        deck_id: DeckId,
        question: &str,
        answer: &str,
        tags: &[String],
        state: &ReviewState,
    ) -> Fallible<CardId> {
        log::debug!("Adding card to deck {deck_id}.");
        let conn = self.acquire();
        let sql = "insert into cards (deck_id, question, answer, tags, status, interval_minutes, ease, next_review_at, review_count, last_rating, streak, created_at) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) returning card_id;";
        let card_id: CardId = conn.query_row(
            sql,
            (
                deck_id,
                question,
                answer,
                tags.join(","),
                state.status,
                state.interval_minutes,
                state.ease,
                state.next_review_at,
                state.review_count,
                state.last_rating,
                state.streak,
                state.created_at,
            ),
            |row| row.get(0),
        )?;
        Ok(card_id)
    }

    /// List cards, in insertion order, optionally restricted to one deck.
    pub fn list_cards(&self, deck_id: Option<DeckId>) -> Fallible<Vec<Card>> {
        let conn = self.acquire();
        let mut cards = Vec::new();
        match deck_id {
            Some(deck_id) => {
                let sql = "select card_id, deck_id, question, answer, tags, status, interval_minutes, ease, next_review_at, review_count, last_rating, streak, created_at from cards where deck_id = ? order by card_id;";
                let mut stmt = conn.prepare(sql)?;
                let mut rows = stmt.query([deck_id])?;
                while let Some(row) = rows.next()? {
                    cards.push(read_card(row)?);
                }
            }
            None => {
                let sql = "select card_id, deck_id, question, answer, tags, status, interval_minutes, ease, next_review_at, review_count, last_rating, streak, created_at from cards order by card_id;";
                let mut stmt = conn.prepare(sql)?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    cards.push(read_card(row)?);
                }
            }
        }
        Ok(cards)
    }

    pub fn delete_card(&self, card_id: CardId) -> Fallible<()> {
        let conn = self.acquire();
        let affected = conn.execute("delete from cards where card_id = ?;", [card_id])?;
        if affected == 0 {
            return fail("no such card.");
        }
        Ok(())
    }

    /// Replace a card's review state with the scheduler's output.
    pub fn update_review_state(&self, card_id: CardId, state: &ReviewState) -> Fallible<()> {
        let conn = self.acquire();
        let sql = "update cards set status = ?, interval_minutes = ?, ease = ?, next_review_at = ?, review_count = ?, last_rating = ?, streak = ? where card_id = ?;";
        let affected = conn.execute(
            sql,
            (
                state.status,
                state.interval_minutes,
                state.ease,
                state.next_review_at,
                state.review_count,
                state.last_rating,
                state.streak,
                card_id,
            ),
        )?;
        if affected == 0 {
            return fail("no such card.");
        }
        Ok(())
    }

    pub fn card_count(&self, deck_id: Option<DeckId>) -> Fallible<usize> {
        let conn = self.acquire();
        let count: i64 = match deck_id {
            Some(deck_id) => conn.query_row(
                "select count(*) from cards where deck_id = ?;",
                [deck_id],
                |row| row.get(0),
            )?,
            None => conn.query_row("select count(*) from cards;", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

fn read_card(row: &Row) -> rusqlite::Result<Card> {
    let tags: String = row.get(4)?;
    let tags: Vec<String> = if tags.is_empty() {
        Vec::new()
    } else {
        tags.split(',').map(|t| t.to_string()).collect()
    };
    Ok(Card {
        card_id: row.get(0)?,
        deck_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        tags,
        state: ReviewState {
            status: row.get(5)?,
            interval_minutes: row.get(6)?,
            ease: row.get(7)?,
            next_review_at: row.get(8)?,
            review_count: row.get(9)?,
            last_rating: row.get(10)?,
            streak: row.get(11)?,
            created_at: row.get(12)?,
        },
    })
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["decks"], |row| row.get(0))?;
    Ok(count > 0)
}
