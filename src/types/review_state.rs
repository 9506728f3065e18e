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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use crate::scheduler::INITIAL_EASE;
use crate::types::timestamp::Timestamp;

/// Where a card sits in the learning cycle. There is no terminal state: a
/// card cycles between these statuses indefinitely.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// The card has never been scheduled.
    New,
    /// The card is in the short-interval learning phase.
    Learning,
    /// The card graduated to long-term review.
    Review,
    /// The card was forgotten at review and is being re-learned.
    Relearning,
}

/// The user's recall-quality signal for a single review.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Learning => "learning",
            Status::Review => "review",
            Status::Relearning => "relearning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Status::New),
            "learning" => Some(Status::Learning),
            "review" => Some(Status::Review),
            "relearning" => Some(Status::Relearning),
            _ => None,
        }
    }
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "again" => Some(Rating::Again),
            "hard" => Some(Rating::Hard),
            "good" => Some(Rating::Good),
            "easy" => Some(Rating::Easy),
            _ => None,
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Status::parse(&string)
            .ok_or_else(|| FromSqlError::Other(format!("unknown status: {string}").into()))
    }
}

impl ToSql for Rating {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Rating {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Rating::parse(&string)
            .ok_or_else(|| FromSqlError::Other(format!("unknown rating: {string}").into()))
    }
}

/// The per-card scheduling record. Owned by exactly one card and replaced
/// wholesale by the scheduler on every review.
#[derive(Clone, PartialEq, Debug)]
pub struct ReviewState {
    pub status: Status,
    /// Minutes until the next due time, as of the last scheduling decision.
    pub interval_minutes: f64,
    /// Multiplicative growth factor for successful review-state intervals.
    /// Always within `[1.3, 3.0]`.
    pub ease: f64,
    /// `None` means the card is due immediately.
    pub next_review_at: Option<Timestamp>,
    pub review_count: u32,
    pub last_rating: Option<Rating>,
    /// Consecutive non-Again ratings.
    pub streak: u32,
    pub created_at: Timestamp,
}

impl ReviewState {
    /// The state every freshly-created card starts in, regardless of whether
    /// it was written by hand or generated by a model.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            status: Status::New,
            interval_minutes: 0.0,
            ease: INITIAL_EASE,
            next_review_at: None,
            review_count: 0,
            last_rating: None,
            streak: 0,
            created_at,
        }
    }
}
