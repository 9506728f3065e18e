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

use crate::error::Fallible;
use crate::error::fail;
use crate::types::review_state::Rating;
use crate::types::review_state::ReviewState;
use crate::types::review_state::Status;
use crate::types::timestamp::Timestamp;

/// The lower bound on a card's ease factor.
pub const MIN_EASE: f64 = 1.3;

/// The upper bound on a card's ease factor.
pub const MAX_EASE: f64 = 3.0;

/// The ease factor every card starts with.
pub const INITIAL_EASE: f64 = 2.5;

/// The maximum review interval: 30 days, in minutes.
pub const MAX_INTERVAL_MINUTES: f64 = 30.0 * 24.0 * 60.0;

/// Computes a card's next review state from its current state and the
/// user's rating.
///
/// Pure function: the only clock it sees is the `now` passed in, and the
/// input state is not mutated. The entry state must satisfy the documented
/// invariants; a state with ease or interval out of bounds is rejected
/// rather than repaired, since clamping caller garbage would mask upstream
/// corruption.
pub fn schedule(state: &ReviewState, rating: Rating, now: Timestamp) -> Fallible<ReviewState> {
    if !(MIN_EASE..=MAX_EASE).contains(&state.ease) {
        return fail("ease out of bounds on entry.");
    }
    if !(0.0..=MAX_INTERVAL_MINUTES).contains(&state.interval_minutes) {
        return fail("interval out of bounds on entry.");
    }

    let interval = state.interval_minutes;
    let ease = state.ease;

    // New and learning cards get small fixed intervals to establish
    // short-term memory. Review cards grow exponentially, scaled by ease.
    // Forgetting a review card demotes it to relearning with a sharply
    // shrunk interval instead of resetting it to new.
    let (status, interval, ease_delta) = match (state.status, rating) {
        (Status::New, Rating::Again) => (Status::Learning, 1.0, 0.0),
        (Status::New, Rating::Hard) => (Status::Learning, 5.0, 0.0),
        (Status::New, Rating::Good) => (Status::Review, 10.0, 0.0),
        (Status::New, Rating::Easy) => (Status::Review, 15.0, 0.15),
        (Status::Learning, Rating::Again) => (Status::Learning, 1.0, -0.2),
        (Status::Learning, Rating::Hard) => (Status::Learning, 5.0, -0.15),
        (Status::Learning, Rating::Good) => (Status::Review, 10.0, 0.0),
        (Status::Learning, Rating::Easy) => (Status::Review, 30.0, 0.15),
        (Status::Review | Status::Relearning, Rating::Again) => {
            (Status::Relearning, (interval * 0.1).max(1.0), -0.2)
        }
        (Status::Review | Status::Relearning, Rating::Hard) => {
            (Status::Review, (interval * 0.6).max(5.0), -0.15)
        }
        (Status::Review | Status::Relearning, Rating::Good) => {
            (Status::Review, (interval * ease).max(10.0), 0.0)
        }
        (Status::Review | Status::Relearning, Rating::Easy) => {
            (Status::Review, (interval * 1.5 * ease).max(15.0), 0.15)
        }
    };

    let ease = (ease + ease_delta).clamp(MIN_EASE, MAX_EASE);
    let interval = interval.clamp(0.0, MAX_INTERVAL_MINUTES);
    let streak = match rating {
        Rating::Again => 0,
        _ => state.streak + 1,
    };

    Ok(ReviewState {
        status,
        interval_minutes: interval,
        ease,
        next_review_at: Some(now.plus_minutes(interval)),
        review_count: state.review_count + 1,
        last_rating: Some(rating),
        streak,
        created_at: state.created_at,
    })
}
