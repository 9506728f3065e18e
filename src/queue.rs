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

use crate::types::card::Card;
use crate::types::review_state::ReviewState;
use crate::types::review_state::Status;
use crate::types::timestamp::Timestamp;

/// Whether a card is eligible for review at `now`. New cards are always
/// eligible, and a card that was never scheduled is treated as due
/// immediately.
pub fn is_due(state: &ReviewState, now: Timestamp) -> bool {
    if state.status == Status::New {
        return true;
    }
    match state.next_review_at {
        None => true,
        Some(next_review_at) => next_review_at <= now,
    }
}

/// Filters the card sequence down to the due ones, preserving the input
/// order. Callers wanting a priority ordering layer it on top.
pub fn due_cards(cards: &[Card], now: Timestamp) -> Vec<&Card> {
    cards
        .iter()
        .filter(|card| is_due(&card.state, now))
        .collect()
}

/// Picks the index of the next card to show after `current`, scanning
/// forward cyclically for the nearest due card. The current card is
/// considered last, after a full wrap, so the presenter never repeats one
/// due card while others are waiting. If nothing is due, falls back to the
/// plain next index so the deck can still be paged through.
///
/// Must not be called with an empty sequence.
pub fn pick_next(cards: &[Card], current: usize, now: Timestamp) -> usize {
    assert!(!cards.is_empty(), "pick_next called with no cards");
    for offset in 1..=cards.len() {
        let index = (current + offset) % cards.len();
        if is_due(&cards[index].state, now) {
            return index;
        }
    }
    (current + 1) % cards.len()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::types::review_state::Rating;

    fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    }

    fn card(card_id: i64, state: ReviewState) -> Card {
        Card {
            card_id,
            deck_id: 1,
            question: format!("q{card_id}"),
            answer: format!("a{card_id}"),
            tags: Vec::new(),
            state,
        }
    }

    fn scheduled(status: Status, next_review_at: Option<Timestamp>) -> ReviewState {
        ReviewState {
            status,
            interval_minutes: 10.0,
            ease: 2.5,
            next_review_at,
            review_count: 1,
            last_rating: Some(Rating::Good),
            streak: 1,
            created_at: t0(),
        }
    }

    #[test]
    fn test_new_cards_are_always_due() {
        // Even with a future next_review_at, a new card is eligible.
        let state = scheduled(Status::New, Some(t0().plus_minutes(60.0)));
        assert!(is_due(&state, t0()));
        assert!(is_due(&ReviewState::new(t0()), t0()));
    }

    #[test]
    fn test_unscheduled_card_is_due() {
        let state = scheduled(Status::Review, None);
        assert!(is_due(&state, t0()));
    }

    #[test]
    fn test_due_by_time() {
        let past = scheduled(Status::Review, Some(t0()));
        assert!(is_due(&past, t0()));
        let future = scheduled(Status::Review, Some(t0().plus_minutes(1.0)));
        assert!(!is_due(&future, t0()));
        assert!(is_due(&future, t0().plus_minutes(1.0)));
    }

    #[test]
    fn test_due_cards_preserves_order() {
        let cards = vec![
            card(10, scheduled(Status::Review, Some(t0()))),
            card(20, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
            card(30, ReviewState::new(t0())),
            card(40, scheduled(Status::Learning, Some(t0()))),
        ];
        let due = due_cards(&cards, t0());
        let ids: Vec<i64> = due.iter().map(|c| c.card_id).collect();
        assert_eq!(ids, vec![10, 30, 40]);
    }

    #[test]
    fn test_pick_next_finds_only_due_card() {
        let cards = vec![
            card(1, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
            card(2, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
            card(3, scheduled(Status::Review, Some(t0()))),
        ];
        assert_eq!(pick_next(&cards, 0, t0()), 2);
    }

    #[test]
    fn test_pick_next_falls_back_to_plain_next() {
        let cards = vec![
            card(1, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
            card(2, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
            card(3, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
        ];
        assert_eq!(pick_next(&cards, 1, t0()), 2);
        assert_eq!(pick_next(&cards, 2, t0()), 0);
    }

    #[test]
    fn test_pick_next_prefers_other_due_cards() {
        // Cards 0 and 2 are both due; from 0 the scan lands on 2 first.
        let cards = vec![
            card(1, ReviewState::new(t0())),
            card(2, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
            card(3, ReviewState::new(t0())),
        ];
        assert_eq!(pick_next(&cards, 0, t0()), 2);
    }

    #[test]
    fn test_pick_next_wraps_back_to_current() {
        // Only the current card is due: the full wrap comes back to it.
        let cards = vec![
            card(1, ReviewState::new(t0())),
            card(2, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
            card(3, scheduled(Status::Review, Some(t0().plus_minutes(60.0)))),
        ];
        assert_eq!(pick_next(&cards, 0, t0()), 0);
    }

    #[test]
    fn test_pick_next_single_card() {
        let due = vec![card(1, ReviewState::new(t0()))];
        assert_eq!(pick_next(&due, 0, t0()), 0);
        let not_due = vec![card(1, scheduled(Status::Review, Some(t0().plus_minutes(60.0))))];
        assert_eq!(pick_next(&not_due, 0, t0()), 0);
    }
}
