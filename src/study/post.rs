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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::error::Fallible;
use crate::queue::pick_next;
use crate::scheduler::schedule;
use crate::study::state::ServerState;
use crate::types::review_state::Rating;
use crate::types::timestamp::Timestamp;

#[derive(Debug, Deserialize)]
enum Action {
    Reveal,
    Prev,
    Next,
    Again,
    Hard,
    Good,
    Easy,
}

impl Action {
    pub fn rating(&self) -> Rating {
        match self {
            Action::Again => Rating::Again,
            Action::Hard => Rating::Hard,
            Action::Good => Rating::Good,
            Action::Easy => Rating::Easy,
            _ => panic!("Action does not correspond to a rating"),
        }
    }
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    match action_handler(state, form.action).await {
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
        }
    }
    Redirect::to("/")
}

async fn action_handler(state: ServerState, action: Action) -> Fallible<()> {
    let mut mutable = state.mutable.lock().unwrap();
    match action {
        Action::Reveal => {
            if mutable.reveal {
                log::error!("Revealing a card that is already revealed.");
            } else {
                mutable.reveal = true;
            }
        }
        Action::Prev => {
            let len = mutable.cards.len();
            let current = mutable.current;
            mutable.current = (current + len - 1) % len;
            mutable.reveal = false;
        }
        Action::Next => {
            let len = mutable.cards.len();
            let current = mutable.current;
            mutable.current = (current + 1) % len;
            mutable.reveal = false;
        }
        Action::Again | Action::Hard | Action::Good | Action::Easy => {
            if !mutable.reveal {
                log::error!("Rating a card that is not revealed.");
            } else {
                let rating = action.rating();
                let now = Timestamp::now();
                let current = mutable.current;
                let card_id = mutable.cards[current].card_id;

                let next_state = schedule(&mutable.cards[current].state, rating, now)?;
                log::debug!(
                    "Card {card_id} {} interval={:.1}m ease={:.2} status={}",
                    rating.as_str(),
                    next_state.interval_minutes,
                    next_state.ease,
                    next_state.status.as_str()
                );
                mutable.db.update_review_state(card_id, &next_state)?;
                mutable.cards[current].state = next_state;
                mutable.reviewed_count += 1;
                let next_index = pick_next(&mutable.cards, current, now);
                mutable.current = next_index;
                mutable.reveal = false;
            }
        }
    }
    Ok(())
}
