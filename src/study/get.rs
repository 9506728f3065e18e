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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::markdown::markdown_to_html;
use crate::queue::due_cards;
use crate::study::state::ServerState;
use crate::study::template::page_template;
use crate::types::timestamp::Timestamp;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mutable = state.mutable.lock().unwrap();
    let now = Timestamp::now();
    let due_count = due_cards(&mutable.cards, now).len();
    let card = mutable.cards[mutable.current].clone();
    let question = markdown_to_html(&card.question);
    let answer = markdown_to_html(&card.answer);

    let card_content: Markup = if mutable.reveal {
        html! {
            div.content {
                div .question .rich-text {
                    (PreEscaped(question))
                }
                div .answer .rich-text {
                    (PreEscaped(answer))
                }
            }
        }
    } else {
        html! {
            div.content {
                div.question .rich-text {
                    (PreEscaped(question))
                }
                div.answer .rich-text {}
            }
        }
    };
    let card_controls = if mutable.reveal {
        html! {
            form action="/" method="post" {
                input id="prev" type="submit" name="action" value="Prev";
                div.spacer {}
                input id="again" type="submit" name="action" value="Again";
                input id="hard" type="submit" name="action" value="Hard";
                input id="good" type="submit" name="action" value="Good";
                input id="easy" type="submit" name="action" value="Easy";
                div.spacer {}
                input id="next" type="submit" name="action" value="Next";
            }
        }
    } else {
        html! {
            form action="/" method="post" {
                input id="prev" type="submit" name="action" value="Prev";
                div.spacer {}
                input id="reveal" type="submit" name="action" value="Reveal";
                div.spacer {}
                input id="next" type="submit" name="action" value="Next";
            }
        }
    };
    let progress = format!(
        "{} / {} · {} due · {} reviewed",
        mutable.current + 1,
        mutable.cards.len(),
        due_count,
        mutable.reviewed_count
    );
    let body = html! {
        div.root {
            div.card {
                div.header {
                    h1 {
                        (state.deck_label)
                    }
                    div.progress {
                        (progress)
                    }
                }
                (card_content)
                @if !card.tags.is_empty() {
                    div.tags {
                        @for tag in &card.tags {
                            span.tag { (tag) }
                        }
                    }
                }
                div.status {
                    (card.state.status.as_str())
                }
                div.controls {
                    (card_controls)
                }
            }
        }
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}
