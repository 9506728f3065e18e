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
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::queue::is_due;
use crate::study::get::get_handler;
use crate::study::post::post_handler;
use crate::study::state::MutableState;
use crate::study::state::ServerState;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

pub async fn start_server(
    collection: Collection,
    deck_name: Option<String>,
    port: u16,
) -> Fallible<()> {
    let (deck_label, deck_id) = match deck_name {
        Some(name) => match collection.db.get_deck(&name)? {
            Some(deck) => (deck.name, Some(deck.deck_id)),
            None => return fail("deck does not exist."),
        },
        None => ("All decks".to_string(), None),
    };

    let cards: Vec<Card> = collection.db.list_cards(deck_id)?;
    if cards.is_empty() {
        return fail("no cards to study.");
    }
    log::debug!("Studying {} cards.", cards.len());

    // Start on the first due card, or the first card when nothing is due.
    let now = Timestamp::now();
    let current = cards
        .iter()
        .position(|card| is_due(&card.state, now))
        .unwrap_or(0);

    let state = ServerState {
        deck_label,
        mutable: Arc::new(Mutex::new(MutableState {
            reveal: false,
            db: collection.db,
            cards,
            current,
            reviewed_count: 0,
        })),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/script.js", get(script));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("0.0.0.0:{port}");

    // Start a separate task to open the browser.
    let url = format!("http://localhost:{port}/");
    let connect = bind.clone();
    tokio::spawn(async move {
        loop {
            if let Ok(stream) = TcpStream::connect(&connect).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        let _ = open::that(url);
    });

    // Start the server.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn script() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/javascript")],
        include_str!("script.js"),
    )
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
