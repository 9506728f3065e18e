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

/// A question/answer pair extracted from model output. Just a shell: the
/// review state is attached when the card is inserted.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GeneratedCard {
    pub question: String,
    pub answer: String,
}

/// Extracts `Q:`/`A:` pairs from free-form model output.
///
/// Prefixes are matched case-insensitively. A non-empty line directly after
/// a question is accepted as the answer even without the `A:` prefix, since
/// models frequently drop it. Anything that never forms a complete pair is
/// discarded.
pub fn parse_generated_cards(text: &str) -> Vec<GeneratedCard> {
    let mut cards = Vec::new();
    let mut question = String::new();
    let mut answer = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("q:") {
            if !question.is_empty() && !answer.is_empty() {
                cards.push(GeneratedCard {
                    question: question.clone(),
                    answer: answer.clone(),
                });
            }
            question = trimmed[2..].trim().to_string();
            answer.clear();
        } else if lower.starts_with("a:") {
            answer = trimmed[2..].trim().to_string();
        } else if !trimmed.is_empty() && !question.is_empty() && answer.is_empty() {
            answer = trimmed.to_string();
        }
    }
    if !question.is_empty() && !answer.is_empty() {
        cards.push(GeneratedCard { question, answer });
    }

    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_pairs() {
        let text = "Q: What is mitosis?\nA: Cell division.\n\nQ: What is meiosis?\nA: Division producing gametes.";
        let cards = parse_generated_cards(text);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "What is mitosis?");
        assert_eq!(cards[0].answer, "Cell division.");
        assert_eq!(cards[1].question, "What is meiosis?");
        assert_eq!(cards[1].answer, "Division producing gametes.");
    }

    #[test]
    fn test_parse_case_insensitive_prefixes() {
        let text = "q: lowercase question?\na: lowercase answer.";
        let cards = parse_generated_cards(text);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "lowercase question?");
    }

    #[test]
    fn test_answer_without_prefix() {
        let text = "Q: What is an enzyme?\nA protein that catalyzes reactions.";
        let cards = parse_generated_cards(text);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].answer, "A protein that catalyzes reactions.");
    }

    #[test]
    fn test_surrounding_chatter_ignored() {
        let text = "Sure! Here are your flashcards:\n\nQ: What is RAM?\nA: Volatile working memory.\n\nHope this helps!";
        let cards = parse_generated_cards(text);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "What is RAM?");
        assert_eq!(cards[0].answer, "Volatile working memory.");
    }

    #[test]
    fn test_question_without_answer_discarded() {
        let text = "Q: A question with no answer?";
        let cards = parse_generated_cards(text);
        assert!(cards.is_empty());
    }

    #[test]
    fn test_unstructured_text_yields_nothing() {
        let text = "The French Revolution began in 1789 and reshaped Europe.";
        let cards = parse_generated_cards(text);
        assert!(cards.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_generated_cards("").is_empty());
    }

    #[test]
    fn test_later_answer_line_does_not_overwrite() {
        // Once a pair is complete, stray lines are ignored until the next Q:.
        let text = "Q: One?\nA: First.\nSecond stray line.\nQ: Two?\nA: Done.";
        let cards = parse_generated_cards(text);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].answer, "First.");
    }
}
