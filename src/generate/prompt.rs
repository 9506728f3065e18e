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

/// Builds the generation prompt. The format instructions are spelled out
/// with an example pair because small local models drift away from terse
/// format descriptions.
pub fn card_prompt(topic: &str, count: usize) -> String {
    format!(
        "Create {count} educational flashcards about: {topic}.\n\
         Format EXACTLY like this:\n\
         Q: What is photosynthesis?\n\
         A: The process plants use to convert sunlight into energy.\n\
         \n\
         Q: Another question?\n\
         A: Another answer."
    )
}
