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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;

const CONFIG_FILE_NAME: &str = "aicards.toml";

/// Collection-level configuration, read from `aicards.toml` in the
/// collection directory. Every field has a default, and the file itself is
/// optional.
#[derive(Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub study: StudyConfig,
    pub proxy: ProxyConfig,
}

#[derive(Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the inference server.
    pub url: String,
    /// Models to try for card generation, in order of preference.
    pub models: Vec<String>,
    pub temperature: f64,
    pub max_tokens: i64,
}

#[derive(Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct StudyConfig {
    pub port: u16,
}

#[derive(Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    pub port: u16,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            models: vec![
                "phi4-mini".to_string(),
                "phi".to_string(),
                "mistral".to_string(),
                "llama2".to_string(),
                "tinyllama".to_string(),
            ],
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { port: 5500 }
    }
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if path.exists() {
            let content = read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ollama.url, "http://localhost:11434");
        assert_eq!(config.ollama.models[0], "phi4-mini");
        assert_eq!(config.study.port, 8000);
        assert_eq!(config.proxy.port, 5500);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() -> Fallible<()> {
        let dir = tempdir()?;
        let config = Config::load(dir.path())?;
        assert_eq!(config.study.port, 8000);
        Ok(())
    }

    #[test]
    fn test_load_partial_file() -> Fallible<()> {
        let dir = tempdir()?;
        let content = r#"
[ollama]
url = "http://localhost:9999"
models = ["llama2"]

[study]
port = 8123
"#;
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), content)?;
        let config = Config::load(dir.path())?;
        assert_eq!(config.ollama.url, "http://localhost:9999");
        assert_eq!(config.ollama.models, vec!["llama2".to_string()]);
        // Unspecified fields keep their defaults.
        assert_eq!(config.ollama.temperature, 0.7);
        assert_eq!(config.study.port, 8123);
        assert_eq!(config.proxy.port, 5500);
        Ok(())
    }

    #[test]
    fn test_unknown_key_rejected() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "derp = 1\n")?;
        assert!(Config::load(dir.path()).is_err());
        Ok(())
    }
}
