use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TICKER: &str = "NVDA";

/// Per-session front-end state: the ticker on screen and the user's favorites.
///
/// Lives with the caller and is passed to handlers explicitly; the analysis engines never
/// see it. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    active_ticker: String,
    favorites: Vec<String>,
    favorite_names: HashMap<String, String>,
}

fn normalize(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

impl AppState {
    pub fn new() -> Self {
        Self {
            active_ticker: DEFAULT_TICKER.to_string(),
            favorites: Vec::new(),
            favorite_names: HashMap::new(),
        }
    }

    pub fn active_ticker(&self) -> &str {
        &self.active_ticker
    }

    /// Switch the active ticker. Blank input is ignored and returns false.
    pub fn set_active(&mut self, ticker: &str) -> bool {
        let ticker = normalize(ticker);
        if ticker.is_empty() {
            return false;
        }
        self.active_ticker = ticker;
        true
    }

    /// Append a favorite; false if it is already present or blank
    pub fn add_favorite(&mut self, ticker: &str, display_name: Option<&str>) -> bool {
        let ticker = normalize(ticker);
        if ticker.is_empty() || self.favorites.contains(&ticker) {
            return false;
        }
        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            self.favorite_names.insert(ticker.clone(), name.to_string());
        }
        self.favorites.push(ticker);
        true
    }

    pub fn remove_favorite(&mut self, ticker: &str) -> bool {
        let ticker = normalize(ticker);
        let before = self.favorites.len();
        self.favorites.retain(|t| *t != ticker);
        self.favorite_names.remove(&ticker);
        self.favorites.len() != before
    }

    pub fn is_favorite(&self, ticker: &str) -> bool {
        self.favorites.contains(&normalize(ticker))
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    /// Company name recorded with the favorite, else the ticker itself
    pub fn display_name<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.favorite_names
            .get(&normalize(ticker))
            .map(String::as_str)
            .unwrap_or(ticker)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
