//! Preloaded overlay graphics and text substitution

use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use vta_core::ValueMap;

/// Overlay markup keyed by identity key or `svg_url`
#[derive(Debug, Clone, Default)]
pub struct SvgStore {
    graphics: HashMap<String, String>,
}

impl SvgStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds markup under a key
    pub fn insert(&mut self, key: impl Into<String>, markup: impl Into<String>) {
        self.graphics.insert(key.into(), markup.into());
    }

    /// Looks up markup by identity key, falling back to the overlay's URL
    pub fn get(&self, key: &str, svg_url: Option<&str>) -> Option<&str> {
        self.graphics
            .get(key)
            .or_else(|| svg_url.and_then(|url| self.graphics.get(url)))
            .map(String::as_str)
    }

    /// Loads every `<key>.svg` file in a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("svg") {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()) {
                let markup = std::fs::read_to_string(&path)?;
                store.insert(key, markup);
            }
        }
        tracing::debug!(dir = %dir.display(), count = store.len(), "Loaded overlay graphics");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }
}

/// Reads the width/height ratio from the root element's `viewBox`
#[derive(Debug, Clone)]
pub struct ViewBox {
    pattern: Regex,
}

impl ViewBox {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r#"<svg\b[^>]*?\bviewBox\s*=\s*["']([^"']*)["']"#)?;
        Ok(Self { pattern })
    }

    /// Width over height, or 0 when the markup has no usable `viewBox`
    pub fn aspect_ratio(&self, markup: &str) -> f64 {
        let Some(captures) = self.pattern.captures(markup) else {
            return 0.0;
        };
        let values: Vec<f64> = captures[1]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse().ok())
            .collect();

        match values.as_slice() {
            [_, _, width, height] if *height > 0.0 => width / height,
            _ => 0.0,
        }
    }
}

/// Replaces every occurrence of each placeholder with its current value.
///
/// Placeholders without a resolved value are left untouched.
pub fn substitute(markup: &str, placeholders: &[String], values: &ValueMap) -> String {
    let mut text = markup.to_string();
    for name in placeholders {
        if name.is_empty() {
            continue;
        }
        match values.get(name) {
            Some(value) => text = text.replace(name.as_str(), value),
            None => tracing::debug!(placeholder = %name, "No value for overlay placeholder"),
        }
    }
    text
}
