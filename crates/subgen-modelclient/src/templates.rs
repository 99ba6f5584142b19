//! Immutable prompt template registry (spec.md §4.5: "Prompt template is
//! selected by (language, mode) from an immutable registry; templates are
//! values, not code").

use std::collections::HashMap;
use std::path::Path;

use subgen_models::Target;

use crate::error::{ModelError, ModelResult};

/// One versioned prompt template. `version` participates in the request
/// fingerprint so a template edit invalidates memoized/cached responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub version: u32,
    pub text: String,
}

impl PromptTemplate {
    /// Substitute `{{language}}` / `{{mode}}` placeholders. No other
    /// templating logic — the template is a value, not a program.
    pub fn render(&self, target: &Target) -> String {
        self.text
            .replace("{{language}}", &target.language)
            .replace("{{mode}}", target.mode.as_deref().unwrap_or(""))
    }
}

/// Maps `(language, mode)` to a [`PromptTemplate`]. Built once at startup
/// and never mutated afterward.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplateRegistry {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptTemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: &Target, template: PromptTemplate) {
        self.templates.insert(target.key(), template);
    }

    pub fn get(&self, target: &Target) -> ModelResult<&PromptTemplate> {
        self.templates.get(&target.key()).ok_or_else(|| ModelError::NoTemplate {
            language: target.language.clone(),
            mode: target.mode.clone(),
        })
    }

    /// Load one template per `.txt` file in `dir`, keyed by filename stem
    /// (`eng.txt` -> language `eng`; `eng_sdh.txt` -> language `eng`, mode
    /// `sdh`). The first line must be `version: N`; the remainder is the
    /// template body.
    pub fn load_dir(dir: impl AsRef<Path>) -> ModelResult<Self> {
        let dir = dir.as_ref();
        let mut registry = Self::new();
        if !dir.exists() {
            return Ok(registry);
        }

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s,
                None => continue,
            };
            let (language, mode) = match stem.split_once('_') {
                Some((lang, mode)) => (lang.to_string(), Some(mode.to_string())),
                None => (stem.to_string(), None),
            };
            let contents = std::fs::read_to_string(&path)?;
            let (version, text) = parse_versioned_template(&contents);
            let target = match &mode {
                Some(m) => Target::with_mode(language, m.clone()),
                None => Target::new(language),
            };
            registry.insert(&target, PromptTemplate { version, text });
        }

        Ok(registry)
    }
}

fn parse_versioned_template(contents: &str) -> (u32, String) {
    if let Some(rest) = contents.strip_prefix("version:") {
        if let Some((version_line, body)) = rest.split_once('\n') {
            if let Ok(version) = version_line.trim().parse::<u32>() {
                return (version, body.trim_start_matches('\n').to_string());
            }
        }
    }
    (1, contents.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_language_and_mode() {
        let template = PromptTemplate { version: 1, text: "Transcribe to {{language}} ({{mode}})".to_string() };
        let rendered = template.render(&Target::with_mode("spa", "sdh"));
        assert_eq!(rendered, "Transcribe to spa (sdh)");
    }

    #[test]
    fn registry_lookup_misses_return_no_template_error() {
        let registry = PromptTemplateRegistry::new();
        let err = registry.get(&Target::new("eng")).unwrap_err();
        assert!(matches!(err, ModelError::NoTemplate { .. }));
    }

    #[test]
    fn load_dir_parses_versioned_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eng.txt"), "version: 3\nGenerate subtitles in {{language}}.").unwrap();
        std::fs::write(dir.path().join("eng_sdh.txt"), "Generate SDH subtitles in {{language}}.").unwrap();

        let registry = PromptTemplateRegistry::load_dir(dir.path()).unwrap();

        let eng = registry.get(&Target::new("eng")).unwrap();
        assert_eq!(eng.version, 3);
        assert!(eng.text.contains("Generate subtitles"));

        let eng_sdh = registry.get(&Target::with_mode("eng", "sdh")).unwrap();
        assert_eq!(eng_sdh.version, 1);
    }

    #[test]
    fn missing_dir_yields_empty_registry() {
        let registry = PromptTemplateRegistry::load_dir("/nonexistent/subgen-prompt-dir").unwrap();
        assert!(registry.get(&Target::new("eng")).is_err());
    }
}
