//! Page templates wrapping the rendered body.
//!
//! A template is plain text with `${name}` placeholders. `body`, `toc`,
//! `generator` and `title` are always defined; any configured variable is
//! available under its own name. Unknown placeholders are left as they are.

use std::{fs, path::Path};

use rustc_hash::FxHashMap;

use crate::Error;

/// Name of the built-in page template.
pub const DEFAULT_TEMPLATE: &str = "page";

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="generator" content="${generator}">
<title>${title}</title>
</head>
<body>
${toc}${body}</body>
</html>
"#;

/// Templates by name.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: FxHashMap<String, String>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(DEFAULT_TEMPLATE, PAGE);
        registry
    }
}

impl TemplateRegistry {
    /// A registry holding only the built-in `page` template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry without any template.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(name.into(), text.into());
    }

    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Register every `*.html` file of `dir` under its file stem.
    ///
    /// # Errors
    /// Returns an error if the directory or one of its templates cannot be
    /// read.
    pub fn load_dir(mut self, dir: &Path) -> Result<Self, Error> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|extension| extension != "html") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            tracing::debug!(template = name, path = ?path, "template registered");
            self.insert(name, fs::read_to_string(&path)?);
        }
        Ok(self)
    }

    /// Look up `name`, failing when it is not registered.
    ///
    /// # Errors
    /// Returns [`Error::MissingTemplate`] for an unknown name.
    pub fn require(&self, name: &str) -> Result<&str, Error> {
        self.get(name)
            .ok_or_else(|| Error::MissingTemplate(name.to_string()))
    }
}

/// Replace each `${name}` of `template` with `lookup(name)`.
pub(crate) fn expand<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let (before, placeholder) = rest.split_at(start);
        output.push_str(before);
        let Some(end) = placeholder.find('}') else {
            rest = placeholder;
            break;
        };
        let name = placeholder.get(2..end).unwrap_or_default();
        match lookup(name) {
            Some(value) => output.push_str(value),
            None => output.push_str(placeholder.get(..=end).unwrap_or_default()),
        }
        rest = placeholder.get(end + 1..).unwrap_or_default();
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup(name: &str) -> Option<&'static str> {
        match name {
            "body" => Some("<p>x</p>"),
            "lang" => Some("en"),
            _ => None,
        }
    }

    #[rstest]
    #[case::body("<main>${body}</main>", "<main><p>x</p></main>")]
    #[case::variable("<html lang=\"${lang}\">", "<html lang=\"en\">")]
    #[case::unknown("${nope} stays", "${nope} stays")]
    #[case::unterminated("tail ${body", "tail ${body")]
    #[case::adjacent("${lang}${lang}", "enen")]
    fn test_expand(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(expand(template, lookup), expected);
    }

    #[test]
    fn test_missing_template() {
        let registry = TemplateRegistry::empty();
        assert!(matches!(
            registry.require("page"),
            Err(Error::MissingTemplate(name)) if name == "page"
        ));
        assert!(TemplateRegistry::new().require(DEFAULT_TEMPLATE).is_ok());
    }

    #[test]
    fn test_load_dir() -> Result<(), Error> {
        let dir = std::env::temp_dir().join(format!("mdext-templates-{}", std::process::id()));
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("plain.html"), "${body}")?;
        fs::write(dir.join("notes.txt"), "ignored")?;
        let registry = TemplateRegistry::empty().load_dir(&dir)?;
        fs::remove_dir_all(&dir)?;
        assert_eq!(registry.get("plain"), Some("${body}"));
        assert_eq!(registry.get("notes"), None);
        Ok(())
    }
}
