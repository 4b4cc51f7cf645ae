use serde::{Deserialize, Serialize};

/// Header line that opens a formatted reference block
pub const REFERENCES_HEADER: &str = "References:";

/// A citation attached to a search-family result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub index: u32,
    pub title: String,
    pub link: String,
}

impl Reference {
    pub fn new(index: u32, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Normalized result of one call, built fresh per call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,
}

impl CompletionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }

    pub fn push_text(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    /// Text followed by the trailing reference block, if any
    pub fn formatted(&self) -> String {
        if self.references.is_empty() {
            return self.text.clone();
        }

        let separator = if self.text.is_empty() || self.text.ends_with("\n\n") {
            ""
        } else if self.text.ends_with('\n') {
            "\n"
        } else {
            "\n\n"
        };

        format!(
            "{}{}{}",
            self.text,
            separator,
            format_references(&self.references)
        )
    }
}

impl std::fmt::Display for CompletionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// Render references as `[index] title` followed by an indented link line
pub fn format_references(references: &[Reference]) -> String {
    let mut block = String::from(REFERENCES_HEADER);
    block.push('\n');
    for reference in references {
        block.push_str(&format!(
            "[{}] {}\n  {}\n",
            reference.index, reference.title, reference.link
        ));
    }
    block
}

/// Recover the entries of the last reference block in `text`
pub fn parse_reference_block(text: &str) -> Vec<Reference> {
    let Some(start) = find_block_start(text) else {
        return Vec::new();
    };

    let mut references = Vec::new();
    let mut lines = text[start..].lines().skip(1);

    while let Some(line) = lines.next() {
        let Some(rest) = line.strip_prefix('[') else {
            break;
        };
        let Some((index, title)) = rest.split_once("] ") else {
            break;
        };
        let Ok(index) = index.parse::<u32>() else {
            break;
        };
        let link = lines
            .next()
            .and_then(|l| l.strip_prefix("  "))
            .unwrap_or_default();
        references.push(Reference::new(index, title, link));
    }

    references
}

fn find_block_start(text: &str) -> Option<usize> {
    let marker = format!("\n{}\n", REFERENCES_HEADER);
    if let Some(pos) = text.rfind(&marker) {
        return Some(pos + 1);
    }
    let header = format!("{}\n", REFERENCES_HEADER);
    text.starts_with(&header).then_some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_without_references() {
        let result = CompletionResult::new("Plain answer");
        assert_eq!(result.formatted(), "Plain answer");
    }

    #[test]
    fn test_formatted_with_references() {
        let result = CompletionResult::new("Answer").with_references(vec![
            Reference::new(1, "A", "http://a"),
            Reference::new(2, "B", "http://b"),
        ]);

        assert_eq!(
            result.formatted(),
            "Answer\n\nReferences:\n[1] A\n  http://a\n[2] B\n  http://b\n"
        );
        assert_eq!(result.to_string(), result.formatted());
    }

    #[test]
    fn test_separator_respects_trailing_newline() {
        let refs = vec![Reference::new(1, "A", "http://a")];

        let result = CompletionResult::new("Answer\n").with_references(refs.clone());
        assert!(result.formatted().starts_with("Answer\n\nReferences:"));

        let result = CompletionResult::new("").with_references(refs);
        assert!(result.formatted().starts_with("References:"));
    }

    #[test]
    fn test_reference_block_round_trip() {
        let refs = vec![Reference::new(1, "A", "http://a")];
        let formatted = CompletionResult::new("Body text").with_references(refs.clone()).formatted();

        assert_eq!(parse_reference_block(&formatted), refs);
    }

    #[test]
    fn test_parse_keeps_order_and_brackets_in_titles() {
        let refs = vec![
            Reference::new(3, "Third [draft] title", "https://c.example/x?y=1"),
            Reference::new(1, "First", "https://a.example"),
        ];

        assert_eq!(parse_reference_block(&format_references(&refs)), refs);
    }

    #[test]
    fn test_parse_without_block() {
        assert!(parse_reference_block("no citations here").is_empty());
    }
}
