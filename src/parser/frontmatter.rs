//! YAML frontmatter handling for markdown components

use serde_yaml::Value;

/// Parse content into optional YAML frontmatter (between the first `---`
/// and the second `---`) and body. Returns `None` if no valid frontmatter.
pub fn parse_frontmatter_and_body(content: &str) -> Option<(Value, String)> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 3 || lines[0].trim() != "---" {
        return None;
    }
    let end_idx = lines[1..].iter().position(|l| l.trim() == "---")? + 1;
    let frontmatter_str = lines[1..end_idx].join("\n");
    let body = lines[end_idx + 1..].join("\n");
    let value: Value = serde_yaml::from_str(&frontmatter_str).ok()?;
    if value.as_mapping().is_none() && !value.is_null() {
        return None;
    }
    Some((value, body))
}

/// Get a string value from a frontmatter mapping by top-level key.
pub fn get_str(value: &Value, key: &str) -> Option<String> {
    let mapping = value.as_mapping()?;
    match mapping.get(Value::String(key.to_string()))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extract a human-readable description from a markdown component file:
/// the frontmatter `description:` key when present, otherwise the first
/// non-empty line that is neither a heading nor a `---` delimiter.
pub fn extract_description(content: &str) -> Option<String> {
    if let Some((frontmatter, body)) = parse_frontmatter_and_body(content) {
        if let Some(description) = get_str(&frontmatter, "description") {
            let trimmed = description.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        return first_content_line(&body);
    }
    first_content_line(content)
}

fn first_content_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && *line != "---")
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frontmatter() {
        assert!(parse_frontmatter_and_body("just body\nno delimiters").is_none());
    }

    #[test]
    fn test_parse_frontmatter_and_body() {
        let content = "---\ndescription: hello\n---\n\nbody here";
        let (fm, body) = parse_frontmatter_and_body(content).expect("should parse");
        assert_eq!(get_str(&fm, "description").as_deref(), Some("hello"));
        assert_eq!(body.trim(), "body here");
    }

    #[test]
    fn test_description_from_frontmatter() {
        let content = "---\ndescription: Deploys the app\n---\n# Deploy\nSome body";
        assert_eq!(
            extract_description(content).as_deref(),
            Some("Deploys the app")
        );
    }

    #[test]
    fn test_description_falls_back_to_first_content_line() {
        let content = "# Title\n\nRuns the full test suite.\nMore text";
        assert_eq!(
            extract_description(content).as_deref(),
            Some("Runs the full test suite.")
        );
    }

    #[test]
    fn test_description_skips_delimiters_and_headings() {
        let content = "---\nauthor: someone\n---\n## Heading\n\nActual description";
        assert_eq!(
            extract_description(content).as_deref(),
            Some("Actual description")
        );
    }

    #[test]
    fn test_description_none_for_heading_only_file() {
        assert_eq!(extract_description("# Only a heading"), None);
    }
}
