use std::collections::HashMap;

use crate::models::{Chunk, Language};

/// Fallback shown when no citation link resolves for a chunk.
pub const LINK_NOT_AVAILABLE: &str = "Not Available";

/// Serialize ranked chunks into the generation-ready context block.
///
/// One numbered block per chunk, in rank order:
///
/// ```text
/// [Source 1: Minimum Wages Act | Link: https://...]
/// The minimum wage is fixed at...
/// ```
///
/// Blocks are joined with blank lines. `links` maps collection name to
/// its resolved citation link; missing entries render as
/// [`LINK_NOT_AVAILABLE`]. This string is the sole handoff artifact to
/// the answer-generation stage.
pub fn format_context(
    chunks: &[Chunk],
    language: Language,
    links: &HashMap<String, String>,
) -> String {
    let blocks: Vec<String> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let label = topic_label(chunk);
            let link = chunk
                .reference_link
                .as_deref()
                .filter(|l| !l.trim().is_empty())
                .or_else(|| links.get(&chunk.source_collection).map(String::as_str))
                .unwrap_or(LINK_NOT_AVAILABLE);
            let content = content_for_display(chunk, language);
            format!("[Source {}: {label} | Link: {link}]\n{content}", i + 1)
        })
        .collect();

    blocks.join("\n\n")
}

/// The chunk's own topic, else the titleized collection name.
fn topic_label(chunk: &Chunk) -> String {
    if let Some(topic) = chunk.topic.as_deref() {
        let topic = topic.trim();
        if !topic.is_empty() {
            return topic.to_string();
        }
    }
    titleize(&chunk.source_collection)
}

/// `minimum_wages_act` → `Minimum Wages Act`.
fn titleize(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display content for the requested language, falling back through:
/// requested language → other language → generic text field → source
/// label → the chunk's raw JSON representation.
fn content_for_display(chunk: &Chunk, language: Language) -> String {
    if let Some(content) = chunk.content_for(language) {
        return content.to_string();
    }
    if let Some(content) = chunk.content_for(language.other()) {
        return content.to_string();
    }
    if let Some(text) = chunk.text.as_deref() {
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }
    let label = chunk.source_label.trim();
    if !label.is_empty() {
        return label.to_string();
    }
    serde_json::to_string(chunk).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(collection: &str, content_en: Option<&str>, content_hi: Option<&str>) -> Chunk {
        Chunk {
            id: "1".to_string(),
            source_collection: collection.to_string(),
            content_en: content_en.map(str::to_string),
            content_hi: content_hi.map(str::to_string),
            embedding_en: None,
            embedding_hi: None,
            source_label: String::new(),
            topic: None,
            text: None,
            reference_link: None,
        }
    }

    #[test]
    fn test_titleize_collection_names() {
        assert_eq!(titleize("minimum_wages_act"), "Minimum Wages Act");
        assert_eq!(titleize("shops-establishments"), "Shops Establishments");
    }

    #[test]
    fn test_blocks_are_numbered_and_labelled() {
        let mut links = HashMap::new();
        links.insert(
            "minimum_wages_act".to_string(),
            "https://example.org/mwa".to_string(),
        );
        let chunks = vec![
            chunk("minimum_wages_act", Some("Wages are fixed."), None),
            chunk("factories_act", Some("Safety rules apply."), None),
        ];

        let out = format_context(&chunks, Language::En, &links);
        assert!(out.starts_with(
            "[Source 1: Minimum Wages Act | Link: https://example.org/mwa]\nWages are fixed."
        ));
        assert!(out.contains("[Source 2: Factories Act | Link: Not Available]"));
        assert!(out.contains("\n\n"));
    }

    #[test]
    fn test_topic_field_preferred_over_collection_name() {
        let mut c = chunk("acts", Some("content"), None);
        c.topic = Some("Overtime Pay".to_string());
        let out = format_context(&[c], Language::En, &HashMap::new());
        assert!(out.contains("[Source 1: Overtime Pay"));
    }

    #[test]
    fn test_content_falls_back_to_other_language() {
        let c = chunk("acts", None, Some("मजदूरी तय है।"));
        let out = format_context(&[c], Language::En, &HashMap::new());
        assert!(out.contains("मजदूरी तय है।"));
    }

    #[test]
    fn test_content_falls_back_to_generic_text_then_label() {
        let mut c = chunk("acts", None, None);
        c.text = Some("legacy body".to_string());
        let out = format_context(&[c.clone()], Language::En, &HashMap::new());
        assert!(out.contains("legacy body"));

        c.text = None;
        c.source_label = "Payment of Wages Act".to_string();
        let out = format_context(&[c], Language::En, &HashMap::new());
        assert!(out.contains("Payment of Wages Act"));
    }

    #[test]
    fn test_hindi_requested_prefers_hindi_content() {
        let c = chunk("acts", Some("English body"), Some("हिंदी सामग्री"));
        let out = format_context(&[c], Language::Hi, &HashMap::new());
        assert!(out.contains("हिंदी सामग्री"));
        assert!(!out.contains("English body"));
    }

    #[test]
    fn test_empty_input_formats_to_empty_string() {
        assert_eq!(format_context(&[], Language::En, &HashMap::new()), "");
    }
}
