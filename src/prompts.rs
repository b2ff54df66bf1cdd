//! The transcription prompt sent with every page image.
//!
//! Centralising the prompt here keeps it a single source of truth and lets
//! unit tests inspect it without a live model call. Callers override it via
//! [`crate::config::EnrichConfig::prompt`]; the constant is used only when no
//! override is provided.

/// Default instructional prompt for transcribing a page image to Markdown.
pub const DEFAULT_TRANSCRIBE_PROMPT: &str = r#"Transcribe the text content of this page image and output it in Markdown syntax (not inside code blocks). Follow these rules:

1. Examine the page carefully and identify every element: headings, body text, lists, tables, visualizations, captions, headers, footers, footnotes, and page numbers.

2. Headings and lists
   - Preserve heading levels: # for the main title, ## for sections, ### for subsections.
   - Preserve list markers: - or * for bulleted lists, 1. 2. 3. for numbered lists.
   - Do not repeat yourself.

3. Tables
   - Render tables in Markdown pipe format, ensuring every row has the same number of columns.
   - Do not split one table into several.
   - If a merged cell spans multiple rows or columns, place its content in the top-left cell and output ' ' for the other cells it covers.
   - If the table has sub-headers, keep them on their own row below the header row.

4. Visualizations
   - If the element is a chart or figure, describe it in prose in natural language.
   - Do not transcribe text embedded inside the visualization once it has been described.

5. Headers, footers, footnotes, page numbers
   - Transcribe each of these precisely as it appears on the page.

6. Paragraphs
   - Transcribe each text element precisely as it appears.

Here is the image."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_covers_required_instructions() {
        for needle in [
            "Markdown",
            "merged cell",
            "describe it in prose",
            "precisely as it appears",
            "same number of columns",
        ] {
            assert!(
                DEFAULT_TRANSCRIBE_PROMPT.contains(needle),
                "prompt must mention '{needle}'"
            );
        }
    }
}
