//! Content renderers: stored widget text to display markup

use pulldown_cmark::{Options, Parser, html};

use crate::markup::Markup;

/// Converts a widget's stored content into display markup. Never fails;
/// input a renderer does not understand degrades to literal text.
pub trait Renderer {
    fn render(&self, content: &str) -> Markup;
}

/// Content is already markup
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, content: &str) -> Markup {
        Markup::new(content)
    }
}

/// CommonMark (plus tables and strikethrough) to HTML
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, content: &str) -> Markup {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let parser = Parser::new_ext(content, options);
        let mut out = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Markup::new(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{LineKind, flatten};

    #[test]
    fn test_html_passes_through() {
        let markup = HtmlRenderer.render("<h1>Hello World!</h1>");
        assert_eq!(markup.as_str(), "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_markdown_heading_and_emphasis() {
        let markup = MarkdownRenderer.render("# Title\n\nsome **bold** text");
        assert!(markup.as_str().contains("<h1>Title</h1>"));
        assert!(markup.as_str().contains("<strong>bold</strong>"));

        let lines = flatten(&markup);
        assert_eq!(lines[0].kind, LineKind::Heading(1));
        assert_eq!(lines[1].text, "some bold text");
    }

    #[test]
    fn test_markdown_plain_text_stays_readable() {
        let lines = flatten(&MarkdownRenderer.render("这是一个示例Markdown小组件"));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "这是一个示例Markdown小组件");
    }

    #[test]
    fn test_markdown_escapes_angle_brackets_in_text() {
        let lines = flatten(&MarkdownRenderer.render("a < b"));
        assert_eq!(lines[0].text, "a < b");
    }
}
