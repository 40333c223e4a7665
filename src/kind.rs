//! Widget kinds: where their files live and how their content renders

use std::path::PathBuf;
use std::rc::Rc;

use crate::config::DataDir;
use crate::constants::widget;
use crate::render::{HtmlRenderer, MarkdownRenderer, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WidgetKind {
    Html,
    #[value(name = "md")]
    Markdown,
}

impl WidgetKind {
    pub fn directory(self, data: &DataDir) -> PathBuf {
        match self {
            WidgetKind::Html => data.html_widgets(),
            WidgetKind::Markdown => data.markdown_widgets(),
        }
    }

    /// Placeholder written on first run
    pub fn seed_content(self) -> &'static str {
        match self {
            WidgetKind::Html => widget::HTML_SEED_CONTENT,
            WidgetKind::Markdown => widget::MARKDOWN_SEED_CONTENT,
        }
    }

    /// Content of a widget created from the context menu
    pub fn new_content(self) -> &'static str {
        match self {
            WidgetKind::Html => widget::HTML_NEW_CONTENT,
            WidgetKind::Markdown => widget::MARKDOWN_NEW_CONTENT,
        }
    }

    pub fn renderer(self) -> Rc<dyn Renderer> {
        match self {
            WidgetKind::Html => Rc::new(HtmlRenderer),
            WidgetKind::Markdown => Rc::new(MarkdownRenderer),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WidgetKind::Html => "HTML",
            WidgetKind::Markdown => "Markdown",
        }
    }

    /// Value passed to `--kind` when spawning the editor
    pub fn cli_name(self) -> &'static str {
        match self {
            WidgetKind::Html => "html",
            WidgetKind::Markdown => "md",
        }
    }
}
