//! Display markup and its flattening into drawable text lines
//!
//! Renderers produce HTML-flavoured markup. Drawing only needs a list of
//! lines with a coarse weight (heading level or body), so the flattener
//! understands block structure and entities and drops everything else.
//! Input it cannot make sense of comes out as literal text.

/// Renderer output handed to a window
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup(String);

impl Markup {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Body,
    Heading(u8),
}

impl LineKind {
    /// Font scale relative to body text
    pub fn scale(self) -> f32 {
        match self {
            LineKind::Body => 1.0,
            LineKind::Heading(1) => 2.0,
            LineKind::Heading(2) => 1.5,
            LineKind::Heading(3) => 1.17,
            LineKind::Heading(_) => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub kind: LineKind,
}

/// Whether the text contains anything that parses as a tag
pub fn looks_like_markup(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.windows(2).any(|pair| {
        pair[0] == b'<' && (pair[1].is_ascii_alphabetic() || pair[1] == b'/' || pair[1] == b'!')
    }) && text.contains('>')
}

/// Flatten markup into display lines
pub fn flatten(markup: &Markup) -> Vec<TextLine> {
    let source = markup.as_str();
    if !looks_like_markup(source) {
        return source
            .lines()
            .map(|line| TextLine { text: line.to_string(), kind: LineKind::Body })
            .collect();
    }

    let mut flattener = Flattener::default();
    let mut rest = source;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' => match rest.find('>') {
                Some(end) => {
                    flattener.tag(&rest[1..end]);
                    rest = &rest[end + 1..];
                }
                None => {
                    // Unterminated tag, keep it as text
                    flattener.text(rest);
                    rest = "";
                }
            },
            '&' => {
                let (decoded, consumed) = decode_entity(rest);
                flattener.push_char(decoded);
                rest = &rest[consumed..];
            }
            _ => {
                flattener.push_char(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    flattener.finish()
}

#[derive(Default)]
struct Flattener {
    lines: Vec<TextLine>,
    current: String,
    heading: Option<u8>,
    in_pre: bool,
}

impl Flattener {
    fn tag(&mut self, inner: &str) {
        let inner = inner.trim();
        if inner.starts_with('!') || inner.starts_with('?') {
            return;
        }
        let closing = inner.starts_with('/');
        let name: String = inner
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.break_line();
                self.heading = if closing {
                    None
                } else {
                    name[1..].parse().ok()
                };
            }
            "br" => self.break_line(),
            "li" => {
                self.break_line();
                if !closing {
                    self.current.push_str("• ");
                }
            }
            "pre" => {
                self.break_line();
                self.in_pre = !closing;
            }
            "p" | "div" | "ul" | "ol" | "tr" | "table" | "blockquote" | "hr" | "section" => {
                self.break_line();
            }
            "td" | "th" if !closing => {
                if !self.current.is_empty() {
                    self.current.push_str("  ");
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        for ch in text.chars() {
            self.push_char(ch);
        }
    }

    fn push_char(&mut self, ch: char) {
        if self.in_pre {
            if ch == '\n' {
                self.break_line_keep_empty();
            } else {
                self.current.push(ch);
            }
            return;
        }
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !self.current.is_empty() && !self.current.ends_with(' ') {
                self.current.push(' ');
            }
        } else {
            self.current.push(ch);
        }
    }

    fn kind(&self) -> LineKind {
        self.heading.map(LineKind::Heading).unwrap_or(LineKind::Body)
    }

    fn break_line(&mut self) {
        let text = self.current.trim().to_string();
        if !text.is_empty() {
            let kind = self.kind();
            self.lines.push(TextLine { text, kind });
        }
        self.current.clear();
    }

    fn break_line_keep_empty(&mut self) {
        let text = std::mem::take(&mut self.current);
        let kind = self.kind();
        self.lines.push(TextLine { text, kind });
    }

    fn finish(mut self) -> Vec<TextLine> {
        self.break_line();
        self.lines
    }
}

/// Decode an entity at the start of `text`; returns the char and bytes consumed
fn decode_entity(text: &str) -> (char, usize) {
    let Some(end) = text.find(';').filter(|&end| end <= 10) else {
        return ('&', 1);
    };
    let name = &text[1..end];
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };
    match decoded {
        Some(ch) => (ch, end + 1),
        None => ('&', 1),
    }
}

/// Greedy word wrap; words wider than `max_width` break between characters
pub fn wrap(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut last_space: Option<usize> = None;

    for ch in text.chars() {
        if ch == ' ' {
            last_space = Some(current.len());
        }
        current.push(ch);

        if current.chars().count() > 1 && measure(&current) > max_width {
            match last_space {
                Some(idx) => {
                    let rest = current[idx + 1..].to_string();
                    current.truncate(idx);
                    lines.push(current.trim_end().to_string());
                    current = rest;
                }
                None => {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
            last_space = None;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Flatten and wrap in one go
pub fn layout(markup: &Markup, max_width: f32, measure: impl Fn(&str, f32) -> f32) -> Vec<TextLine> {
    flatten(markup)
        .into_iter()
        .flat_map(|line| {
            let scale = line.kind.scale();
            wrap(&line.text, max_width, |s| measure(s, scale))
                .into_iter()
                .map(move |text| TextLine { text, kind: line.kind })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[TextLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_plain_text_keeps_newlines() {
        let lines = flatten(&Markup::new("first\nsecond  line\n3 < 4"));
        assert_eq!(texts(&lines), vec!["first", "second  line", "3 < 4"]);
    }

    #[test]
    fn test_heading_and_paragraphs() {
        let lines = flatten(&Markup::new("<h1>Title</h1><p>Body   text\n here</p><p>two</p>"));
        assert_eq!(texts(&lines), vec!["Title", "Body text here", "two"]);
        assert_eq!(lines[0].kind, LineKind::Heading(1));
        assert_eq!(lines[1].kind, LineKind::Body);
    }

    #[test]
    fn test_list_items_and_breaks() {
        let lines = flatten(&Markup::new("<ul><li>one</li><li>two</li></ul>a<br/>b"));
        assert_eq!(texts(&lines), vec!["• one", "• two", "a", "b"]);
    }

    #[test]
    fn test_entities() {
        let lines = flatten(&Markup::new("<p>a &amp; b &lt;c&gt; &#20320;&#x597D; &bogus; & x</p>"));
        assert_eq!(texts(&lines), vec!["a & b <c> 你好 &bogus; & x"]);
    }

    #[test]
    fn test_unterminated_tag_degrades_to_literal() {
        let lines = flatten(&Markup::new("<b>bold</b> and <broken"));
        assert_eq!(texts(&lines), vec!["bold and <broken"]);
    }

    #[test]
    fn test_pre_preserves_lines() {
        let lines = flatten(&Markup::new("<pre>a  b\nc</pre>"));
        assert_eq!(texts(&lines), vec!["a  b", "c"]);
    }

    #[test]
    fn test_wrap_prefers_spaces() {
        let measure = |s: &str| s.chars().count() as f32;
        assert_eq!(wrap("aaa bbb ccc", 7.0, measure), vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_breaks_long_words_between_chars() {
        let measure = |s: &str| s.chars().count() as f32;
        assert_eq!(wrap("一二三四五六七", 3.0, measure), vec!["一二三", "四五六", "七"]);
    }

    #[test]
    fn test_wrap_empty_text_yields_one_empty_line() {
        assert_eq!(wrap("", 10.0, |s: &str| s.len() as f32), vec![String::new()]);
    }

    #[test]
    fn test_layout_scales_headings() {
        let measure = |s: &str, scale: f32| s.chars().count() as f32 * scale;
        let lines = layout(&Markup::new("<h1>abcd</h1><p>abcd</p>"), 4.0, measure);
        // heading is twice as wide so it wraps
        assert_eq!(texts(&lines), vec!["ab", "cd", "abcd"]);
    }
}
