use std::path::Path as FsPath;

use anyhow::Context;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use super::SnapshotProvider;
use crate::tree::{Attrs, Element, Node, Text, Value};

/// Builds a target tree from Markdown source.
#[derive(Debug, Clone)]
pub struct MarkdownSnapshot {
    source: String,
}

impl MarkdownSnapshot {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn from_path(path: &FsPath) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(source))
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl SnapshotProvider for MarkdownSnapshot {
    fn snapshot(&self) -> anyhow::Result<Vec<Node>> {
        Ok(parse_markdown(&self.source))
    }
}

/// Parse Markdown into block nodes.
///
/// Inline formatting becomes marks on text leaves; adjacent leaves with
/// identical marks are merged.
pub fn parse_markdown(source: &str) -> Vec<Node> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;

    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(source, options) {
        builder.push(event);
    }
    builder.finish()
}

#[derive(Debug)]
struct Frame {
    kind: &'static str,
    attrs: Attrs,
    children: Vec<Node>,
}

impl Frame {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    fn into_node(mut self) -> Node {
        if self.kind == "list-item" {
            self.children = wrap_inline_runs(self.children);
        }
        if self.children.is_empty() {
            self.children.push(Node::text(""));
        }
        Node::Element(Element {
            kind: self.kind.to_string(),
            attrs: self.attrs,
            children: self.children,
        })
    }
}

#[derive(Debug, Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    root: Vec<Node>,
    marks: Vec<(&'static str, Value)>,
}

impl TreeBuilder {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Emphasis) => self.marks.push(("emphasis", true.into())),
            Event::Start(Tag::Strong) => self.marks.push(("strong", true.into())),
            Event::Start(Tag::Strikethrough) => self.marks.push(("strikethrough", true.into())),
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.marks.push(("link", dest_url.to_string().into()))
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.marks.push(("image", dest_url.to_string().into()))
            }
            Event::Start(tag) => self.stack.push(block_frame(tag)),
            Event::End(
                TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image,
            ) => {
                self.marks.pop();
            }
            Event::End(_) => {
                if let Some(frame) = self.stack.pop() {
                    self.attach(frame.into_node());
                }
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push_text(&text, None)
            }
            Event::Code(text) => self.push_text(&text, Some(("code", true.into()))),
            Event::InlineMath(text) | Event::DisplayMath(text) => {
                self.push_text(&text, Some(("math", true.into())))
            }
            Event::FootnoteReference(label) => {
                self.push_text(&label, Some(("footnote", true.into())))
            }
            Event::SoftBreak | Event::HardBreak => self.push_text("\n", None),
            Event::Rule => self.attach(Node::empty("thematic-break")),
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
    }

    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.root.push(node),
        }
    }

    fn push_text(&mut self, text: &str, extra: Option<(&'static str, Value)>) {
        let mut marks: Attrs = self
            .marks
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        if let Some((key, value)) = extra {
            marks.insert(key.to_string(), value);
        }

        let Some(frame) = self.stack.last_mut() else {
            // Stray inline content at the top level gets its own paragraph.
            self.root.push(Node::element(
                "paragraph",
                vec![Node::Text(Text {
                    marks,
                    text: text.to_string(),
                })],
            ));
            return;
        };

        if let Some(Node::Text(last)) = frame.children.last_mut()
            && last.marks == marks
        {
            last.text.push_str(text);
            return;
        }
        frame.children.push(Node::Text(Text {
            marks,
            text: text.to_string(),
        }));
    }

    fn mark_task(&mut self, checked: bool) {
        let Some(item) = self.stack.iter().rposition(|f| f.kind == "list-item") else {
            return;
        };
        self.stack[item].attrs.insert("checked".to_string(), checked.into());
        if let Some(list) = item.checked_sub(1).map(|i| &mut self.stack[i])
            && list.kind == "list"
        {
            list.attrs.insert("task".to_string(), true.into());
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some(frame) = self.stack.pop() {
            self.attach(frame.into_node());
        }
        self.root
    }
}

fn block_frame(tag: Tag<'_>) -> Frame {
    match tag {
        Tag::Paragraph => Frame::new("paragraph"),
        Tag::Heading { level, .. } => Frame::new("heading").attr("level", level as i64),
        Tag::BlockQuote(_) => Frame::new("blockquote"),
        Tag::CodeBlock(CodeBlockKind::Fenced(language)) if !language.is_empty() => {
            Frame::new("code").attr("language", language.to_string())
        }
        Tag::CodeBlock(_) => Frame::new("code"),
        Tag::HtmlBlock => Frame::new("html"),
        Tag::List(Some(start)) => Frame::new("list")
            .attr("ordered", true)
            .attr("start", i64::try_from(start).unwrap_or(i64::MAX)),
        Tag::List(None) => Frame::new("list").attr("ordered", false),
        Tag::Item => Frame::new("list-item"),
        Tag::FootnoteDefinition(label) => {
            Frame::new("footnote-definition").attr("label", label.to_string())
        }
        Tag::Table(_) => Frame::new("table"),
        Tag::TableHead => Frame::new("row").attr("header", true),
        Tag::TableRow => Frame::new("row"),
        Tag::TableCell => Frame::new("cell"),
        Tag::MetadataBlock(_) => Frame::new("frontmatter"),
        _ => Frame::new("block"),
    }
}

/// Tight list items hold inline text directly; group each run into a paragraph.
fn wrap_inline_runs(children: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        if child.is_text() {
            run.push(child);
            continue;
        }
        if !run.is_empty() {
            out.push(Node::element("paragraph", std::mem::take(&mut run)));
        }
        out.push(child);
    }
    if !run.is_empty() {
        out.push(Node::element("paragraph", run));
    }
    out
}
