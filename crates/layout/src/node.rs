//! The render tree: an immutable description of one page's content.
//!
//! Trees are built once per snapshot and never mutated in place. Transforms
//! such as image source rewriting produce a new tree ([`Node::map_images`]).

use fieldreport_types::{Color, Edges};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFit {
    /// Fill the box, cropping the overflow.
    #[default]
    Cover,
    /// Fit inside the box, letterboxing the remainder.
    Contain,
}

/// A column track of a [`Columns`] node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track {
    Fixed(f32),
    Flex(f32),
}

/// Box decoration shared by containers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxStyle {
    pub padding: Edges,
    pub background: Option<Color>,
    pub border: Option<Color>,
    pub dashed: bool,
    pub shadow: bool,
    pub min_height: f32,
}

impl BoxStyle {
    pub fn padded(padding: Edges) -> Self {
        Self { padding, ..Default::default() }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_border(mut self, color: Color) -> Self {
        self.border = Some(color);
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    pub fn with_min_height(mut self, min_height: f32) -> Self {
        self.min_height = min_height;
        self
    }

    pub fn is_decorated(&self) -> bool {
        self.background.is_some() || self.border.is_some() || self.shadow
    }
}

/// Vertical stack of children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stack {
    pub style: BoxStyle,
    pub gap: f32,
    /// Vertically center children when `min_height` exceeds their height.
    pub center: bool,
    pub children: Vec<Node>,
}

/// Horizontal row of children, one per track.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    pub style: BoxStyle,
    pub gap: f32,
    pub tracks: Vec<Track>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub content: String,
    pub size: f32,
    pub bold: bool,
    pub color: Color,
    pub align: Align,
    /// Extra spacing after every character, in px.
    pub tracking: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub src: String,
    pub alt: String,
    /// Fixed width; `None` fills the available width.
    pub width: Option<f32>,
    pub height: f32,
    pub fit: ImageFit,
    pub border: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Stack(Stack),
    Columns(Columns),
    Text(TextNode),
    Image(ImageNode),
    /// A one pixel horizontal rule.
    Rule(Color),
    Spacer(f32),
}

impl Node {
    pub fn stack(gap: f32, children: Vec<Node>) -> Node {
        Node::Stack(Stack { gap, children, ..Default::default() })
    }

    pub fn styled_stack(style: BoxStyle, gap: f32, children: Vec<Node>) -> Node {
        Node::Stack(Stack { style, gap, center: false, children })
    }

    pub fn columns(gap: f32, tracks: Vec<Track>, children: Vec<Node>) -> Node {
        debug_assert_eq!(tracks.len(), children.len());
        Node::Columns(Columns { style: BoxStyle::default(), gap, tracks, children })
    }

    /// `n` equal flexible columns.
    pub fn grid(gap: f32, children: Vec<Node>, n: usize) -> Node {
        let mut children = children;
        while children.len() < n {
            children.push(Node::Spacer(0.0));
        }
        let tracks = vec![Track::Flex(1.0); children.len()];
        Node::columns(gap, tracks, children)
    }

    pub fn text(content: impl Into<String>, size: f32, color: Color) -> Node {
        Node::Text(TextNode {
            content: content.into(),
            size,
            bold: false,
            color,
            align: Align::Left,
            tracking: 0.0,
        })
    }

    pub fn bold(content: impl Into<String>, size: f32, color: Color) -> Node {
        Node::Text(TextNode {
            content: content.into(),
            size,
            bold: true,
            color,
            align: Align::Left,
            tracking: 0.0,
        })
    }

    /// Uppercase, tracked-out caption text.
    pub fn caption(content: &str, size: f32, tracking_em: f32, color: Color) -> Node {
        Node::Text(TextNode {
            content: content.to_uppercase(),
            size,
            bold: true,
            color,
            align: Align::Left,
            tracking: size * tracking_em,
        })
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>, height: f32, fit: ImageFit) -> Node {
        Node::Image(ImageNode {
            src: src.into(),
            alt: alt.into(),
            width: None,
            height,
            fit,
            border: None,
        })
    }

    pub fn aligned(self, align: Align) -> Node {
        match self {
            Node::Text(mut t) => {
                t.align = align;
                Node::Text(t)
            }
            other => other,
        }
    }

    /// Returns a copy of the tree with every image source passed through `f`.
    pub fn map_images<F>(&self, f: &F) -> Node
    where
        F: Fn(&str) -> String,
    {
        match self {
            Node::Stack(s) => Node::Stack(Stack {
                style: s.style.clone(),
                gap: s.gap,
                center: s.center,
                children: s.children.iter().map(|c| c.map_images(f)).collect(),
            }),
            Node::Columns(c) => Node::Columns(Columns {
                style: c.style.clone(),
                gap: c.gap,
                tracks: c.tracks.clone(),
                children: c.children.iter().map(|c| c.map_images(f)).collect(),
            }),
            Node::Image(img) => Node::Image(ImageNode { src: f(&img.src), ..img.clone() }),
            other => other.clone(),
        }
    }

    /// Image sources in document order, including empty ones.
    pub fn image_sources(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_sources(&mut out);
        out
    }

    fn collect_sources<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Stack(s) => s.children.iter().for_each(|c| c.collect_sources(out)),
            Node::Columns(c) => c.children.iter().for_each(|c| c.collect_sources(out)),
            Node::Image(img) => out.push(&img.src),
            _ => {}
        }
    }
}
