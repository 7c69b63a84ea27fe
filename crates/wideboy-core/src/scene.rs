//! Composition model: an arena of visual nodes addressed by [`NodeId`].
//!
//! Every node carries a [`Geometry`] relative to its parent and one of three
//! kinds: a container owning an ordered child list (paint order, back to
//! front), a rounded background shape, or a text label. A child belongs to
//! exactly one parent for its whole lifetime; nodes are never freed.
//!
//! Child geometry is expected to fit inside the parent. Nothing clips, so
//! overflow draws outside the parent's bounds.

use alloc::vec::Vec;
use core::fmt;

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyleBuilder, Rectangle, RoundedRectangle, StrokeAlignment},
    text::{Baseline, Text},
};
use heapless::String;

/// Longest label text a node can hold, in bytes.
pub const LABEL_TEXT_BYTES: usize = 16;
const MAX_NODES: usize = u16::MAX as usize;

/// Default label font; 6 px glyphs fit five characters in a 32 px tile.
pub const DEFAULT_FONT: &MonoFont<'static> = &FONT_6X10;

/// Builds a color from a `0xRRGGBB` literal.
pub const fn rgb(hex: u32) -> Rgb888 {
    Rgb888::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u16);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position relative to the parent plus size, in pixels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Rounded rectangle fill with an optional one-pixel outline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RoundRect {
    pub fill: Rgb888,
    pub outline: Option<Rgb888>,
    pub radius: u32,
}

#[derive(Clone)]
pub struct TextContent {
    text: String<LABEL_TEXT_BYTES>,
    color: Rgb888,
    font: &'static MonoFont<'static>,
}

impl TextContent {
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn color(&self) -> Rgb888 {
        self.color
    }
}

impl fmt::Debug for TextContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextContent")
            .field("text", &self.text)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Container { children: Vec<NodeId> },
    ShapedBackground(RoundRect),
    TextContent(TextContent),
}

#[derive(Clone, Debug)]
pub struct Node {
    geometry: Geometry,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SceneError {
    /// Id does not name a node in this scene.
    UnknownNode(NodeId),
    /// Node cannot hold children.
    NotContainer(NodeId),
    /// Node is not a text label.
    NotText(NodeId),
    /// Child already belongs to a parent.
    AlreadyParented(NodeId),
    /// Appending would make a node its own ancestor.
    Cycle(NodeId),
    /// Text does not fit the label buffer.
    TextOverflow { len: usize },
    /// Arena is out of ids.
    SceneFull,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {}", id.0),
            Self::NotContainer(id) => write!(f, "node {} is not a container", id.0),
            Self::NotText(id) => write!(f, "node {} is not a text label", id.0),
            Self::AlreadyParented(id) => write!(f, "node {} already has a parent", id.0),
            Self::Cycle(id) => write!(f, "appending node {} would create a cycle", id.0),
            Self::TextOverflow { len } => {
                write!(f, "text of {len} bytes exceeds {LABEL_TEXT_BYTES}")
            }
            Self::SceneFull => f.write_str("scene is out of node ids"),
        }
    }
}

/// Arena owning every node of every composition shown on the surface.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_container(&mut self, geometry: Geometry) -> Result<NodeId, SceneError> {
        self.insert(geometry, NodeKind::Container {
            children: Vec::new(),
        })
    }

    pub fn add_background(
        &mut self,
        geometry: Geometry,
        shape: RoundRect,
    ) -> Result<NodeId, SceneError> {
        self.insert(geometry, NodeKind::ShapedBackground(shape))
    }

    /// Adds a label in the default font. `anchor` is the left edge at the
    /// vertical middle of the glyphs.
    pub fn add_text(
        &mut self,
        anchor: Point,
        text: &str,
        color: Rgb888,
    ) -> Result<NodeId, SceneError> {
        self.add_text_with_font(anchor, text, color, DEFAULT_FONT)
    }

    pub fn add_text_with_font(
        &mut self,
        anchor: Point,
        text: &str,
        color: Rgb888,
        font: &'static MonoFont<'static>,
    ) -> Result<NodeId, SceneError> {
        let text = label_text(text)?;
        let size = text_size(font, &text);
        let geometry = Geometry::new(anchor.x, anchor.y, size.width, size.height);
        self.insert(
            geometry,
            NodeKind::TextContent(TextContent { text, color, font }),
        )
    }

    /// Makes `child` the last (front-most) child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let child_node = self.get(child)?;
        if child_node.parent.is_some() {
            return Err(SceneError::AlreadyParented(child));
        }
        if !matches!(self.get(parent)?.kind, NodeKind::Container { .. }) {
            return Err(SceneError::NotContainer(parent));
        }

        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(SceneError::Cycle(child));
            }
            cursor = self.nodes[ancestor.index()].parent;
        }

        if let NodeKind::Container { children } = &mut self.nodes[parent.index()].kind {
            children.push(child);
        }
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Children in paint order; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Container { children }) => children,
            _ => &[],
        }
    }

    pub fn geometry(&self, id: NodeId) -> Option<Geometry> {
        self.node(id).map(Node::geometry)
    }

    pub fn set_geometry(&mut self, id: NodeId, geometry: Geometry) -> Result<(), SceneError> {
        self.get_mut(id)?.geometry = geometry;
        Ok(())
    }

    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), SceneError> {
        let node = self.get_mut(id)?;
        node.geometry.x = position.x;
        node.geometry.y = position.y;
        Ok(())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::TextContent(content)) => Some(content.as_str()),
            _ => None,
        }
    }

    /// Replaces a label's text. The label keeps its anchor; its size follows
    /// the new text.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), SceneError> {
        let node = self.get_mut(id)?;
        let NodeKind::TextContent(content) = &mut node.kind else {
            return Err(SceneError::NotText(id));
        };
        if content.text.as_str() == text {
            return Ok(());
        }

        content.text = label_text(text)?;
        let size = text_size(content.font, &content.text);
        node.geometry.width = size.width;
        node.geometry.height = size.height;
        Ok(())
    }

    /// Paints the subtree rooted at `root` onto `target`.
    pub fn draw<D>(&self, root: NodeId, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.draw_node(root, Point::zero(), target)
    }

    fn draw_node<D>(&self, id: NodeId, offset: Point, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        let origin = offset + node.geometry.origin();

        match &node.kind {
            NodeKind::Container { children } => {
                for child in children {
                    self.draw_node(*child, origin, target)?;
                }
            }
            NodeKind::ShapedBackground(shape) => {
                if node.geometry.width == 0 || node.geometry.height == 0 {
                    return Ok(());
                }
                let mut style = PrimitiveStyleBuilder::new().fill_color(shape.fill);
                if let Some(outline) = shape.outline {
                    style = style
                        .stroke_color(outline)
                        .stroke_width(1)
                        .stroke_alignment(StrokeAlignment::Inside);
                }
                let bounds = Rectangle::new(
                    origin,
                    Size::new(node.geometry.width, node.geometry.height),
                );
                RoundedRectangle::with_equal_corners(
                    bounds,
                    Size::new(shape.radius, shape.radius),
                )
                .into_styled(style.build())
                .draw(target)?;
            }
            NodeKind::TextContent(content) => {
                let style = MonoTextStyle::new(content.font, content.color);
                Text::with_baseline(content.as_str(), origin, style, Baseline::Middle)
                    .draw(target)?;
            }
        }

        Ok(())
    }

    fn insert(&mut self, geometry: Geometry, kind: NodeKind) -> Result<NodeId, SceneError> {
        if self.nodes.len() >= MAX_NODES {
            return Err(SceneError::SceneFull);
        }
        let id = NodeId(self.nodes.len() as u16);
        self.nodes.push(Node {
            geometry,
            parent: None,
            kind,
        });
        Ok(id)
    }

    fn get(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id.index()).ok_or(SceneError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(SceneError::UnknownNode(id))
    }
}

fn label_text(text: &str) -> Result<String<LABEL_TEXT_BYTES>, SceneError> {
    let mut out = String::new();
    out.push_str(text)
        .map_err(|_| SceneError::TextOverflow { len: text.len() })?;
    Ok(out)
}

fn text_size(font: &MonoFont<'_>, text: &str) -> Size {
    let glyphs = text.chars().count() as u32;
    if glyphs == 0 {
        return Size::new(0, font.character_size.height);
    }
    let width = glyphs * font.character_size.width + (glyphs - 1) * font.character_spacing;
    Size::new(width, font.character_size.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_panel::{FrameBuffer, PanelConfig};

    fn panel(width: u16, height: u16) -> FrameBuffer {
        FrameBuffer::new(PanelConfig {
            width,
            height,
            brightness: 1.0,
            ..PanelConfig::default()
        })
        .unwrap()
    }

    fn rgb_bytes(color: Rgb888) -> [u8; 3] {
        [color.r(), color.g(), color.b()]
    }

    #[test]
    fn rgb_splits_hex_literal() {
        assert_eq!(rgb(0x110022), Rgb888::new(0x11, 0x00, 0x22));
    }

    #[test]
    fn append_keeps_paint_order() {
        let mut scene = Scene::new();
        let root = scene.add_container(Geometry::default()).unwrap();
        let a = scene.add_container(Geometry::default()).unwrap();
        let b = scene.add_text(Point::zero(), "b", rgb(0xFFFFFF)).unwrap();

        scene.append(root, a).unwrap();
        scene.append(root, b).unwrap();

        assert_eq!(scene.children(root), &[a, b]);
        assert_eq!(scene.parent(b), Some(root));
    }

    #[test]
    fn child_cannot_have_two_parents() {
        let mut scene = Scene::new();
        let first = scene.add_container(Geometry::default()).unwrap();
        let second = scene.add_container(Geometry::default()).unwrap();
        let child = scene.add_text(Point::zero(), "x", rgb(0)).unwrap();

        scene.append(first, child).unwrap();
        assert_eq!(
            scene.append(second, child),
            Err(SceneError::AlreadyParented(child))
        );
        assert!(scene.children(second).is_empty());
    }

    #[test]
    fn appending_an_ancestor_is_a_cycle() {
        let mut scene = Scene::new();
        let top = scene.add_container(Geometry::default()).unwrap();
        let inner = scene.add_container(Geometry::default()).unwrap();
        scene.append(top, inner).unwrap();

        assert_eq!(scene.append(inner, top), Err(SceneError::Cycle(top)));
        assert_eq!(scene.append(top, top), Err(SceneError::Cycle(top)));
    }

    #[test]
    fn leaves_cannot_hold_children() {
        let mut scene = Scene::new();
        let label = scene.add_text(Point::zero(), "x", rgb(0)).unwrap();
        let other = scene.add_text(Point::zero(), "y", rgb(0)).unwrap();

        assert_eq!(
            scene.append(label, other),
            Err(SceneError::NotContainer(label))
        );
    }

    #[test]
    fn set_text_resizes_label_and_rejects_overflow() {
        let mut scene = Scene::new();
        let label = scene.add_text(Point::new(2, 6), "0", rgb(0)).unwrap();
        assert_eq!(scene.geometry(label).unwrap().width, 6);

        scene.set_text(label, "150").unwrap();
        assert_eq!(scene.text(label), Some("150"));
        assert_eq!(scene.geometry(label).unwrap(), Geometry::new(2, 6, 18, 10));

        let long = "0123456789abcdefg";
        assert_eq!(
            scene.set_text(label, long),
            Err(SceneError::TextOverflow { len: long.len() })
        );
        assert_eq!(scene.text(label), Some("150"));
    }

    #[test]
    fn set_text_on_non_label_fails() {
        let mut scene = Scene::new();
        let group = scene.add_container(Geometry::default()).unwrap();

        assert_eq!(scene.set_text(group, "1"), Err(SceneError::NotText(group)));
        assert_eq!(
            scene.set_text(NodeId(99), "1"),
            Err(SceneError::UnknownNode(NodeId(99)))
        );
    }

    #[test]
    fn draw_offsets_children_by_parent_origin() {
        let mut scene = Scene::new();
        let root = scene.add_container(Geometry::new(0, 0, 16, 16)).unwrap();
        let group = scene.add_container(Geometry::new(8, 8, 8, 8)).unwrap();
        let fill = rgb(0x00FF00);
        let bg = scene
            .add_background(Geometry::new(0, 0, 8, 8), RoundRect {
                fill,
                outline: None,
                radius: 2,
            })
            .unwrap();
        scene.append(root, group).unwrap();
        scene.append(group, bg).unwrap();

        let mut fb = panel(16, 16);
        scene.draw(root, &mut fb).unwrap();

        assert_eq!(fb.pixel(12, 12), Some(rgb_bytes(fill)));
        assert_eq!(fb.pixel(4, 4), Some([0, 0, 0]));
    }

    #[test]
    fn outline_is_drawn_inside_the_shape() {
        let mut scene = Scene::new();
        let fill = rgb(0x000011);
        let outline = rgb(0xFF0000);
        let bg = scene
            .add_background(Geometry::new(0, 0, 10, 10), RoundRect {
                fill,
                outline: Some(outline),
                radius: 2,
            })
            .unwrap();

        let mut fb = panel(12, 12);
        scene.draw(bg, &mut fb).unwrap();

        assert_eq!(fb.pixel(0, 5), Some(rgb_bytes(outline)));
        assert_eq!(fb.pixel(5, 5), Some(rgb_bytes(fill)));
        assert_eq!(fb.pixel(10, 5), Some([0, 0, 0]));
    }

    #[test]
    fn zero_sized_background_paints_nothing() {
        let mut scene = Scene::new();
        let bg = scene
            .add_background(Geometry::default(), RoundRect {
                fill: rgb(0xFFFFFF),
                outline: None,
                radius: 0,
            })
            .unwrap();

        let mut fb = panel(4, 4);
        scene.draw(bg, &mut fb).unwrap();
        assert_eq!(fb.pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn label_pixels_use_label_color() {
        let mut scene = Scene::new();
        let color = rgb(0x222222);
        let label = scene.add_text(Point::new(2, 6), "WB Jr", color).unwrap();

        let mut fb = panel(32, 16);
        scene.draw(label, &mut fb).unwrap();

        let lit = (0..32)
            .flat_map(|x| (0..16).map(move |y| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) == Some(rgb_bytes(color)))
            .count();
        assert!(lit > 0);
    }
}
