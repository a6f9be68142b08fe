//! Frame to SVG document.
//!
//! Shapes are drawn at their starting geometry; every directive with a duration becomes a SMIL
//! child of the element it animates. Instant recolors and relabels need no markup because the
//! drawn shapes already carry the final style.

use crate::SvgRenderOptions;
use crate::util::{escape_xml_into, fmt, fmt_into};
use algviz_core::geom::{Point, Vector};
use algviz_core::{
    Directive, EdgeShape, Element, Frame, MotionPath, NodeShape, Rgb, Shape, ShapeKind,
    TimeWindow,
};
use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

const TITLE_HEIGHT: f64 = 24.0;
const TITLE_FONT_SIZE: f64 = 16.0;
const TITLE_CHAR_WIDTH: f64 = 8.0;
const LEGEND_MARGIN: f64 = 4.0;
const LEGEND_BOX_WIDTH: f64 = 40.0;
const LEGEND_BOX_HEIGHT: f64 = 20.0;
const MAX_FONT_SIZE: f64 = 16.0;

#[derive(Debug, Clone, Copy)]
enum Fade {
    In(TimeWindow),
    Out(TimeWindow),
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    delta: Vector,
    path: MotionPath,
    window: TimeWindow,
}

struct Redraw<'a> {
    to: &'a [Point],
    window: TimeWindow,
}

struct Drawable<'a> {
    element: Element,
    shape: &'a Shape,
    fade: Option<Fade>,
}

/// Largest font that fits `text` inside a box `width` wide.
pub(crate) fn fit_font_size(text: &str, width: f64) -> f64 {
    let chars = UnicodeWidthStr::width(text).max(1) as f64;
    (width * 1.5 / chars).min(MAX_FONT_SIZE)
}

fn element_id(element: Element) -> String {
    match element {
        Element::Node(id) => format!("n{}", id.get()),
        Element::Edge(key) => format!("e{}-{}", key.source.get(), key.target.get()),
    }
}

fn marker_id(stroke: Rgb) -> String {
    format!("arrow-{}", &stroke.to_hex()[1..])
}

fn header_height(frame: &Frame) -> f64 {
    if frame.title.is_some() || !frame.legend.is_empty() {
        TITLE_HEIGHT
    } else {
        0.0
    }
}

fn legend_offset(frame: &Frame) -> f64 {
    let name = frame.title.as_deref().unwrap_or_default();
    UnicodeWidthStr::width(name) as f64 * TITLE_CHAR_WIDTH + LEGEND_MARGIN * 2.0
}

fn legend_width(frame: &Frame) -> f64 {
    if header_height(frame) == 0.0 {
        return 0.0;
    }
    legend_offset(frame) + frame.legend.len() as f64 * (LEGEND_BOX_WIDTH + LEGEND_MARGIN)
}

fn write_window(out: &mut String, window: TimeWindow) {
    out.push_str(r#" begin=""#);
    fmt_into(out, window.begin);
    out.push_str(r#"s" dur=""#);
    fmt_into(out, window.duration);
    out.push_str(r#"s" fill="freeze""#);
}

fn write_fade(out: &mut String, fade: Fade) {
    let (from, to, window) = match fade {
        Fade::In(window) => (0, 1, window),
        Fade::Out(window) => (1, 0, window),
    };
    let _ = write!(
        out,
        r#"<animate attributeName="opacity" from="{from}" to="{to}""#
    );
    write_window(out, window);
    out.push_str("/>");
}

fn write_motion(out: &mut String, motion: Motion) {
    let (dx, dy) = (motion.delta.x, motion.delta.y);
    out.push_str(r#"<animateMotion path="m0,0 "#);
    match motion.path {
        MotionPath::Straight => {
            let _ = write!(out, "l{},{}", fmt(dx), fmt(dy));
        }
        MotionPath::Curved => {
            let _ = write!(
                out,
                "q{},{} {},{}",
                fmt(dx * 0.5 - dy * 0.2),
                fmt(dy * 0.5 + dx * 0.2),
                fmt(dx),
                fmt(dy)
            );
        }
    }
    out.push('"');
    write_window(out, motion.window);
    out.push_str("/>");
}

fn write_points(out: &mut String, points: &[Point]) {
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        fmt_into(out, p.x);
        out.push(',');
        fmt_into(out, p.y);
    }
}

fn write_text(out: &mut String, x: f64, y: f64, font_size: f64, fill: Rgb, text: &str) {
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-size="{}" fill="{}">"#,
        fmt(x),
        fmt(y),
        fmt(font_size),
        fill.to_hex()
    );
    escape_xml_into(out, text);
    out.push_str("</text>");
}

/// Midpoint of the middle segment, where edge labels sit.
fn label_anchor(path: &[Point]) -> Option<Point> {
    match path.len() {
        0 => None,
        1 => Some(path[0]),
        n => {
            let i = n / 2 - 1;
            Some(path[i].lerp(path[i + 1], 0.5))
        }
    }
}

fn write_node(
    out: &mut String,
    element: Element,
    shape: &NodeShape,
    fade: Option<Fade>,
    motion: Option<Motion>,
    options: &SvgRenderOptions,
) {
    let _ = write!(out, r#"<g id="{}""#, element_id(element));
    if matches!(fade, Some(Fade::In(_))) {
        out.push_str(r#" opacity="0""#);
    }
    out.push('>');

    let (cx, cy) = (shape.center.x, shape.center.y);
    let stroke = options.node_stroke.to_hex();
    let fill = shape.fill.to_hex();
    match shape.kind {
        ShapeKind::Circle => {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{fill}" stroke="{stroke}"/>"#,
                fmt(cx),
                fmt(cy),
                fmt(shape.width.min(shape.height) / 2.0)
            );
        }
        ShapeKind::RoundedRect | ShapeKind::Rect => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                fmt(cx - shape.width / 2.0),
                fmt(cy - shape.height / 2.0),
                fmt(shape.width),
                fmt(shape.height)
            );
            if shape.kind == ShapeKind::RoundedRect {
                let _ = write!(
                    out,
                    r#" rx="{}" ry="{}""#,
                    fmt(shape.width * 0.1),
                    fmt(shape.height * 0.1)
                );
            }
            let _ = write!(out, r#" fill="{fill}" stroke="{stroke}"/>"#);
        }
    }
    if !shape.label.is_empty() {
        write_text(
            out,
            cx,
            cy,
            fit_font_size(&shape.label, shape.width),
            shape.fill.contrast_text(),
            &shape.label,
        );
    }

    if let Some(fade) = fade {
        write_fade(out, fade);
    }
    if let Some(motion) = motion {
        write_motion(out, motion);
    }
    out.push_str("</g>");
}

fn write_edge(
    out: &mut String,
    element: Element,
    shape: &EdgeShape,
    fade: Option<Fade>,
    redraw: Option<&Redraw<'_>>,
    options: &SvgRenderOptions,
) {
    let _ = write!(out, r#"<g id="{}""#, element_id(element));
    if matches!(fade, Some(Fade::In(_))) {
        out.push_str(r#" opacity="0""#);
    }
    out.push('>');

    out.push_str(r#"<polyline points=""#);
    write_points(out, &shape.path);
    let _ = write!(
        out,
        r#"" fill="none" stroke="{}" stroke-width="{}""#,
        shape.stroke.to_hex(),
        fmt(options.edge_width)
    );
    if shape.directed {
        let _ = write!(out, r#" marker-end="url(#{})""#, marker_id(shape.stroke));
    }
    match redraw {
        Some(redraw) => {
            out.push_str(r#"><animate attributeName="points" from=""#);
            write_points(out, &shape.path);
            out.push_str(r#"" to=""#);
            write_points(out, redraw.to);
            out.push('"');
            write_window(out, redraw.window);
            out.push_str("/></polyline>");
        }
        None => out.push_str("/>"),
    }

    if let (Some(label), Some(anchor)) = (shape.label.as_deref(), label_anchor(&shape.path)) {
        let _ = write!(
            out,
            r#"<g><text x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{}">"#,
            fmt(anchor.x),
            fmt(anchor.y),
            fmt(options.edge_label_font_size),
            options.node_stroke.to_hex()
        );
        escape_xml_into(out, label);
        out.push_str("</text>");
        if let Some((redraw, target)) =
            redraw.and_then(|r| label_anchor(r.to).map(|target| (r, target)))
        {
            write_motion(
                out,
                Motion {
                    delta: target - anchor,
                    path: MotionPath::Straight,
                    window: redraw.window,
                },
            );
        }
        out.push_str("</g>");
    }

    if let Some(fade) = fade {
        write_fade(out, fade);
    }
    out.push_str("</g>");
}

fn write_legend(out: &mut String, frame: &Frame, options: &SvgRenderOptions) {
    out.push_str(r#"<g class="legend">"#);
    if let Some(title) = frame.title.as_deref() {
        let _ = write!(
            out,
            r#"<text x="{}" y="16" font-size="{}" fill="{}">"#,
            fmt(LEGEND_MARGIN),
            fmt(TITLE_FONT_SIZE),
            Rgb::BLACK.to_hex()
        );
        escape_xml_into(out, title);
        out.push_str(":</text>");
    }

    let offset = legend_offset(frame);
    for (i, entry) in frame.legend.iter().enumerate() {
        let x = offset + i as f64 * (LEGEND_BOX_WIDTH + LEGEND_MARGIN);
        let _ = write!(
            out,
            r#"<rect x="{}" y="2" width="{}" height="{}" rx="{}" ry="{}" fill="{}" stroke="{}"/>"#,
            fmt(x),
            fmt(LEGEND_BOX_WIDTH),
            fmt(LEGEND_BOX_HEIGHT),
            fmt(LEGEND_BOX_WIDTH * 0.1),
            fmt(LEGEND_BOX_HEIGHT * 0.1),
            entry.color.to_hex(),
            options.node_stroke.to_hex()
        );
        write_text(
            out,
            x + LEGEND_BOX_WIDTH / 2.0,
            2.0 + LEGEND_BOX_HEIGHT / 2.0,
            fit_font_size(&entry.name, LEGEND_BOX_WIDTH),
            entry.color.contrast_text(),
            &entry.name,
        );
    }
    out.push_str("</g>");
}

fn write_markers(out: &mut String, strokes: &BTreeSet<Rgb>, options: &SvgRenderOptions) {
    if strokes.is_empty() {
        return;
    }
    out.push_str("<defs>");
    for stroke in strokes {
        let _ = write!(
            out,
            r#"<marker id="{}" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="{size}" markerHeight="{size}" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10 z" fill="{}"/></marker>"#,
            marker_id(*stroke),
            stroke.to_hex(),
            size = fmt(options.arrow_size),
        );
    }
    out.push_str("</defs>");
}

/// Renders one frame as a standalone SVG document.
pub fn render_frame_svg(frame: &Frame, options: &SvgRenderOptions) -> String {
    let mut drawables: Vec<Drawable<'_>> = frame
        .resting
        .iter()
        .map(|(element, shape)| Drawable {
            element: *element,
            shape,
            fade: None,
        })
        .collect();
    let mut motions: HashMap<Element, Motion> = HashMap::default();
    let mut redraws: HashMap<Element, Redraw<'_>> = HashMap::default();
    for directive in &frame.directives {
        match directive {
            Directive::FadeIn {
                target,
                shape,
                window,
            } => drawables.push(Drawable {
                element: *target,
                shape,
                fade: Some(Fade::In(*window)),
            }),
            Directive::FadeOut {
                target,
                shape,
                window,
            } => drawables.push(Drawable {
                element: *target,
                shape,
                fade: Some(Fade::Out(*window)),
            }),
            Directive::Translate {
                node,
                delta,
                motion,
                window,
            } => {
                motions.insert(
                    Element::Node(*node),
                    Motion {
                        delta: *delta,
                        path: *motion,
                        window: *window,
                    },
                );
            }
            Directive::Redraw {
                edge, to, window, ..
            } => {
                redraws.insert(
                    Element::Edge(*edge),
                    Redraw {
                        to,
                        window: *window,
                    },
                );
            }
            Directive::Recolor { .. } | Directive::Relabel { .. } => {}
        }
    }

    let strokes: BTreeSet<Rgb> = drawables
        .iter()
        .filter_map(|d| match d.shape {
            Shape::Edge(edge) if edge.directed => Some(edge.stroke),
            _ => None,
        })
        .collect();

    let header = header_height(frame);
    let area = frame.canvas.animated;
    let width = area.width().max(legend_width(frame));
    let height = area.height() + header;

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{}">"#,
        options.font_family,
        w = fmt(width),
        h = fmt(height),
    );
    write_markers(&mut out, &strokes, options);
    if header > 0.0 {
        write_legend(&mut out, frame, options);
    }

    let _ = write!(
        out,
        r#"<g transform="translate({},{})">"#,
        fmt(-area.min.x),
        fmt(header - area.min.y)
    );
    for d in &drawables {
        if let Shape::Edge(edge) = d.shape {
            write_edge(
                &mut out,
                d.element,
                edge,
                d.fade,
                redraws.get(&d.element),
                options,
            );
        }
    }
    for d in &drawables {
        if let Shape::Node(node) = d.shape {
            write_node(
                &mut out,
                d.element,
                node,
                d.fade,
                motions.get(&d.element).copied(),
                options,
            );
        }
    }
    for annotation in &frame.annotations {
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}">"#,
            fmt(annotation.position.x),
            fmt(annotation.position.y),
            fmt(annotation.font_size),
            Rgb::BLACK.to_hex()
        );
        escape_xml_into(&mut out, &annotation.text);
        out.push_str("</text>");
    }
    out.push_str("</g></svg>");

    tracing::trace!(
        drawables = drawables.len(),
        motions = motions.len(),
        redraws = redraws.len(),
        bytes = out.len(),
        "svg frame written"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_shrinks_with_label_width() {
        assert_eq!(fit_font_size("7", 40.0), 16.0);
        assert_eq!(fit_font_size("123456", 40.0), 10.0);
        assert_eq!(fit_font_size("", 40.0), 16.0);
    }

    #[test]
    fn labels_sit_on_the_middle_segment() {
        use algviz_core::geom::point;
        let path = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 20.0)];
        assert_eq!(label_anchor(&path), Some(point(5.0, 0.0)));
        assert_eq!(label_anchor(&path[1..]), Some(point(10.0, 10.0)));
        assert_eq!(label_anchor(&[]), None);
    }
}
