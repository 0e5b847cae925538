use std::path::{Path, PathBuf};
use plotters_backend::{
    text_anchor::{HPos, Pos, VPos},
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontTransform,
};

/// Average glyph width relative to the font size, used to lay out labels
/// without loading any font.
const CHAR_WIDTH: f64 = 0.5;
/// Font points per canvas unit, for the default 240-unit-high canvas
/// stretched to 6cm.
const PT_PER_UNIT: f64 = 0.7;
/// Line width in points of a one-unit stroke.
const PT_PER_STROKE: f64 = 1.0;

/// Physical size the canvas is stretched to. Any TeX dimension expression
/// works, e.g. `\textwidth` or `6cm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PictureSize {
    pub width: &'static str,
    pub height: &'static str,
}

enum Target<'a> {
    File(PathBuf),
    Buffer(&'a mut String),
}

/// A plotters backend that records every primitive as a TikZ command.
///
/// Canvas coordinates are kept as integers; the `tikzpicture` sets its x and
/// y units so the whole canvas spans exactly [`PictureSize`]. Nothing is
/// written until [`DrawingBackend::present`] is called, and unlike the
/// bitmap/SVG backends a dropped, unpresented backend writes nothing.
pub struct TikzBackend<'a> {
    target: Target<'a>,
    size: (u32, u32),
    picture: PictureSize,
    body: Vec<String>,
    saved: bool,
}

impl<'a> TikzBackend<'a> {
    pub fn new<P: AsRef<Path> + ?Sized>(path: &P, size: (u32, u32), picture: PictureSize) -> Self {
        Self::with_target(Target::File(path.as_ref().to_path_buf()), size, picture)
    }

    /// Renders into `buf` instead of a file; `buf` is replaced on present.
    pub fn with_string(buf: &'a mut String, size: (u32, u32), picture: PictureSize) -> Self {
        Self::with_target(Target::Buffer(buf), size, picture)
    }

    fn with_target(target: Target<'a>, size: (u32, u32), picture: PictureSize) -> Self {
        Self {
            target,
            size,
            picture,
            body: Vec::new(),
            saved: false,
        }
    }

    fn point(&self, (x, y): BackendCoord) -> String {
        format!("({},{})", x, self.size.1 as i32 - y)
    }

    fn path(&self, points: &[BackendCoord]) -> String {
        points.iter().map(|p| self.point(*p)).collect::<Vec<_>>().join(" -- ")
    }

    fn document(&self) -> String {
        let mut doc = String::new();
        doc.push_str(&format!(
            "\\begin{{tikzpicture}}[x={{{}/{}}}, y={{{}/{}}}]\n",
            self.picture.width, self.size.0.max(1), self.picture.height, self.size.1.max(1),
        ));
        for line in &self.body {
            doc.push_str(line);
            doc.push('\n');
        }
        doc.push_str("\\end{tikzpicture}\n");
        doc
    }
}

fn color_spec(color: &BackendColor) -> String {
    let (r, g, b) = color.rgb;
    format!("{{rgb,255:red,{};green,{};blue,{}}}", r, g, b)
}

fn stroke_options<S: BackendStyle>(style: &S) -> Option<String> {
    let color = style.color();
    if color.alpha == 0.0 {
        return None;
    }
    let mut opts = format!(
        "draw={}, line width={:.2}pt",
        color_spec(&color), style.stroke_width() as f64 * PT_PER_STROKE,
    );
    if color.alpha < 1.0 {
        opts.push_str(&format!(", draw opacity={:.3}", color.alpha));
    }
    Some(opts)
}

fn fill_options(color: &BackendColor) -> Option<String> {
    if color.alpha == 0.0 {
        return None;
    }
    let mut opts = format!("fill={}", color_spec(color));
    if color.alpha < 1.0 {
        opts.push_str(&format!(", fill opacity={:.3}", color.alpha));
    }
    Some(opts)
}

fn anchor(pos: Pos) -> &'static str {
    match (pos.v_pos, pos.h_pos) {
        (VPos::Top, HPos::Left) => "north west",
        (VPos::Top, HPos::Center) => "north",
        (VPos::Top, HPos::Right) => "north east",
        (VPos::Center, HPos::Left) => "west",
        (VPos::Center, HPos::Center) => "center",
        (VPos::Center, HPos::Right) => "east",
        (VPos::Bottom, HPos::Left) => "south west",
        (VPos::Bottom, HPos::Center) => "south",
        (VPos::Bottom, HPos::Right) => "south east",
    }
}

/// Escapes the characters TeX treats specially.
fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            },
            _ => out.push(c),
        }
    }
    out
}

/// Approximate (width, height) of `text` in canvas units.
pub fn estimate_text_size(text: &str, size: f64) -> (u32, u32) {
    let width = text.chars().count() as f64 * size * CHAR_WIDTH;
    (width.ceil() as u32, size.ceil() as u32)
}

impl<'a> DrawingBackend for TikzBackend<'a> {
    type ErrorType = std::io::Error;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        self.saved = false;
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if self.saved {
            return Ok(());
        }
        let doc = self.document();
        match &mut self.target {
            Target::File(path) => std::fs::write(path.as_path(), doc).map_err(DrawingErrorKind::DrawingError)?,
            Target::Buffer(buf) => {
                buf.clear();
                buf.push_str(&doc);
            },
        }
        self.saved = true;
        Ok(())
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if let Some(opts) = fill_options(&color) {
            let line = format!(
                "\\fill[{}] {} rectangle {};",
                opts, self.point(point), self.point((point.0 + 1, point.1 + 1)),
            );
            self.body.push(line);
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self, from: BackendCoord, to: BackendCoord, style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if let Some(opts) = stroke_options(style) {
            let line = format!("\\draw[{}] {} -- {};", opts, self.point(from), self.point(to));
            self.body.push(line);
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self, upper_left: BackendCoord, bottom_right: BackendCoord, style: &S, fill: bool,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let (cmd, opts) = if fill {
            ("fill", fill_options(&style.color()))
        } else {
            ("draw", stroke_options(style))
        };
        if let Some(opts) = opts {
            let line = format!(
                "\\{}[{}] {} rectangle {};",
                cmd, opts, self.point(upper_left), self.point(bottom_right),
            );
            self.body.push(line);
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self, path: I, style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let points: Vec<_> = path.into_iter().collect();
        if points.len() < 2 {
            return Ok(());
        }
        if let Some(opts) = stroke_options(style) {
            let line = format!("\\draw[{}] {};", opts, self.path(&points));
            self.body.push(line);
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self, center: BackendCoord, radius: u32, style: &S, fill: bool,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let (cmd, opts) = if fill {
            ("fill", fill_options(&style.color()))
        } else {
            ("draw", stroke_options(style))
        };
        if let Some(opts) = opts {
            let line = format!("\\{}[{}] {} circle ({});", cmd, opts, self.point(center), radius);
            self.body.push(line);
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self, vert: I, style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let points: Vec<_> = vert.into_iter().collect();
        if points.len() < 3 {
            return Ok(());
        }
        if let Some(opts) = fill_options(&style.color()) {
            let line = format!("\\fill[{}] {} -- cycle;", opts, self.path(&points));
            self.body.push(line);
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self, text: &str, style: &TStyle, pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let color = style.color();
        if color.alpha == 0.0 || text.is_empty() {
            return Ok(());
        }
        let pt = style.size() * PT_PER_UNIT;
        let mut opts = vec![
            format!("anchor={}", anchor(style.anchor())),
            format!("text={}", color_spec(&color)),
            "inner sep=0pt".to_string(),
            format!("font=\\fontsize{{{:.1}}}{{{:.1}}}\\selectfont", pt, pt * 1.2),
        ];
        match style.transform() {
            FontTransform::Rotate90 => opts.push("rotate=-90".into()),
            FontTransform::Rotate180 => opts.push("rotate=180".into()),
            FontTransform::Rotate270 => opts.push("rotate=90".into()),
            _ => {},
        }
        let line = format!("\\node[{}] at {} {{{}}};", opts.join(", "), self.point(pos), escape_latex(text));
        self.body.push(line);
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self, text: &str, style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<std::io::Error>> {
        Ok(estimate_text_size(text, style.size()))
    }
}

#[cfg(test)]
mod test {
    use plotters::prelude::*;
    use super::*;

    const FULL_WIDTH: PictureSize = PictureSize { width: "\\textwidth", height: "6cm" };

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("obf_v1"), "obf\\_v1");
        assert_eq!(escape_latex("50% & #1"), "50\\% \\& \\#1");
        assert_eq!(escape_latex("a\\b{c}"), "a\\textbackslash{}b\\{c\\}");
        assert_eq!(escape_latex("x^2~y"), "x\\textasciicircum{}2\\textasciitilde{}y");
        assert_eq!(escape_latex("plain text"), "plain text");
    }

    #[test]
    fn test_estimate_text_size() {
        assert_eq!(estimate_text_size("", 10.0), (0, 10));
        assert_eq!(estimate_text_size("abcd", 10.0), (20, 10));
    }

    #[test]
    fn test_primitives() {
        let mut buf = String::new();
        {
            let root = TikzBackend::with_string(&mut buf, (100, 50), FULL_WIDTH).into_drawing_area();
            root.draw(&Rectangle::new([(0, 0), (10, 10)], RED.filled())).unwrap();
            root.draw(&PathElement::new(vec![(0, 50), (100, 50)], Color::stroke_width(&BLUE, 2))).unwrap();
            root.draw(&PathElement::new(vec![(0, 25), (100, 25)], Color::stroke_width(&BLACK, 1))).unwrap();
            root.draw(&Text::new("a_b", (5, 5), ("sans-serif", 10).into_font())).unwrap();
            root.present().unwrap();
        }
        let lines: Vec<_> = buf.lines().collect();
        assert_eq!(lines.first(), Some(&"\\begin{tikzpicture}[x={\\textwidth/100}, y={6cm/50}]"));
        assert_eq!(lines.last(), Some(&"\\end{tikzpicture}"));
        assert!(lines.contains(&"\\fill[fill={rgb,255:red,255;green,0;blue,0}] (0,50) rectangle (10,40);"));
        assert!(lines.contains(&"\\draw[draw={rgb,255:red,0;green,0;blue,255}, line width=2.00pt] (0,0) -- (100,0);"));
        assert!(lines.contains(&"\\draw[draw={rgb,255:red,0;green,0;blue,0}, line width=1.00pt] (0,25) -- (100,25);"));
        let text = lines.iter().find(|l| l.starts_with("\\node")).unwrap();
        assert!(text.contains("anchor=north west"));
        assert!(text.ends_with("at (5,45) {a\\_b};"));
    }

    #[test]
    fn test_rotated_text() {
        let mut buf = String::new();
        {
            let root = TikzBackend::with_string(&mut buf, (100, 100), FULL_WIDTH).into_drawing_area();
            let style = ("sans-serif", 10).into_font().transform(FontTransform::Rotate270);
            root.draw(&Text::new("metric", (10, 50), style)).unwrap();
            root.present().unwrap();
        }
        assert!(buf.contains("rotate=90"));
        assert!(buf.contains("{metric}"));
    }

    #[test]
    fn test_custom_picture_size() {
        let mut buf = String::new();
        {
            let picture = PictureSize { width: "8cm", height: "4cm" };
            let root = TikzBackend::with_string(&mut buf, (200, 100), picture).into_drawing_area();
            root.present().unwrap();
        }
        assert!(buf.starts_with("\\begin{tikzpicture}[x={8cm/200}, y={4cm/100}]\n"));
    }

    #[test]
    fn test_file_written_only_on_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.tex");
        {
            let root = TikzBackend::new(&path, (10, 10), FULL_WIDTH).into_drawing_area();
            root.draw(&Rectangle::new([(0, 0), (5, 5)], BLACK.filled())).unwrap();
        }
        assert!(!path.exists());
        {
            let root = TikzBackend::new(&path, (10, 10), FULL_WIDTH).into_drawing_area();
            root.draw(&Rectangle::new([(0, 0), (5, 5)], BLACK.filled())).unwrap();
            root.present().unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("rectangle (5,5);"));
    }
}
