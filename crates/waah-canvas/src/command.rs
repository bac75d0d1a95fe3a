//! Path mini-language
//!
//! One command per letter of the SVG-inspired path language, plus a parser
//! for the textual form (`"M 10 10 l 20 0 v 20 z"`).
//!
//! Uppercase letters take absolute coordinates, lowercase ones are relative
//! to the current point. Extra coordinate groups repeat the previous command
//! (a repeated moveto continues as lineto). Arcs take five numbers
//! (center, radius, start and end angle) and an optional sixth direction
//! flag; they never repeat.

use waah_core::{Result, WaahError};

use crate::canvas::Canvas;

/// A single path-language command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// `M x y`
    MoveTo { x: f64, y: f64 },
    /// `m dx dy`
    RelMoveTo { dx: f64, dy: f64 },
    /// `L x y`
    LineTo { x: f64, y: f64 },
    /// `l dx dy`
    RelLineTo { dx: f64, dy: f64 },
    /// `H x`
    HorizontalTo { x: f64 },
    /// `h dx`
    RelHorizontal { dx: f64 },
    /// `V y`
    VerticalTo { y: f64 },
    /// `v dy`
    RelVertical { dy: f64 },
    /// `C x1 y1 x2 y2 x y`
    CurveTo { x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64 },
    /// `c dx1 dy1 dx2 dy2 dx dy`
    RelCurveTo { dx1: f64, dy1: f64, dx2: f64, dy2: f64, dx: f64, dy: f64 },
    /// `A cx cy r a1 a2 [negative]`
    Arc { cx: f64, cy: f64, radius: f64, angle1: f64, angle2: f64, negative: bool },
    /// `a dx dy r a1 a2 [negative]`, center relative to the current point
    RelArc { dx: f64, dy: f64, radius: f64, angle1: f64, angle2: f64, negative: bool },
    /// `z`
    Close,
}

impl PathCommand {
    /// Apply the command to the canvas's current path
    pub fn apply(&self, canvas: &mut Canvas) {
        match *self {
            PathCommand::MoveTo { x, y } => canvas.move_to(x, y),
            PathCommand::RelMoveTo { dx, dy } => canvas.rel_move_to(dx, dy),
            PathCommand::LineTo { x, y } => canvas.line_to(x, y),
            PathCommand::RelLineTo { dx, dy } => canvas.rel_line_to(dx, dy),
            PathCommand::HorizontalTo { x } => canvas.horizontal_to(x),
            PathCommand::RelHorizontal { dx } => canvas.rel_horizontal(dx),
            PathCommand::VerticalTo { y } => canvas.vertical_to(y),
            PathCommand::RelVertical { dy } => canvas.rel_vertical(dy),
            PathCommand::CurveTo { x1, y1, x2, y2, x, y } => canvas.curve_to(x1, y1, x2, y2, x, y),
            PathCommand::RelCurveTo { dx1, dy1, dx2, dy2, dx, dy } => {
                canvas.rel_curve_to(dx1, dy1, dx2, dy2, dx, dy)
            }
            PathCommand::Arc { cx, cy, radius, angle1, angle2, negative } => {
                canvas.arc_to(cx, cy, radius, angle1, angle2, negative)
            }
            PathCommand::RelArc { dx, dy, radius, angle1, angle2, negative } => {
                canvas.rel_arc(dx, dy, radius, angle1, angle2, negative)
            }
            PathCommand::Close => canvas.close_path(),
        };
    }

    /// Parse the textual path language
    pub fn parse(source: &str) -> Result<Vec<PathCommand>> {
        let tokens = tokenize(source)?;
        let mut commands = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let Token::Letter(letter) = tokens[i] else {
                return Err(WaahError::invalid(format!("path data must start with a command: {source:?}")));
            };
            i += 1;

            let start = i;
            while let Some(Token::Number(_)) = tokens.get(i) {
                i += 1;
            }
            let args: Vec<f64> = tokens[start..i]
                .iter()
                .filter_map(|t| match t {
                    Token::Number(n) => Some(*n),
                    Token::Letter(_) => None,
                })
                .collect();

            expand(letter, &args, &mut commands)?;
        }

        Ok(commands)
    }
}

fn expand(letter: char, args: &[f64], out: &mut Vec<PathCommand>) -> Result<()> {
    let arity = match letter {
        'Z' | 'z' => 0,
        'H' | 'h' | 'V' | 'v' => 1,
        'M' | 'm' | 'L' | 'l' => 2,
        'C' | 'c' => 6,
        'A' | 'a' => return expand_arc(letter, args, out),
        _ => return Err(WaahError::invalid(format!("unknown path command '{letter}'"))),
    };

    if arity == 0 {
        if !args.is_empty() {
            return Err(WaahError::invalid("'z' takes no coordinates"));
        }
        out.push(PathCommand::Close);
        return Ok(());
    }

    if args.is_empty() || args.len() % arity != 0 {
        return Err(WaahError::invalid(format!(
            "'{letter}' takes {arity} coordinates per segment, got {}",
            args.len()
        )));
    }

    for (n, a) in args.chunks_exact(arity).enumerate() {
        // Coordinates after a moveto continue the subpath with lines
        let letter = match (letter, n) {
            ('M', 1..) => 'L',
            ('m', 1..) => 'l',
            _ => letter,
        };
        out.push(match letter {
            'M' => PathCommand::MoveTo { x: a[0], y: a[1] },
            'm' => PathCommand::RelMoveTo { dx: a[0], dy: a[1] },
            'L' => PathCommand::LineTo { x: a[0], y: a[1] },
            'l' => PathCommand::RelLineTo { dx: a[0], dy: a[1] },
            'H' => PathCommand::HorizontalTo { x: a[0] },
            'h' => PathCommand::RelHorizontal { dx: a[0] },
            'V' => PathCommand::VerticalTo { y: a[0] },
            'v' => PathCommand::RelVertical { dy: a[0] },
            'C' => PathCommand::CurveTo { x1: a[0], y1: a[1], x2: a[2], y2: a[3], x: a[4], y: a[5] },
            _ => PathCommand::RelCurveTo { dx1: a[0], dy1: a[1], dx2: a[2], dy2: a[3], dx: a[4], dy: a[5] },
        });
    }
    Ok(())
}

fn expand_arc(letter: char, args: &[f64], out: &mut Vec<PathCommand>) -> Result<()> {
    let (a, flag) = match args {
        [a @ .., flag] if args.len() == 6 => (a, Some(*flag)),
        a if a.len() == 5 => (a, None),
        _ => {
            return Err(WaahError::invalid(format!(
                "'{letter}' takes 5 or 6 numbers, got {}",
                args.len()
            )));
        }
    };

    out.push(if letter == 'A' {
        PathCommand::Arc {
            cx: a[0],
            cy: a[1],
            radius: a[2],
            angle1: a[3],
            angle2: a[4],
            negative: flag.is_some_and(|f| f != 0.0),
        }
    } else {
        PathCommand::RelArc {
            dx: a[0],
            dy: a[1],
            radius: a[2],
            angle1: a[3],
            angle2: a[4],
            negative: flag.is_some_and(|f| f > 0.0),
        }
    });
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Letter(char),
    Number(f64),
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() || ch == ',' {
            chars.next();
            continue;
        }
        if ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E' {
            tokens.push(Token::Letter(ch));
            chars.next();
            continue;
        }

        // Number: sign, digits, fraction, exponent
        let mut end = start;
        let mut prev = None;
        while let Some(&(idx, c)) = chars.peek() {
            let sign_ok = (c == '-' || c == '+') && (idx == start || matches!(prev, Some('e' | 'E')));
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || sign_ok {
                end = idx + c.len_utf8();
                prev = Some(c);
                chars.next();
            } else {
                break;
            }
        }

        let text = &source[start..end];
        let value = text
            .parse::<f64>()
            .map_err(|_| WaahError::invalid(format!("bad number in path data: {:?}", &source[start..])))?;
        tokens.push(Token::Number(value));
    }

    Ok(tokens)
}
