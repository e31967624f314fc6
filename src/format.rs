//! Human-readable rendering and parsing of scalar entries.
//!
//! Rendering recognizes a fixed table of simple constants (unit fractions,
//! square roots, π) and writes them as unicode glyphs. Parsing accepts
//! everything rendering can produce, so `parse(render(x)) ≈ x`.

use crate::complex::Complex;
use crate::error::{MatrixError, Result};
use crate::SIMPLIFY_EPSILON;

/// How matrix entries are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Glyphs only for exact matches, otherwise the shortest round-trip decimal.
    #[default]
    Exact,
    /// Snaps values within `SIMPLIFY_EPSILON` of a recognized constant to it.
    Simplified,
    /// `Exact` values without spaces after separators.
    Minified,
    /// Fixed-width `+r.rr+i.iii` pairs, both parts always shown.
    Consistent,
}

impl Format {
    /// Separator written between entries and rows.
    pub fn separator(self) -> &'static str {
        match self {
            Format::Minified => ",",
            _ => ", ",
        }
    }
}

/// Recognized constants, positive values only. Negatives are handled by sign.
const GLYPHS: [(&str, f64); 23] = [
    ("½", 1.0 / 2.0),
    ("⅓", 1.0 / 3.0),
    ("⅔", 2.0 / 3.0),
    ("¼", 1.0 / 4.0),
    ("¾", 3.0 / 4.0),
    ("⅕", 1.0 / 5.0),
    ("⅖", 2.0 / 5.0),
    ("⅗", 3.0 / 5.0),
    ("⅘", 4.0 / 5.0),
    ("⅙", 1.0 / 6.0),
    ("⅚", 5.0 / 6.0),
    ("⅐", 1.0 / 7.0),
    ("⅛", 1.0 / 8.0),
    ("⅜", 3.0 / 8.0),
    ("⅝", 5.0 / 8.0),
    ("⅞", 7.0 / 8.0),
    ("⅑", 1.0 / 9.0),
    ("⅒", 1.0 / 10.0),
    ("√½", core::f64::consts::FRAC_1_SQRT_2),
    ("√2", core::f64::consts::SQRT_2),
    ("√3", 1.732_050_807_568_877_2),
    ("π", core::f64::consts::PI),
    ("√⅓", 0.577_350_269_189_625_8),
];

/// Finds a glyph or integer for a non-negative value within `epsilon`.
fn recognize(value: f64, epsilon: f64) -> Option<String> {
    let rounded = value.round();
    let int_tolerance = epsilon.max(rounded.abs() * f64::EPSILON);
    if (value - rounded).abs() <= int_tolerance && rounded.abs() < 1e15 {
        return Some(format!("{}", rounded as i64));
    }
    GLYPHS
        .iter()
        .find(|(_, c)| (value - c).abs() <= epsilon.max(c * 2.0 * f64::EPSILON))
        .map(|(glyph, _)| (*glyph).to_string())
}

/// Renders a non-negative magnitude.
fn format_magnitude(value: f64, format: Format) -> String {
    let epsilon = match format {
        Format::Simplified => SIMPLIFY_EPSILON,
        _ => 0.0,
    };
    recognize(value, epsilon).unwrap_or_else(|| format!("{}", value))
}

/// Renders a real number, sign included.
pub fn format_real(value: f64, format: Format) -> String {
    let value = value + 0.0;
    if format == Format::Consistent {
        return format!("{:+.2}", value);
    }
    let magnitude = format_magnitude(value.abs(), format);
    if value < 0.0 && magnitude != "0" {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Renders a complex number: `r`, `ki`, `r+ki` or `r-ki`, with unit coefficients dropped.
pub fn format_complex(c: Complex, format: Format) -> String {
    if format == Format::Consistent {
        return format!("{:+.2}{:+.2}i", c.re + 0.0, c.im + 0.0);
    }
    let re = format_real(c.re, format);
    let im_magnitude = format_magnitude(c.im.abs(), format);
    if im_magnitude == "0" {
        return re;
    }
    let im_negative = c.im < 0.0;
    let coefficient = if im_magnitude == "1" { "" } else { im_magnitude.as_str() };
    if re == "0" {
        let sign = if im_negative { "-" } else { "" };
        format!("{}{}i", sign, coefficient)
    } else {
        let sign = if im_negative { "-" } else { "+" };
        format!("{}{}{}i", re, sign, coefficient)
    }
}

/// Parses a complex literal such as `2-3i`, `-i`, `½-½i`, `√2` or `1.5e-3 + i`.
///
/// Whitespace may surround the literal and its `+`/`-` separators but never
/// splits a term.
pub fn parse_complex(text: &str) -> Result<Complex> {
    let chars: Vec<char> = text.trim().chars().collect();
    let malformed = |reason: &str| MatrixError::MalformedLiteral {
        text: text.to_string(),
        reason: reason.to_string(),
    };
    if chars.is_empty() {
        return Err(malformed("empty entry"));
    }

    let mut total = Complex::default();
    let mut pos = 0;
    let mut first = true;
    let skip_whitespace = |pos: &mut usize| {
        while chars.get(*pos).is_some_and(|c| c.is_whitespace()) {
            *pos += 1;
        }
    };
    while pos < chars.len() {
        let mut sign = 1.0;
        match chars[pos] {
            '+' => pos += 1,
            '-' => {
                sign = -1.0;
                pos += 1;
            }
            _ if !first => return Err(malformed("expected '+' or '-' between terms")),
            _ => {}
        }
        first = false;
        skip_whitespace(&mut pos);

        let value = match parse_number(&chars, &mut pos) {
            Some(v) => v,
            None if chars.get(pos) == Some(&'i') => 1.0,
            None => return Err(malformed("expected a number")),
        };
        if chars.get(pos) == Some(&'i') {
            pos += 1;
            total = total + Complex::new(0.0, sign * value);
        } else {
            total = total + sign * value;
        }
        skip_whitespace(&mut pos);
    }
    Ok(total)
}

/// Parses an unsigned number (decimal, glyph, or `√` applied to a number) starting at `pos`.
fn parse_number(chars: &[char], pos: &mut usize) -> Option<f64> {
    let start = *pos;
    let c = *chars.get(start)?;
    if c == '√' {
        *pos += 1;
        let inner = parse_number(chars, pos);
        if inner.is_none() {
            *pos = start;
        }
        return inner.map(f64::sqrt);
    }
    let glyph = GLYPHS.iter().find(|(g, _)| {
        let mut it = g.chars();
        it.next() == Some(c) && it.next().is_none()
    });
    if let Some((_, value)) = glyph {
        *pos += 1;
        return Some(*value);
    }
    if !(c.is_ascii_digit() || c == '.') {
        return None;
    }

    let mut end = start;
    while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
        end += 1;
    }
    // Exponent only when followed by a digit, so "2e" is not swallowed.
    if end < chars.len() && (chars[end] == 'e' || chars[end] == 'E') {
        let mut exp_end = end + 1;
        if exp_end < chars.len() && (chars[exp_end] == '+' || chars[exp_end] == '-') {
            exp_end += 1;
        }
        if exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
            while exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            end = exp_end;
        }
    }
    let literal: String = chars[start..end].iter().collect();
    let value = literal.parse::<f64>().ok()?;
    *pos = end;
    Some(value)
}
