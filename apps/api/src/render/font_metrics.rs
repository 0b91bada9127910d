//! Static glyph-width tables for the standard Helvetica faces.
//!
//! Widths are in 1/1000 em, taken from the Adobe core-font AFM files. The
//! tables cover ASCII 0x20..=0x7E (95 printable characters); index is
//! `(char as usize) - 32`. Oblique shares the regular widths.

use crate::render::commands::FontFace;

/// Fallback width for characters outside the table (`×`, `÷` and friends).
const FALLBACK_WIDTH: u16 = 584;

/// Helvetica ascender, used to place a text line's baseline below its top edge.
pub const ASCENDER: f32 = 0.718;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // sp ! " # $ % & ' ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // 0-9
    278, 278, 584, 584, 584, 556, 1015,                                             // : ; < = > ? @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // N-Z
    278, 278, 278, 469, 556, 333,                                                   // [ \ ] ^ _ `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // n-z
    334, 260, 334, 584,                                                             // { | } ~
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn table(face: FontFace) -> &'static [u16; 95] {
    match face {
        FontFace::Regular | FontFace::Oblique => &HELVETICA,
        FontFace::Bold => &HELVETICA_BOLD,
    }
}

/// Width of a single character in 1/1000 em.
pub fn char_width(face: FontFace, c: char) -> u16 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        table(face)[code - 32]
    } else {
        FALLBACK_WIDTH
    }
}

/// Rendered width of `text` in points at `size`, including letter spacing
/// after every character.
pub fn text_width(text: &str, face: FontFace, size: f32, letter_spacing: f32) -> f32 {
    let (units, count) = text.chars().fold((0u32, 0u32), |(units, count), c| {
        (units + u32::from(char_width(face, c)), count + 1)
    });
    units as f32 * size / 1000.0 + letter_spacing * count as f32
}
