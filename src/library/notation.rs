//! Compact note notation and interval names used by [`MemoryLibrary`](super::MemoryLibrary).
//!
//! ```text
//! C4 D4 E4/2 r/1 F#4/0.5 Bb3
//! G3/4 C3/4
//! ```
//!
//! Each non-empty line is one part. A token is a pitch (step, optional
//! accidentals, octave) or `r` for a rest, optionally followed by
//! `/quarterLength` (default 1). Lines starting with `%` are comments.

use std::ops::RangeInclusive;

/// Playable MIDI pitches, `C-1` through `G9`.
pub const PITCH_RANGE: RangeInclusive<i32> = 0..=127;

const STEP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// One parsed token: `pitch` is a MIDI number, `None` for a rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteToken {
    pub pitch: Option<i32>,
    pub quarter_length: f64,
}

/// Parse a whole document into parts of note tokens.
pub fn parse_document(input: &str) -> Result<Vec<Vec<NoteToken>>, String> {
    let mut parts = Vec::new();
    for (line_num, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let part = trimmed
            .split_whitespace()
            .map(parse_token)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("line {}: {e}", line_num + 1))?;
        parts.push(part);
    }
    if parts.is_empty() {
        return Err("no notes found".into());
    }
    Ok(parts)
}

pub fn parse_token(token: &str) -> Result<NoteToken, String> {
    let (head, quarter_length) = match token.split_once('/') {
        Some((head, ql)) => {
            let ql: f64 = ql
                .parse()
                .map_err(|_| format!("invalid duration in {token}"))?;
            if !(ql > 0.0 && ql.is_finite()) {
                return Err(format!("duration must be positive in {token}"));
            }
            (head, ql)
        }
        None => (token, 1.0),
    };
    if head.eq_ignore_ascii_case("r") {
        return Ok(NoteToken {
            pitch: None,
            quarter_length,
        });
    }
    Ok(NoteToken {
        pitch: Some(parse_pitch(head)?),
        quarter_length,
    })
}

/// Parse a pitch name like `C4`, `F#5`, `Bb3` or `C##-1` into a MIDI number.
pub fn parse_pitch(name: &str) -> Result<i32, String> {
    let mut chars = name.chars();
    let step = match chars.next() {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(format!("invalid pitch: {name}")),
    };
    let rest = chars.as_str();
    let accidentals_len = rest
        .find(|c: char| c != '#' && c != 'b')
        .unwrap_or(rest.len());
    let (accidentals, octave) = rest.split_at(accidentals_len);
    let alter: i32 = accidentals
        .chars()
        .map(|c| if c == '#' { 1 } else { -1 })
        .sum();
    let octave: i32 = octave
        .parse()
        .map_err(|_| format!("invalid octave in pitch: {name}"))?;
    octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|base| base.checked_add(step + alter))
        .filter(|midi| PITCH_RANGE.contains(midi))
        .ok_or_else(|| format!("pitch out of range: {name}"))
}

/// Shift a MIDI pitch, staying inside [`PITCH_RANGE`].
pub fn shift_pitch(midi: i32, semitones: i32) -> Result<i32, String> {
    midi.checked_add(semitones)
        .filter(|shifted| PITCH_RANGE.contains(shifted))
        .ok_or_else(|| {
            format!(
                "transposing {} by {semitones} semitones leaves the pitch range",
                pitch_name(midi)
            )
        })
}

/// Spell a MIDI number with sharps, e.g. `61` → `C#4`.
pub fn pitch_name(midi: i32) -> String {
    let (step, alter, octave) = pitch_parts(midi);
    let accidental = if alter == 1 { "#" } else { "" };
    format!("{step}{accidental}{octave}")
}

/// Step letter, alteration and octave of a MIDI number.
pub fn pitch_parts(midi: i32) -> (char, i32, i32) {
    let pc = midi.rem_euclid(12) as usize;
    let octave = midi.div_euclid(12) - 1;
    let name = STEP_NAMES[pc];
    let step = name.chars().next().unwrap_or('C');
    let alter = if name.len() > 1 { 1 } else { 0 };
    (step, alter, octave)
}

/// Parse an interval name into semitones: `P5`, `p5`, `M3`, `m3`, `A4`,
/// `d5`, `-M2`, `P8`, `M9`.
pub fn interval_semitones(name: &str) -> Result<i32, String> {
    let (sign, body) = match name.strip_prefix('-') {
        Some(body) => (-1, body),
        None => (1, name),
    };
    let mut chars = body.chars();
    let quality = chars.next().ok_or_else(|| format!("invalid interval: {name}"))?;
    let generic: i32 = chars
        .as_str()
        .parse()
        .map_err(|_| format!("invalid interval: {name}"))?;
    if generic < 1 {
        return Err(format!("invalid interval: {name}"));
    }

    let octaves = (generic - 1) / 7;
    let simple = (generic - 1) % 7 + 1;
    let (base, perfect_class) = match simple {
        1 => (0, true),
        2 => (2, false),
        3 => (4, false),
        4 => (5, true),
        5 => (7, true),
        6 => (9, false),
        _ => (11, false),
    };

    let offset = match (quality, perfect_class) {
        ('P' | 'p', true) => 0,
        ('M', false) => 0,
        ('m', false) => -1,
        ('A' | 'a', _) => 1,
        ('d' | 'D', true) => -1,
        ('d' | 'D', false) => -2,
        _ => return Err(format!("invalid interval quality: {name}")),
    };

    octaves
        .checked_mul(12)
        .and_then(|span| span.checked_add(base + offset))
        .map(|span| sign * span)
        .ok_or_else(|| format!("interval too large: {name}"))
}
