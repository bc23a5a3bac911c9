//! In-memory score model: streams of notes, rests and nested parts.

use std::any::Any;

use crate::allowlist::{Attribute, Callable};
use crate::value::{format_float, Value};

use super::notation::{self, NoteToken};
use super::{DomainObject, LibraryFault};

/// MusicXML divisions per quarter note used by the exporter.
const DIVISIONS: f64 = 480.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Score,
    Part,
    /// A flattened view with no nesting.
    Stream,
}

impl StreamKind {
    fn name(self) -> &'static str {
        match self {
            StreamKind::Score => "Score",
            StreamKind::Part => "Part",
            StreamKind::Stream => "Stream",
        }
    }
}

/// A note or rest. `pitch` is a MIDI number, `None` for a rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub pitch: Option<i32>,
    pub quarter_length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Note(Note),
    Stream(Stream),
}

/// An element positioned at an offset (in quarter lengths) in its container.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub offset: f64,
    pub element: Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub kind: StreamKind,
    pub elements: Vec<Placed>,
}

impl Stream {
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            elements: Vec::new(),
        }
    }

    /// Build a part from note tokens laid end to end.
    pub fn part_from_tokens(tokens: &[NoteToken]) -> Self {
        let mut part = Stream::new(StreamKind::Part);
        let mut offset = 0.0;
        for token in tokens {
            part.elements.push(Placed {
                offset,
                element: Element::Note(Note {
                    pitch: token.pitch,
                    quarter_length: token.quarter_length,
                }),
            });
            offset += token.quarter_length;
        }
        part
    }

    /// Build a score with every part starting at offset 0.
    pub fn score_from_parts(parts: Vec<Stream>) -> Self {
        Self {
            kind: StreamKind::Score,
            elements: parts
                .into_iter()
                .map(|part| Placed {
                    offset: 0.0,
                    element: Element::Stream(part),
                })
                .collect(),
        }
    }

    /// Parse compact notation into a score.
    pub fn parse(input: &str) -> Result<Self, String> {
        let parts = notation::parse_document(input)?;
        Ok(Self::score_from_parts(
            parts.iter().map(|p| Self::part_from_tokens(p)).collect(),
        ))
    }

    /// Fails if any pitch would leave the MIDI range.
    pub fn transpose(&self, semitones: i32) -> Result<Stream, String> {
        self.map_notes(&|note| {
            let pitch = note
                .pitch
                .map(|p| notation::shift_pitch(p, semitones))
                .transpose()?;
            Ok(Note { pitch, ..*note })
        })
    }

    /// Scale every offset and duration by `factor`.
    pub fn augment_or_diminish(&self, factor: f64) -> Stream {
        Stream {
            kind: self.kind,
            elements: self
                .elements
                .iter()
                .map(|placed| Placed {
                    offset: placed.offset * factor,
                    element: match &placed.element {
                        Element::Note(note) => Element::Note(Note {
                            quarter_length: note.quarter_length * factor,
                            ..*note
                        }),
                        Element::Stream(inner) => {
                            Element::Stream(inner.augment_or_diminish(factor))
                        }
                    },
                })
                .collect(),
        }
    }

    /// Largest offset among this stream's own elements.
    pub fn highest_offset(&self) -> f64 {
        self.elements
            .iter()
            .map(|p| p.offset)
            .fold(0.0, f64::max)
    }

    /// All notes with absolute offsets, ordered by offset.
    pub fn flat(&self) -> Stream {
        let mut flat = Stream::new(StreamKind::Stream);
        self.collect_notes(0.0, &mut flat.elements);
        flat.elements
            .sort_by(|a, b| a.offset.total_cmp(&b.offset));
        flat
    }

    pub fn notes(&self) -> Vec<(f64, Note)> {
        self.flat()
            .elements
            .into_iter()
            .filter_map(|p| match p.element {
                Element::Note(note) => Some((p.offset, note)),
                Element::Stream(_) => None,
            })
            .collect()
    }

    fn parts(&self) -> Vec<&Stream> {
        let nested: Vec<&Stream> = self
            .elements
            .iter()
            .filter_map(|p| match &p.element {
                Element::Stream(s) => Some(s),
                Element::Note(_) => None,
            })
            .collect();
        if nested.is_empty() {
            vec![self]
        } else {
            nested
        }
    }

    fn collect_notes(&self, base: f64, out: &mut Vec<Placed>) {
        for placed in &self.elements {
            match &placed.element {
                Element::Note(note) => out.push(Placed {
                    offset: base + placed.offset,
                    element: Element::Note(*note),
                }),
                Element::Stream(inner) => inner.collect_notes(base + placed.offset, out),
            }
        }
    }

    fn map_notes(&self, f: &dyn Fn(&Note) -> Result<Note, String>) -> Result<Stream, String> {
        let elements = self
            .elements
            .iter()
            .map(|placed| {
                let element = match &placed.element {
                    Element::Note(note) => Element::Note(f(note)?),
                    Element::Stream(inner) => Element::Stream(inner.map_notes(f)?),
                };
                Ok(Placed {
                    offset: placed.offset,
                    element,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Stream {
            kind: self.kind,
            elements,
        })
    }

    /// Partwise MusicXML, one measure per part.
    pub fn to_musicxml(&self) -> String {
        let parts = self.parts();
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<score-partwise>\n  <part-list>\n");
        for index in 1..=parts.len() {
            xml.push_str(&format!(
                "    <score-part id=\"P{index}\"><part-name>Part {index}</part-name></score-part>\n"
            ));
        }
        xml.push_str("  </part-list>\n");
        for (index, part) in parts.iter().enumerate() {
            xml.push_str(&format!("  <part id=\"P{}\">\n", index + 1));
            xml.push_str("    <measure number=\"1\">\n");
            xml.push_str(&format!(
                "      <attributes><divisions>{}</divisions></attributes>\n",
                DIVISIONS as i64
            ));
            for (_, note) in part.notes() {
                let duration = (note.quarter_length * DIVISIONS).round() as i64;
                match note.pitch {
                    Some(midi) => {
                        let (step, alter, octave) = notation::pitch_parts(midi);
                        let alter = if alter != 0 {
                            format!("<alter>{alter}</alter>")
                        } else {
                            String::new()
                        };
                        xml.push_str(&format!(
                            "      <note><pitch><step>{step}</step>{alter}<octave>{octave}</octave></pitch><duration>{duration}</duration></note>\n"
                        ));
                    }
                    None => xml.push_str(&format!(
                        "      <note><rest/><duration>{duration}</duration></note>\n"
                    )),
                }
            }
            xml.push_str("    </measure>\n  </part>\n");
        }
        xml.push_str("</score-partwise>\n");
        xml
    }

    /// One line per element with its offset; nested streams are indented.
    pub fn to_repr_text(&self) -> String {
        let mut out = String::new();
        self.write_repr(0, &mut out);
        out
    }

    fn write_repr(&self, depth: usize, out: &mut String) {
        let indent = "    ".repeat(depth);
        for placed in &self.elements {
            let offset = format_float(placed.offset);
            match &placed.element {
                Element::Note(note) => {
                    out.push_str(&format!("{indent}{{{offset}}} {}\n", describe_note(note)));
                }
                Element::Stream(inner) => {
                    out.push_str(&format!("{indent}{{{offset}}} {}\n", inner.text()));
                    inner.write_repr(depth + 1, out);
                }
            }
        }
    }

    fn expect_args<'a>(
        &self,
        callable: Callable,
        args: &'a [Value],
        count: usize,
    ) -> Result<&'a [Value], LibraryFault> {
        if args.len() == count {
            Ok(args)
        } else {
            Err(LibraryFault::new(format!(
                "{}() takes exactly {count} argument(s) ({} given)",
                callable.name(),
                args.len()
            )))
        }
    }
}

fn describe_note(note: &Note) -> String {
    let length = format_float(note.quarter_length);
    match note.pitch {
        Some(midi) => format!("<note {} {length}>", notation::pitch_name(midi)),
        None => format!("<rest {length}>"),
    }
}

/// Interpret a transposition argument: semitones or an interval name.
pub fn interval_arg(value: &Value) -> Result<i32, LibraryFault> {
    match value {
        Value::Int(n) => i32::try_from(*n)
            .map_err(|_| LibraryFault::new(format!("interval out of range: {n}"))),
        Value::Float(x) if x.fract() == 0.0 && x.abs() <= i32::MAX as f64 => Ok(*x as i32),
        Value::Str(name) => notation::interval_semitones(name).map_err(LibraryFault::new),
        other => Err(LibraryFault::new(format!(
            "cannot transpose by a {} value",
            other.type_name()
        ))),
    }
}

impl DomainObject for Stream {
    fn type_name(&self) -> &str {
        self.kind.name()
    }

    fn call(&self, callable: Callable, args: &[Value]) -> Result<Value, LibraryFault> {
        match callable {
            Callable::Transpose => {
                let args = self.expect_args(callable, args, 1)?;
                let semitones = interval_arg(&args[0])?;
                let transposed = self.transpose(semitones).map_err(LibraryFault::new)?;
                Ok(Value::object(transposed))
            }
            Callable::AugmentOrDiminish => {
                let args = self.expect_args(callable, args, 1)?;
                let factor = args[0].as_f64().ok_or_else(|| {
                    LibraryFault::new(format!(
                        "augmentOrDiminish factor must be a number, not {}",
                        args[0].type_name()
                    ))
                })?;
                if !(factor > 0.0 && factor.is_finite()) {
                    return Err(LibraryFault::new(format!(
                        "augmentOrDiminish factor must be positive: {}",
                        format_float(factor)
                    )));
                }
                Ok(Value::object(self.augment_or_diminish(factor)))
            }
            Callable::StreamTranspose | Callable::CorpusParse => {
                let head = callable.name().split('.').next().unwrap_or_default();
                Err(LibraryFault::new(format!(
                    "'{}' object has no attribute '{head}'",
                    self.type_name()
                )))
            }
        }
    }

    fn attribute(&self, attribute: Attribute) -> Result<Value, LibraryFault> {
        match attribute {
            Attribute::HighestOffset => Ok(Value::Float(self.highest_offset())),
            Attribute::Flat => Ok(Value::object(self.flat())),
        }
    }

    fn musicxml(&self) -> Result<String, LibraryFault> {
        Ok(self.to_musicxml())
    }

    fn repr_text(&self) -> Result<String, LibraryFault> {
        Ok(self.to_repr_text())
    }

    fn text(&self) -> String {
        match self.kind {
            StreamKind::Score => format!("<stream.Score parts={}>", self.parts().len()),
            _ => format!("<stream.{} notes={}>", self.kind.name(), self.notes().len()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
