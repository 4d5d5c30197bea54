mod attributes;
mod footnotes;
mod line_map;

pub(crate) use attributes::{ParsedTag, parse_tag};
pub(crate) use footnotes::{FootnoteMarkers, parse_definition, parse_reference};
pub(crate) use line_map::LineMap;
