use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, SyncError};
use crate::schedule::Sport;

use super::extract::Segment;

/// Written instead of the XML envelope when a workout has no power segments.
pub const NO_DATA_MARKER: &str = "No workout data found.";

const ZWO_SPORT_TYPE: &str = "bike";

/// A rendered-to-be `.zwo` interval workout.
#[derive(Debug, Clone)]
pub struct WorkoutDocument {
    /// Source sport. Only decides upstream whether the workout is processed;
    /// the file always targets the bike.
    pub sport: Sport,
    pub segments: Vec<Segment>,
}

impl WorkoutDocument {
    pub fn new(sport: Sport, segments: Vec<Segment>) -> Self {
        Self { sport, segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Renders the document. Output depends only on the segments, so re-running
    /// a sync produces byte-identical files.
    pub fn render(&self) -> Result<String> {
        if self.is_empty() {
            return Ok(NO_DATA_MARKER.to_string());
        }

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.write_event(Event::Start(BytesStart::new("workout_file")))?;

        write_text_element(&mut writer, "author", "")?;
        write_text_element(&mut writer, "name", "")?;
        write_text_element(&mut writer, "description", "")?;
        write_text_element(&mut writer, "sportType", ZWO_SPORT_TYPE)?;
        writer.write_event(Event::Empty(BytesStart::new("tags")))?;

        writer.write_event(Event::Start(BytesStart::new("workout")))?;
        for segment in &self.segments {
            writer.write_event(Event::Empty(steady_state(segment)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("workout")))?;

        writer.write_event(Event::End(BytesEnd::new("workout_file")))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| SyncError::Extraction(format!("Rendered workout is not UTF-8: {e}")))
    }
}

fn steady_state(segment: &Segment) -> BytesStart<'static> {
    let mut element = BytesStart::new("SteadyState");
    element.push_attribute(("show_avg", "1"));
    if let Some(cadence) = segment.target_cadence {
        element.push_attribute(("Cadence", cadence.to_string().as_str()));
    }
    element.push_attribute(("Power", segment.target_power.to_string().as_str()));
    element.push_attribute(("Duration", segment.duration_seconds.to_string().as_str()));
    element
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
