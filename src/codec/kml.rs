use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::AppError;
use crate::metadata::Marker;

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// One `Placemark` per marker, in sequence order.
pub fn to_kml_string(markers: &[Marker]) -> Result<String, AppError> {
    let mut buffer = Vec::new();
    write_kml(&mut buffer, markers)?;
    String::from_utf8(buffer).map_err(|e| AppError::Generic(e.to_string()))
}

/// Write the KML document to `path`. Nothing is written unless the whole
/// document was built.
pub fn export_kml(path: &Path, markers: &[Marker]) -> Result<(), AppError> {
    let kml = to_kml_string(markers)?;
    std::fs::write(path, kml)?;
    log::info!("Exported {} markers to {}", markers.len(), path.display());
    Ok(())
}

fn write_kml<W: Write>(out: W, markers: &[Marker]) -> Result<(), AppError> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)])))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;

    for marker in markers {
        write_placemark(&mut writer, marker)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;
    Ok(())
}

fn write_placemark<W: Write>(writer: &mut Writer<W>, marker: &Marker) -> Result<(), AppError> {
    let coordinates = format!(
        "{},{},{}",
        marker.location.longitude,
        marker.location.latitude,
        marker.altitude.unwrap_or(0.0)
    );
    let description = marker.description_lines().join("\n");

    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
    write_text_element(writer, "name", &marker.label)?;
    if !description.is_empty() {
        write_text_element(writer, "description", &description)?;
    }
    writer.write_event(Event::Start(BytesStart::new("Point")))?;
    write_text_element(writer, "coordinates", &coordinates)?;
    writer.write_event(Event::End(BytesEnd::new("Point")))?;
    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), AppError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
