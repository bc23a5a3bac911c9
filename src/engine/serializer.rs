//! Result Serializer: renders `returnDict` entries and assembles the response.

use tracing::debug;

use crate::allowlist::DataFormat;
use crate::error::RequestFault;
use crate::library::LibraryFault;
use crate::ordered::OrderedMap;
use crate::request::ReturnDescriptor;
use crate::response::{OutputEntry, Response};
use crate::value::Value;

use super::context::RequestContext;

/// Build the response, gated on the error list before and after rendering.
pub fn build_response(returns: &[ReturnDescriptor], ctx: &mut RequestContext) -> Response {
    if !ctx.errors.is_empty() {
        debug!(faults = ctx.errors.len(), "skipping serialization");
        return Response::from_faults(ctx.errors.faults());
    }

    let mut output = OrderedMap::new();
    for entry in returns {
        match render_entry(entry, ctx) {
            Ok(rendered) => output.insert(entry.name.clone(), rendered),
            Err(fault) => ctx.fail(fault),
        }
    }

    if ctx.errors.is_empty() {
        Response::success(output)
    } else {
        Response::from_faults(ctx.errors.faults())
    }
}

fn render_entry(entry: &ReturnDescriptor, ctx: &RequestContext) -> Result<OutputEntry, RequestFault> {
    let name = &entry.name;
    let tag = entry
        .format
        .as_deref()
        .filter(|tag| !tag.is_empty())
        .ok_or_else(|| {
            RequestFault::MissingReturnFormat(format!("No format specified for data element {name}"))
        })?;
    let value = ctx.bindings.get(name).ok_or_else(|| {
        RequestFault::UnresolvedBinding(format!("Data element {name} not defined at time of return"))
    })?;
    let format = DataFormat::from_tag(tag)
        .ok_or_else(|| RequestFault::UnknownFormat(format!("Format {tag} not available")))?;

    let data = render(value, format).map_err(|fault| {
        RequestFault::Invocation(format!("Error: {fault} exporting {name} as {format}"))
    })?;
    Ok(OutputEntry {
        fmt: tag.to_string(),
        data,
    })
}

/// Render a value in a return format. Formats without a dedicated export
/// fall back to the generic textual representation.
pub fn render(value: &Value, format: DataFormat) -> Result<String, LibraryFault> {
    match format {
        DataFormat::MusicXml => value.musicxml(),
        DataFormat::ReprText => value.repr_text(),
        _ => Ok(value.to_string()),
    }
}
