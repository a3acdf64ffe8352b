//! Feature strings are CSV records; this module splits them into fields.

use csv_core::ReadFieldResult;

/// Split one CSV row into fields, honouring double-quoted fields.
pub fn parse_csv_row(row: &str) -> Result<Vec<String>, std::str::Utf8Error> {
    let mut fields = Vec::new();
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = vec![0u8; row.len().max(16)];
    let mut field = Vec::new();
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        field.extend_from_slice(&output[..nout]);
        bytes = &bytes[nin..];
        match result {
            ReadFieldResult::OutputFull => continue,
            ReadFieldResult::Field { record_end } => {
                fields.push(std::str::from_utf8(&field)?.to_string());
                field.clear();
                if record_end {
                    break;
                }
            }
            // The next call sees empty input and terminates the last field.
            ReadFieldResult::InputEmpty => continue,
            ReadFieldResult::End => break,
        }
    }
    Ok(fields)
}

/// Quote `field` as a CSV cell when it contains a delimiter or quote.
pub fn quote_csv_field(field: &str) -> String {
    let mut data = field.as_bytes();
    let mut writer = csv_core::Writer::new();
    let mut output = [0u8; 1024];
    let mut quoted = Vec::with_capacity(field.len() + 2);
    loop {
        let (result, nin, nout) = writer.field(data, &mut output);
        quoted.extend_from_slice(&output[..nout]);
        data = &data[nin..];
        if result == csv_core::WriteResult::InputEmpty {
            break;
        }
    }
    let (_, nout) = writer.finish(&mut output);
    quoted.extend_from_slice(&output[..nout]);
    String::from_utf8_lossy(&quoted).into_owned()
}

/// Rejoin fields into one feature string, quoting where needed.
pub fn join_feature<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Fields of a feature string. A feature that fails to split is returned whole.
pub fn parse_feature(feature: &str) -> Vec<String> {
    parse_csv_row(feature).unwrap_or_else(|_| vec![feature.to_string()])
}
