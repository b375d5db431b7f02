use crate::ParseError;

/// Largest 1-based node or element id accepted in a deck.
pub const MAX_ID: i64 = i32::MAX as i64;

/// One `id, x, y, z` node line with the id already converted to 0-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub index: usize,
    pub coords: [f64; 3],
}

/// One `id, n0, n1, n2, n3` tetrahedron line, all ids 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRecord {
    pub index: usize,
    pub nodes: [i32; 4],
}

/// Splits a comma-separated payload line. A trailing comma does not
/// produce an empty last field.
pub fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(',').map(str::trim).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Parses a row of exactly `expected` floats (transform lines).
pub fn parse_float_row(
    line: &str,
    line_no: usize,
    expected: usize,
) -> Result<Vec<f64>, ParseError> {
    let fields = split_fields(line);
    if fields.len() != expected {
        return Err(ParseError::Format {
            line: line_no,
            message: format!("expected {expected} values, found {} in `{line}`", fields.len()),
        });
    }
    fields.iter().map(|f| parse_f64(f, line_no, line)).collect()
}

pub fn parse_node_line(line: &str, line_no: usize) -> Result<NodeRecord, ParseError> {
    let fields = split_fields(line);
    if fields.len() < 4 {
        return Err(ParseError::Format {
            line: line_no,
            message: format!("node line needs `id, x, y, z`, got `{line}`"),
        });
    }

    let index = parse_one_based(fields[0], line_no, line)?;
    let coords = [
        parse_f64(fields[1], line_no, line)?,
        parse_f64(fields[2], line_no, line)?,
        parse_f64(fields[3], line_no, line)?,
    ];
    Ok(NodeRecord { index, coords })
}

/// Reads the element id and the four corner nodes. Extra columns, such as
/// the mid-edge nodes of a 10-node tetrahedron, are ignored.
pub fn parse_element_line(line: &str, line_no: usize) -> Result<ElementRecord, ParseError> {
    let fields = split_fields(line);
    if fields.len() < 5 {
        return Err(ParseError::Format {
            line: line_no,
            message: format!("element line needs `id, n0, n1, n2, n3`, got `{line}`"),
        });
    }

    let index = parse_one_based(fields[0], line_no, line)?;
    let mut nodes = [0i32; 4];
    for (slot, field) in nodes.iter_mut().zip(&fields[1..5]) {
        let node = parse_one_based(field, line_no, line)?;
        *slot = i32::try_from(node).map_err(|_| ParseError::Format {
            line: line_no,
            message: format!("node id {} out of range", node + 1),
        })?;
    }
    Ok(ElementRecord { index, nodes })
}

fn parse_f64(field: &str, line_no: usize, line: &str) -> Result<f64, ParseError> {
    field.parse::<f64>().map_err(|_| ParseError::NumericFormat {
        line: line_no,
        content: line.to_string(),
    })
}

fn parse_one_based(field: &str, line_no: usize, line: &str) -> Result<usize, ParseError> {
    let id = field.parse::<i64>().map_err(|_| ParseError::NumericFormat {
        line: line_no,
        content: line.to_string(),
    })?;
    if id < 1 {
        return Err(ParseError::Format {
            line: line_no,
            message: format!("ids are 1-based, found {id} in `{line}`"),
        });
    }
    // Element connectivity stores node indices as `i32`.
    if id > MAX_ID {
        return Err(ParseError::Format {
            line: line_no,
            message: format!("id {id} exceeds the largest supported id {MAX_ID}"),
        });
    }
    usize::try_from(id - 1).map_err(|_| ParseError::Format {
        line: line_no,
        message: format!("id {id} does not fit the address space"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_become_zero_based() {
        let node = parse_node_line("3, 1.5, -2.0, 4e-3", 10).expect("valid node line");
        assert_eq!(node.index, 2);
        assert_eq!(node.coords, [1.5, -2.0, 4e-3]);
    }

    #[test]
    fn element_ids_become_zero_based_and_extra_columns_are_ignored() {
        let elem = parse_element_line("7, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10", 1)
            .expect("valid C3D10 line");
        assert_eq!(elem.index, 6);
        assert_eq!(elem.nodes, [0, 1, 2, 3]);
    }

    #[test]
    fn non_numeric_field_keeps_offending_line() {
        let err = parse_node_line("1, 0.0, abc, 0.0", 42).expect_err("y is not a number");
        assert_eq!(
            err,
            ParseError::NumericFormat {
                line: 42,
                content: "1, 0.0, abc, 0.0".to_string()
            }
        );
    }

    #[test]
    fn zero_id_is_rejected() {
        let err = parse_element_line("1, 0, 1, 2, 3", 2).expect_err("0 is not a 1-based id");
        assert!(matches!(err, ParseError::Format { line: 2, .. }));
    }

    #[test]
    fn short_lines_are_format_errors() {
        assert!(matches!(
            parse_node_line("1, 0.0, 0.0", 1),
            Err(ParseError::Format { .. })
        ));
        assert!(matches!(
            parse_element_line("1, 1, 2, 3", 1),
            Err(ParseError::Format { .. })
        ));
    }

    #[test]
    fn float_rows_require_exact_width() {
        assert_eq!(
            parse_float_row("1., 2., 3.,", 1, 3).expect("trailing comma"),
            vec![1.0, 2.0, 3.0]
        );
        assert!(matches!(
            parse_float_row("1., 2.", 4, 3),
            Err(ParseError::Format { line: 4, .. })
        ));
    }

    #[test]
    fn ids_beyond_i32_are_rejected() {
        let err = parse_node_line("99999999999, 0., 0., 0.", 5).expect_err("id too large");
        assert!(matches!(err, ParseError::Format { line: 5, .. }));
        let err = parse_element_line("1, 1, 2, 3, 2147483649", 6).expect_err("node id too large");
        assert!(matches!(err, ParseError::Format { line: 6, .. }));
        assert!(parse_node_line("2147483647, 0., 0., 0.", 7).is_ok());
    }
}
