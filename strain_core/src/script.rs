//! # Stack Script Parser
//!
//! Parses the layer-stack description syntax into [`LayerSpec`]s.
//!
//! ## Syntax
//!
//! Each line describes a group of layers, top-first:
//!
//! ```text
//! # comment lines and blank lines are skipped
//! { GaN 200nm, Al50%GaN 1um 0.1 } * 3
//! { [Al50%05%GaN 120.0 10] }
//! { Si111 0.5mm }
//! ```
//!
//! - a layer is `Material thickness[unit] [relaxation]`; units are
//!   nm (default), um, mm, cm, m, with no spacing between number and
//!   unit; the optional third field is the bottom-interface
//!   relaxation ratio (default 0)
//! - `* n` after the closing brace repeats the group n times
//! - `[A<p1>%<p2>%BC thickness count]` is a graded layer: it expands
//!   into `count` equal sub-layers whose two-digit compositions step
//!   linearly from p1 to p2

use crate::errors::{StrainError, StrainResult};
use crate::structure::LayerSpec;
use crate::units::{Meters, Micrometers, Millimeters, Nanometers, NM_PER_CM};

/// Parse a thickness with an optional unit suffix, e.g. `"200nm"`,
/// `"1.5um"`, `"0.1m"`, or a bare number in nm.
fn parse_thickness(text: &str, line: usize) -> StrainResult<Nanometers> {
    let text = text.trim();
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.parse().map_err(|_| {
        StrainError::script_error(line, format!("invalid thickness '{}'", text))
    })?;
    match unit {
        "" | "nm" => Ok(Nanometers(value)),
        "um" => Ok(Micrometers(value).into()),
        "mm" => Ok(Millimeters(value).into()),
        "cm" => Ok(Nanometers(value * NM_PER_CM)),
        "m" => Ok(Meters(value).into()),
        other => Err(StrainError::script_error(
            line,
            format!("unknown length unit '{}'", other),
        )),
    }
}

/// Locate the `<dd>%<dd>%` block of a graded-layer label and return
/// (prefix, p1, p2, suffix).
fn split_graded_label(name: &str, line: usize) -> StrainResult<(String, u32, u32, String)> {
    let chars: Vec<char> = name.chars().collect();
    let is_block = |i: usize| -> bool {
        i + 5 < chars.len()
            && chars[i].is_ascii_digit()
            && chars[i + 1].is_ascii_digit()
            && chars[i + 2] == '%'
            && chars[i + 3].is_ascii_digit()
            && chars[i + 4].is_ascii_digit()
            && chars[i + 5] == '%'
    };
    for i in 0..chars.len() {
        if is_block(i) {
            let digits = |a: usize| chars[a].to_digit(10).unwrap() * 10 + chars[a + 1].to_digit(10).unwrap();
            let prefix: String = chars[..i].iter().collect();
            let suffix: String = chars[i + 6..].iter().collect();
            return Ok((prefix, digits(i), digits(i + 3), suffix));
        }
    }
    Err(StrainError::script_error(
        line,
        format!("graded layer '{}' needs a <dd>%<dd>% composition range", name),
    ))
}

/// Expand a graded-layer command `[A<p1>%<p2>%BC thickness count]`
/// into `count` ordinary layer entries with linearly stepped
/// compositions and thickness/count each.
fn discretize_graded(cmd: &str, line: usize) -> StrainResult<String> {
    let inner = cmd.trim_start_matches('[').trim_end_matches(']');
    let fields: Vec<&str> = inner.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(StrainError::script_error(
            line,
            format!("invalid graded layer '{}': expected name, thickness, count", cmd),
        ));
    }
    let (name, thickness_str, count_str) = (fields[0], fields[1], fields[2]);
    let thickness: f64 = thickness_str.parse().map_err(|_| {
        StrainError::script_error(line, format!("invalid graded thickness '{}'", thickness_str))
    })?;
    let count: usize = count_str.parse().map_err(|_| {
        StrainError::script_error(line, format!("invalid graded layer count '{}'", count_str))
    })?;
    if count <= 2 {
        return Err(StrainError::script_error(
            line,
            format!("graded layer '{}' needs more than 2 sub-layers", cmd),
        ));
    }
    let (prefix, p1, p2, suffix) = split_graded_label(name, line)?;
    let step = (p2 as f64 - p1 as f64) / (count as f64 - 1.0);
    let sub_thickness = thickness / count as f64;
    let entries: Vec<String> = (0..count)
        .map(|i| {
            let pct = (p1 as f64 + step * i as f64).round() as i64;
            format!("{}{:02}%{} {}", prefix, pct, suffix, sub_thickness)
        })
        .collect();
    Ok(entries.join(","))
}

/// Replace every `[...]` graded-layer group in a layer list with its
/// expansion.
fn expand_graded_layers(layers: &str, line: usize) -> StrainResult<String> {
    let mut result = String::new();
    let mut rest = layers;
    while let Some(start) = rest.find('[') {
        let end = rest[start..].find(']').ok_or_else(|| {
            StrainError::script_error(line, "unterminated '[' in graded layer")
        })? + start;
        result.push_str(&rest[..start]);
        result.push_str(&discretize_graded(&rest[start..=end], line)?);
        rest = &rest[end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

/// Parse one `{...} * repeat` line into layer specs.
fn parse_line(line_text: &str, line: usize, specs: &mut Vec<LayerSpec>) -> StrainResult<()> {
    let open = line_text.find('{').ok_or_else(|| {
        StrainError::script_error(line, "expected '{' to open the layer list")
    })?;
    let close = line_text.find('}').ok_or_else(|| {
        StrainError::script_error(line, "expected '}' to close the layer list")
    })?;
    if close < open {
        return Err(StrainError::script_error(line, "'}' before '{'"));
    }
    let layers = expand_graded_layers(&line_text[open + 1..close], line)?;

    let after = &line_text[close + 1..];
    let repeat = match after.find('*') {
        Some(star) => {
            let count_str = after[star + 1..].trim();
            count_str.parse::<usize>().map_err(|_| {
                StrainError::script_error(line, format!("invalid repeat count '{}'", count_str))
            })?
        }
        None => 1,
    };

    let mut group = Vec::new();
    for layer_text in layers.split(',') {
        let fields: Vec<&str> = layer_text.split_whitespace().collect();
        match fields.len() {
            2 | 3 => {
                let relaxation = if fields.len() == 3 {
                    fields[2].parse::<f64>().map_err(|_| {
                        StrainError::script_error(
                            line,
                            format!("invalid relaxation ratio '{}'", fields[2]),
                        )
                    })?
                } else {
                    0.0
                };
                group.push(LayerSpec {
                    material_name: fields[0].to_string(),
                    thickness_nm: parse_thickness(fields[1], line)?,
                    relaxation,
                });
            }
            _ => {
                return Err(StrainError::script_error(
                    line,
                    format!(
                        "invalid layer '{}': expected material, thickness, optional relaxation",
                        layer_text.trim()
                    ),
                ));
            }
        }
    }
    for _ in 0..repeat {
        specs.extend(group.iter().cloned());
    }
    Ok(())
}

/// Parse a complete stack script into top-first layer specs.
///
/// Blank lines and lines containing `#` are skipped.
pub fn parse_script(text: &str) -> StrainResult<Vec<LayerSpec>> {
    let mut specs = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line_text = raw.trim();
        if line_text.is_empty() || line_text.contains('#') {
            continue;
        }
        parse_line(line_text, index + 1, &mut specs)?;
    }
    if specs.is_empty() {
        return Err(StrainError::script_error(
            0,
            "script describes no layers",
        ));
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_two_layer_script() {
        let specs = parse_script("{GaN 200nm, Si111 0.5mm}").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].material_name, "GaN");
        assert_eq!(specs[0].thickness_nm, Nanometers(200.0));
        assert_eq!(specs[0].relaxation, 0.0);
        assert_eq!(specs[1].material_name, "Si111");
        assert_eq!(specs[1].thickness_nm, Nanometers(0.5e6));
    }

    #[test]
    fn test_default_unit_is_nm() {
        let specs = parse_script("{GaN 200}").unwrap();
        assert_eq!(specs[0].thickness_nm, Nanometers(200.0));
    }

    #[test]
    fn test_unit_suffixes_convert_to_nm() {
        let specs = parse_script("{GaN 1um, GaN 2mm, GaN 3cm, GaN 0.5m}").unwrap();
        assert_eq!(specs[0].thickness_nm, Nanometers(1.0e3));
        assert_eq!(specs[1].thickness_nm, Nanometers(2.0e6));
        assert_eq!(specs[2].thickness_nm, Nanometers(3.0e7));
        assert_eq!(specs[3].thickness_nm, Nanometers(0.5e9));
    }

    #[test]
    fn test_relaxation_field() {
        let specs = parse_script("{GaN 1um 0.25, AlN 100um}").unwrap();
        assert_eq!(specs[0].relaxation, 0.25);
        assert_eq!(specs[0].thickness_nm, Nanometers(1000.0));
    }

    #[test]
    fn test_repeat() {
        let specs = parse_script("{GaN 10, AlN 20} * 3").unwrap();
        assert_eq!(specs.len(), 6);
        assert_eq!(specs[2].material_name, "GaN");
        assert_eq!(specs[3].material_name, "AlN");
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let script = "\n# superlattice test\n{GaN 10, AlN 20} * 2\n\n{Si111 1mm}\n";
        let specs = parse_script(script).unwrap();
        assert_eq!(specs.len(), 5);
        assert_eq!(specs[4].material_name, "Si111");
    }

    #[test]
    fn test_graded_layer_expansion() {
        let specs = parse_script("{[Al50%05%GaN 120.0 10]}").unwrap();
        assert_eq!(specs.len(), 10);
        assert_eq!(specs[0].material_name, "Al50%GaN");
        assert_eq!(specs[1].material_name, "Al45%GaN");
        assert_eq!(specs[9].material_name, "Al05%GaN");
        for spec in &specs {
            assert!((spec.thickness_nm.0 - 12.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_graded_layer_inside_group() {
        let specs = parse_script("{GaN 100, [Al20%10%GaN 30.0 3], AlN 50}").unwrap();
        assert_eq!(specs.len(), 5);
        assert_eq!(specs[1].material_name, "Al20%GaN");
        assert_eq!(specs[2].material_name, "Al15%GaN");
        assert_eq!(specs[3].material_name, "Al10%GaN");
        assert_eq!(specs[4].material_name, "AlN");
    }

    #[test]
    fn test_malformed_scripts() {
        assert!(parse_script("GaN 200nm").is_err());
        assert!(parse_script("{GaN 200xy}").is_err());
        assert!(parse_script("{GaN}").is_err());
        assert!(parse_script("{[Al50%05%GaN 120.0 2]}").is_err());
        assert!(parse_script("{[AlGaN 120.0 5]}").is_err());
        assert!(parse_script("{GaN 10} * x").is_err());
        assert!(parse_script("").is_err());
    }

    #[test]
    fn test_error_carries_line_number() {
        let script = "{GaN 100}\n{AlN 10zz}\n";
        match parse_script(script) {
            Err(StrainError::ScriptError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected ScriptError, got {:?}", other),
        }
    }
}
