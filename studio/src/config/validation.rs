//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?[0-9A-Fa-f]{6}$").unwrap());

/// Validate a raw setting value. Returns `Ok(())` if valid, or an error message.
///
/// Empty values are always accepted; they mean "use the default".
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    match key {
        "GARMENT_COLOR" if value.eq_ignore_ascii_case("none") => {}
        "GARMENT_COLOR" | "KEY_COLOR" => {
            if !RE_HEX_COLOR.is_match(value) {
                return Err("must be a #RRGGBB hex color".into());
            }
        }
        "HUE_TOLERANCE" => validate_int_range(value, 0, 179)?,
        "SATURATION_TOLERANCE" | "VALUE_TOLERANCE" => validate_int_range(value, 0, 255)?,
        "OPEN_ITERATIONS" | "CLOSE_ITERATIONS" => validate_int_range(value, 0, 20)?,
        "DESIGN_WIDTH" => validate_int_range(value, 1, 20_000)?,
        "OFFSET_X" | "OFFSET_Y" => validate_int_range(value, -20_000, 20_000)?,
        "EXTRACT_DESIGN" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hex_color() {
        assert!(validate_setting("GARMENT_COLOR", "#9E9E16").is_ok());
        assert!(validate_setting("GARMENT_COLOR", "9e9e16").is_ok());
        assert!(validate_setting("KEY_COLOR", "#D9016").is_err());
        assert!(validate_setting("KEY_COLOR", "magenta").is_err());
        assert!(validate_setting("GARMENT_COLOR", "").is_ok()); // empty is ok
        assert!(validate_setting("GARMENT_COLOR", "none").is_ok());
        assert!(validate_setting("KEY_COLOR", "none").is_err());
    }

    #[test]
    fn test_tolerance_ranges() {
        assert!(validate_setting("HUE_TOLERANCE", "179").is_ok());
        assert!(validate_setting("HUE_TOLERANCE", "180").is_err());
        assert!(validate_setting("VALUE_TOLERANCE", "255").is_ok());
        assert!(validate_setting("SATURATION_TOLERANCE", "-1").is_err());
        assert!(validate_setting("SATURATION_TOLERANCE", "abc").is_err());
    }

    #[test]
    fn test_placement_ranges() {
        assert!(validate_setting("DESIGN_WIDTH", "0").is_err());
        assert!(validate_setting("DESIGN_WIDTH", "80").is_ok());
        assert!(validate_setting("OFFSET_X", "-40").is_ok());
        assert!(validate_setting("OFFSET_Y", "99999").is_err());
    }

    #[test]
    fn test_valid_boolean() {
        assert!(validate_setting("EXTRACT_DESIGN", "true").is_ok());
        assert!(validate_setting("EXTRACT_DESIGN", "false").is_ok());
        assert!(validate_setting("EXTRACT_DESIGN", "yes").is_err());
    }
}
