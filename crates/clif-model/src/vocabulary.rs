//! CLIF category values the waterfall repairs and defaults depend on.

/// Invasive mechanical ventilation device category.
pub const DEVICE_IMV: &str = "imv";
/// Device name assigned when a row is promoted to [`DEVICE_IMV`].
pub const MECHANICAL_VENTILATOR: &str = "mechanical ventilator";
/// Non-invasive positive pressure ventilation.
pub const DEVICE_NIPPV: &str = "nippv";
pub const DEVICE_ROOM_AIR: &str = "room air";
/// Mode category assumed for T-piece trials with no recorded mode.
pub const MODE_BLOW_BY: &str = "blow by";
/// Device name fragment identifying T-piece trials.
pub const T_PIECE: &str = "t-piece";

/// FiO2 of room air.
pub const ROOM_AIR_FIO2: f64 = 0.21;

/// Mode category fragments that only occur on invasive ventilators.
pub const IMV_MODE_PATTERNS: &[&str] = &[
    "assist control-volume control",
    "simv",
    "pressure control",
];

/// Returns true if a mode category names an invasive-ventilation mode.
///
/// Matching is a case-insensitive substring test.
pub fn is_imv_mode(mode_category: &str) -> bool {
    let lowered = mode_category.to_ascii_lowercase();
    IMV_MODE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// Returns true if a device name describes a T-piece.
pub fn is_t_piece(device_name: &str) -> bool {
    device_name.to_ascii_lowercase().contains(T_PIECE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imv_modes_match_case_insensitively() {
        assert!(is_imv_mode("Assist Control-Volume Control"));
        assert!(is_imv_mode("simv"));
        assert!(is_imv_mode("pressure control"));
        assert!(is_imv_mode("Pressure Control/PRVC"));
        assert!(!is_imv_mode("pressure support/cpap"));
        assert!(!is_imv_mode("blow by"));
    }

    #[test]
    fn t_piece_detection() {
        assert!(is_t_piece("T-Piece"));
        assert!(is_t_piece("trach collar / t-piece"));
        assert!(!is_t_piece("nasal cannula"));
    }
}
