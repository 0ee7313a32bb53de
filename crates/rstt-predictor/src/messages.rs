//! Condensing engine errors into per-request diagnostics.

use rstt_engine::EngineError;

/// Engine diagnostics reported verbatim when they appear in a longer message.
pub const KNOWN_DIAGNOSTICS: [&str; 3] = [
    "c*H is greater than ch_max",
    "Source-receiver separation exceeds maximum value",
    "Source depth exceeds maximum value",
];

pub fn condense(message: &str) -> String {
    KNOWN_DIAGNOSTICS
        .iter()
        .find(|known| message.contains(*known))
        .map(|known| known.to_string())
        .unwrap_or_else(|| message.to_string())
}

/// Failure text for an engine error raised while predicting.
pub fn failure_message(error: &EngineError) -> String {
    condense(&error.detail())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_diagnostics_are_condensed() {
        let raw = "GreatCircle::GreatCircle: ERROR in file GreatCircle.cc line 412\n\
                   Source depth exceeds maximum value (depth=720.0, max=200.0)";
        assert_eq!(condense(raw), "Source depth exceeds maximum value");

        let error = EngineError::call(
            "createGreatCircle",
            "c*H is greater than ch_max: 0.31 > 0.2",
        );
        assert_eq!(failure_message(&error), "c*H is greater than ch_max");
    }

    #[test]
    fn test_unknown_messages_pass_through() {
        let error = EngineError::call("getTravelTime", "Phase Xn is not supported");
        assert_eq!(failure_message(&error), "Phase Xn is not supported");
    }
}
