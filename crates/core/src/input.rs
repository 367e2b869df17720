use serde::{Deserialize, Serialize};

/// Discrete input, queued by the host and drained at the start of the next frame.
///
/// Coordinates are screen pixels relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel { delta_y: f64, x: f64, y: f64 },
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerLeave,
    DragMove { dx: f64, dy: f64 },
    Resize { width: f64, height: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_a_type_tag() {
        let json = serde_json::to_string(&InputEvent::PointerMove { x: 1.0, y: 2.0 });
        assert_eq!(
            json.unwrap_or_default(),
            r#"{"type":"pointer_move","x":1.0,"y":2.0}"#
        );
        let parsed: Result<InputEvent, _> =
            serde_json::from_str(r#"{"type":"wheel","delta_y":-3,"x":10,"y":20}"#);
        assert!(matches!(
            parsed,
            Ok(InputEvent::Wheel { delta_y, .. }) if delta_y == -3.0
        ));
        let parsed: Result<InputEvent, _> = serde_json::from_str(r#"{"type":"pointer_up"}"#);
        assert!(matches!(parsed, Ok(InputEvent::PointerUp)));
    }
}
