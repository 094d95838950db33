//! Browser event conversion.

use lineal_editor_core::{InputEvent, InputType};

/// Get data from a beforeinput event, handling different sources.
pub fn get_data_from_event(event: &web_sys::InputEvent) -> Option<String> {
    // First try the data property.
    if let Some(data) = event.data() {
        if !data.is_empty() {
            return Some(data);
        }
    }

    // For paste/drop, try dataTransfer.
    let text = event.data_transfer()?.get_data("text/plain").ok()?;
    if text.is_empty() { None } else { Some(text) }
}

/// Check if the beforeinput event is during IME composition.
pub fn is_composing(event: &web_sys::InputEvent) -> bool {
    event.is_composing()
}

/// Convert a DOM `beforeinput` event into the core representation.
pub fn input_event_from_dom(event: &web_sys::InputEvent) -> InputEvent {
    let input_type = InputType::from_input_type(&event.input_type());
    let data = get_data_from_event(event);
    tracing::trace!(target: "lineal::events", ?input_type, has_data = data.is_some(), "beforeinput");
    InputEvent::new(input_type, data)
}
