use super::path::FieldPath;
use super::state::FormState;
use crate::core::schema::{ConfigField, WorkflowConfig};
use serde_json::Value;
use tracing::{debug, warn};

/// Build editable form state from a workflow config.
///
/// Every ConfigField becomes exactly one leaf. Absent values render as the
/// type's initial value; malformed ones are coerced to it with a warning.
pub fn config_to_form(config: &WorkflowConfig) -> FormState {
    let mut state = FormState::new();
    let slots = config.field_slots();
    for slot in &slots {
        state.set(&slot.path, coerce_value(&slot.path, slot.field, slot.field.value.as_ref()));
    }
    debug!(fields = slots.len(), "mapped workflow config to form state");
    state
}

/// Reconcile form values back into a copy of `base`.
///
/// Optional fields left empty are dropped, except map arrays which persist as
/// explicit empty arrays. Required fields always carry a value.
pub fn form_to_config(base: &WorkflowConfig, state: &FormState) -> WorkflowConfig {
    let mut config = base.clone();
    let mut omitted = 0usize;
    for slot in config.field_slots_mut() {
        let value = coerce_value(&slot.path, slot.field, state.get(&slot.path));
        if slot.optional && should_omit(slot.field, &value) {
            slot.field.value = None;
            omitted += 1;
        } else {
            slot.field.value = Some(value);
        }
    }
    debug!(omitted, "reconciled form state into workflow config");
    config
}

/// The value a leaf should hold for `field`, falling back to the initial value.
pub fn coerce_value(path: &FieldPath, field: &ConfigField, raw: Option<&Value>) -> Value {
    match raw {
        Some(value) if field.field_type.accepts(value) => value.clone(),
        None | Some(Value::Null) => field.field_type.initial_value(),
        Some(value) => {
            warn!(
                path = %path,
                field_type = %field.field_type,
                found = %value,
                "coercing malformed field value to its initial value"
            );
            field.field_type.initial_value()
        }
    }
}

// `field` still carries the value it had before the form was applied.
fn should_omit(field: &ConfigField, value: &Value) -> bool {
    let field_type = field.field_type;
    if field_type.is_map_array() {
        return false;
    }
    if field_type.is_empty_value(value) {
        return true;
    }
    field.value.is_none() && *value == field_type.initial_value()
}
