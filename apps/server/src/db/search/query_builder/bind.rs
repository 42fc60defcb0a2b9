use uuid::Uuid;

use super::BindValue;

pub(super) fn push_text(bind_params: &mut Vec<BindValue>, value: String) -> usize {
    bind_params.push(BindValue::Text(value));
    bind_params.len()
}

pub(super) fn push_uuid_array(bind_params: &mut Vec<BindValue>, value: Vec<Uuid>) -> usize {
    bind_params.push(BindValue::UuidArray(value));
    bind_params.len()
}
