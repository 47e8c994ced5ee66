/// Module names match `^[A-Za-z0-9_]+$`, which also keeps them usable as a
/// single path component.
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
