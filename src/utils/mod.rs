#[cfg(target_os = "dragonfly")]
pub(crate) mod bindings;
