pub mod serde_utils;
pub mod text_utils;
pub mod time_utils;

// SQLite has no boolean type so everything boolean
// is an integer in the entities. These two functions
// do the conversion at the DTO boundary.
pub fn option_bool_to_i32(value: Option<bool>) -> i32 {
  match value {
    Some(true) => 1,
    _ => 0
  }
}

pub fn i32_to_bool(value: i32) -> bool {
  value != 0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bool_conversions() {
    assert_eq!(option_bool_to_i32(Some(true)), 1);
    assert_eq!(option_bool_to_i32(Some(false)), 0);
    assert_eq!(option_bool_to_i32(None), 0);
    assert!(i32_to_bool(1));
    assert!(!i32_to_bool(0));
  }
}
