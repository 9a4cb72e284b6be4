// Empty string to None in the DTO conversions, done with
// a plain old function rather than a custom deserializer.
// Mostly useful for optional fields the authoring form
// submits as "".
pub fn empty_string_to_none(value: Option<String>) -> Option<String> {
  match value {
    Some(s) => if s.trim().is_empty()
      { None } else { Some(s) },
    None => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_and_blank_become_none() {
    assert_eq!(empty_string_to_none(Some(String::new())), None);
    assert_eq!(empty_string_to_none(Some("   ".to_string())), None);
    assert_eq!(
      empty_string_to_none(Some("value".to_string())),
      Some("value".to_string())
    );
    assert_eq!(empty_string_to_none(None), None);
  }
}
