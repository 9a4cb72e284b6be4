use regex::Regex;
use lazy_static::lazy_static;

// Slug derivation used by the authoring form model and
// as a server-side fallback when an article payload has
// no slug: lowercase, strip everything that isn't a word
// character or whitespace, then collapse whitespace runs
// into single hyphens.
pub fn slugify(title: &str) -> String {
  // Since there's no way to define a const that uses
  // the heap, we need that weird lazy_static crate.
  lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
  }
  let lowered = title.to_lowercase();
  let stripped = NON_WORD.replace_all(&lowered, "");
  SPACES.replace_all(stripped.trim(), "-").to_string()
}

// Counts characters and not bytes, which is what the
// length caps from the validation rules are about.
pub fn char_count(value: &str) -> usize {
  value.chars().count()
}
