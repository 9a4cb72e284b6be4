use crate::utils::text_utils;

// Client-side protocol state, kept as plain state machines
// so the reader binary and the tests can drive them without
// any HTTP involved. The caller owns the actual fetching:
// begin_load hands out the page number to request, the
// outcome comes back through complete_load or fail_load.

// Incremental "load more" listing. Page 1 arrives with the
// initial page data (items + total from the server-side
// fan-out fetch), later pages get appended in the order the
// server returned them. Nothing is de-duplicated and the
// total is never re-fetched: if articles get published
// mid-session the boundary can be stale. Accepted
// limitation.
pub struct ArticleFeed<T> {
  items: Vec<T>,
  page: usize,
  total: usize,
  per_page: usize,
  loading: bool
}

impl<T> ArticleFeed<T> {

  pub fn new(initial_items: Vec<T>, total: usize, per_page: usize) -> Self {
    Self {
      items: initial_items,
      page: 1,
      total,
      per_page,
      loading: false
    }
  }

  pub fn has_more(&self) -> bool {
    self.items.len() < self.total
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn per_page(&self) -> usize {
    self.per_page
  }

  // Returns the page to fetch, or None when the control is
  // inert (everything loaded) or a load is already in
  // flight. Triggering twice before completing is a no-op,
  // that's the reentrancy guard.
  pub fn begin_load(&mut self) -> Option<usize> {
    if !self.has_more() || self.loading {
      return None;
    }
    self.loading = true;
    Some(self.page + 1)
  }

  pub fn complete_load(&mut self, batch: Vec<T>) {
    self.loading = false;
    self.page += 1;
    self.items.extend(batch);
  }

  // Failed loads leave everything as it was; the user may
  // simply trigger again. No automatic retry.
  pub fn fail_load(&mut self) {
    self.loading = false;
  }

}

// Search page state. "Never searched" and "searched with
// zero results" are two different presented states, hence
// the explicit searched flag next to the result list.
pub struct SearchFlow<T> {
  query: String,
  results: Vec<T>,
  loading: bool,
  searched: bool
}

impl<T> SearchFlow<T> {

  pub fn new() -> Self {
    Self {
      query: String::new(),
      results: Vec::new(),
      loading: false,
      searched: false
    }
  }

  // Trims the input; blank submissions are a no-op and
  // return None so the caller issues no request at all.
  pub fn submit(&mut self, text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
      return None;
    }
    self.query = trimmed.to_string();
    self.loading = true;
    Some(self.query.clone())
  }

  pub fn complete(&mut self, results: Vec<T>) {
    self.results = results;
    self.loading = false;
    self.searched = true;
  }

  // Errors just clear the loading flag, previous results
  // stay visible.
  pub fn fail(&mut self) {
    self.loading = false;
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn results(&self) -> &[T] {
    &self.results
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn has_searched(&self) -> bool {
    self.searched
  }

  pub fn is_empty_result(&self) -> bool {
    self.searched && self.results.is_empty()
  }

}

// Local draft state of the admin authoring form. The slug
// follows the title until it gets set by hand; editing the
// title again regenerates it, like the original form.
#[derive(Debug, Default)]
pub struct ArticleDraft {
  pub title: String,
  pub slug: String,
  pub excerpt: String,
  pub content: String,
  pub category_id: Option<i32>,
  pub featured_image: String,
  pub is_featured: bool,
  selected_tags: Vec<i32>
}

impl ArticleDraft {

  pub fn set_title(&mut self, title: &str) {
    self.title = title.to_string();
    self.slug = text_utils::slugify(title);
  }

  pub fn set_slug(&mut self, slug: &str) {
    self.slug = slug.to_string();
  }

  // Multi-select semantics: toggling flips membership.
  pub fn toggle_tag(&mut self, tag_id: i32) {
    match self.selected_tags.iter().position(|id| *id == tag_id) {
      Some(index) => { self.selected_tags.remove(index); },
      None => self.selected_tags.push(tag_id)
    }
  }

  pub fn selected_tags(&self) -> &[i32] {
    &self.selected_tags
  }

}

#[cfg(test)]
mod tests {
  use super::*;

  fn seeded_feed() -> ArticleFeed<i32> {
    // 3 of 7 items loaded, 3 per page:
    ArticleFeed::new(vec![1, 2, 3], 7, 3)
  }

  #[test]
  fn load_more_requests_the_next_page() {
    let mut feed = seeded_feed();
    assert!(feed.has_more());
    assert_eq!(feed.begin_load(), Some(2));
    feed.complete_load(vec![4, 5, 6]);
    assert_eq!(feed.page(), 2);
    assert_eq!(feed.items(), &[1, 2, 3, 4, 5, 6]);
    assert_eq!(feed.begin_load(), Some(3));
  }

  #[test]
  fn second_trigger_while_loading_is_a_noop() {
    let mut feed = seeded_feed();
    assert_eq!(feed.begin_load(), Some(2));
    // Still in flight:
    assert_eq!(feed.begin_load(), None);
    feed.complete_load(vec![4, 5, 6]);
    assert_eq!(feed.begin_load(), Some(3));
  }

  #[test]
  fn feed_goes_inert_the_moment_everything_is_loaded() {
    let mut feed = seeded_feed();
    feed.begin_load();
    feed.complete_load(vec![4, 5, 6]);
    feed.begin_load();
    feed.complete_load(vec![7]);
    assert!(!feed.has_more());
    // Inert no matter how many times it gets triggered:
    assert_eq!(feed.begin_load(), None);
    assert_eq!(feed.begin_load(), None);
    assert_eq!(feed.items().len(), 7);
  }

  #[test]
  fn failed_load_leaves_state_unchanged_and_retryable() {
    let mut feed = seeded_feed();
    assert_eq!(feed.begin_load(), Some(2));
    feed.fail_load();
    assert_eq!(feed.items(), &[1, 2, 3]);
    assert_eq!(feed.page(), 1);
    // Retrying asks for the same page again:
    assert_eq!(feed.begin_load(), Some(2));
  }

  #[test]
  fn batches_are_appended_in_returned_order() {
    let mut feed = ArticleFeed::new(vec![10], 5, 2);
    feed.begin_load();
    feed.complete_load(vec![30, 20]);
    assert_eq!(feed.items(), &[10, 30, 20]);
  }

  #[test]
  fn feed_with_everything_on_page_one_never_loads() {
    let mut feed = ArticleFeed::new(vec![1, 2], 2, 9);
    assert!(!feed.has_more());
    assert_eq!(feed.begin_load(), None);
  }

  #[test]
  fn blank_search_submission_is_a_noop() {
    let mut flow: SearchFlow<i32> = SearchFlow::new();
    assert_eq!(flow.submit("   "), None);
    assert_eq!(flow.submit(""), None);
    assert!(!flow.is_loading());
    assert!(!flow.has_searched());
  }

  #[test]
  fn search_trims_and_tracks_the_three_ui_states() {
    let mut flow: SearchFlow<i32> = SearchFlow::new();
    // Never searched is not the same as zero results:
    assert!(!flow.is_empty_result());
    assert_eq!(flow.submit("  rust  "), Some("rust".to_string()));
    assert!(flow.is_loading());
    flow.complete(Vec::new());
    assert!(!flow.is_loading());
    assert!(flow.has_searched());
    assert!(flow.is_empty_result());
    // And with results:
    flow.submit("rust");
    flow.complete(vec![1, 2]);
    assert_eq!(flow.results(), &[1, 2]);
    assert!(!flow.is_empty_result());
  }

  #[test]
  fn failed_search_keeps_previous_results() {
    let mut flow: SearchFlow<i32> = SearchFlow::new();
    flow.submit("rust");
    flow.complete(vec![1]);
    flow.submit("go");
    flow.fail();
    assert!(!flow.is_loading());
    assert_eq!(flow.results(), &[1]);
  }

  #[test]
  fn draft_slug_follows_the_title() {
    let mut draft = ArticleDraft::default();
    draft.set_title("Hello, World! 2024");
    assert_eq!(draft.slug, "hello-world-2024");
  }

  #[test]
  fn manual_slug_survives_until_the_next_title_edit() {
    let mut draft = ArticleDraft::default();
    draft.set_title("Some Title");
    draft.set_slug("my-own-slug");
    assert_eq!(draft.slug, "my-own-slug");
    draft.set_title("Some Title Again");
    assert_eq!(draft.slug, "some-title-again");
  }

  #[test]
  fn tag_toggle_flips_membership() {
    let mut draft = ArticleDraft::default();
    draft.toggle_tag(3);
    draft.toggle_tag(7);
    assert_eq!(draft.selected_tags(), &[3, 7]);
    draft.toggle_tag(3);
    assert_eq!(draft.selected_tags(), &[7]);
  }
}
