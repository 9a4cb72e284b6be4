use serde_json::{json, Value};

// Query building for the content store. The store speaks a
// declarative filter language (GROQ); everything here only
// assembles strings and a parameter list, execution lives
// in the gateway.

// Projection shared by every article query so the various
// read paths all return the same document shape:
const ARTICLE_PROJECTION: &str =
  "{_id, title, \"slug\": slug.current, excerpt, mainImage, \
   publishedAt, readTime, category->{title, \"slug\": slug.current}, \
   author->{name, image}}";

// Same thing with the full body, for the detail page:
const ARTICLE_DETAIL_PROJECTION: &str =
  "{_id, title, \"slug\": slug.current, excerpt, body, mainImage, \
   publishedAt, readTime, isFeatured, tags, \
   category->{title, \"slug\": slug.current}, \
   author->{name, image, bio}}";

const CATEGORY_PROJECTION: &str =
  "{_id, title, \"slug\": slug.current, description}";

// What a query is about. The fallback provider picks its
// substitute data based on this instead of pattern-matching
// the query text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryIntent {
  FeaturedArticle,
  LatestArticles,
  ArticleList,
  ArticleCount,
  Article,
  CategoryList,
  Category,
  Search
}

// A fully assembled query: the GROQ string plus its named
// parameters, tagged with an intent.
#[derive(Debug)]
pub struct ContentQuery {
  pub intent: QueryIntent,
  pub groq: String,
  pub params: Vec<(String, Value)>
}

// The recognized article filters. All optional; only the
// supplied ones end up in the predicate.
#[derive(Debug, Default, Clone)]
pub struct ArticleFilters {
  pub category: Option<String>,
  pub tag: Option<String>,
  pub author: Option<String>,
  pub search: Option<String>
}

impl ArticleFilters {

  // Base predicate ANDed with exactly the supplied filters.
  // Returns the predicate string and the parameters it
  // references.
  fn predicate(&self) -> (String, Vec<(String, Value)>) {
    let mut predicate = String::from("_type == \"article\"");
    let mut params: Vec<(String, Value)> = Vec::new();

    if let Some(category) = &self.category {
      predicate.push_str(
        " && category._ref in *[_type==\"category\" \
        && slug.current==$category]._id"
      );
      params.push(("category".to_string(), json!(category)));
    }
    if let Some(tag) = &self.tag {
      predicate.push_str(" && $tag in tags");
      params.push(("tag".to_string(), json!(tag)));
    }
    if let Some(author) = &self.author {
      predicate.push_str(
        " && author._ref in *[_type==\"author\" \
        && slug.current==$author]._id"
      );
      params.push(("author".to_string(), json!(author)));
    }
    if let Some(search) = &self.search {
      predicate.push_str(
        " && (title match $search || excerpt match $search)"
      );
      // The store does wildcard matching, so wrap the text:
      params.push(("search".to_string(), json!(format!("*{}*", search))));
    }

    (predicate, params)
  }

}

// 1-based page plus page size. Malformed or missing values
// fall back to the defaults, they never become an error.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
  pub page: usize,
  pub limit: usize
}

impl PageParams {

  pub fn from_raw(
    page: Option<&str>,
    limit: Option<&str>,
    default_limit: usize
  ) -> Self {
    Self {
      page: parse_or(page, 1),
      limit: parse_or(limit, default_limit)
    }
  }

  pub fn offset(&self) -> usize {
    self.page.saturating_sub(1).saturating_mul(self.limit)
  }

}

// Values above this are nonsense input, the offset math
// must never overflow:
const MAX_PAGE_VALUE: usize = 100_000;

fn parse_or(raw: Option<&str>, default: usize) -> usize {
  raw
    .and_then(|v| v.parse::<usize>().ok())
    .filter(|v| (1..=MAX_PAGE_VALUE).contains(v))
    .unwrap_or(default)
}

pub fn article_list(filters: &ArticleFilters, page: &PageParams) -> ContentQuery {
  let (predicate, params) = filters.predicate();
  ContentQuery {
    intent: QueryIntent::ArticleList,
    groq: format!(
      "*[{}] | order(publishedAt desc) [{}...{}] {}",
      predicate,
      page.offset(),
      page.offset().saturating_add(page.limit),
      ARTICLE_PROJECTION
    ),
    params
  }
}

pub fn article_count(filters: &ArticleFilters) -> ContentQuery {
  let (predicate, params) = filters.predicate();
  ContentQuery {
    intent: QueryIntent::ArticleCount,
    groq: format!("count(*[{}])", predicate),
    params
  }
}

pub fn featured_article() -> ContentQuery {
  ContentQuery {
    intent: QueryIntent::FeaturedArticle,
    groq: format!(
      "*[_type == \"article\" && isFeatured == true] \
      | order(publishedAt desc)[0] {}",
      ARTICLE_PROJECTION
    ),
    params: Vec::new()
  }
}

// The featured article gets its own slot on the home page
// and is excluded from the latest list.
pub fn latest_articles(limit: usize) -> ContentQuery {
  ContentQuery {
    intent: QueryIntent::LatestArticles,
    groq: format!(
      "*[_type == \"article\" && isFeatured != true] \
      | order(publishedAt desc) [0...{}] {}",
      limit,
      ARTICLE_PROJECTION
    ),
    params: Vec::new()
  }
}

pub fn article_by_slug(slug: &str) -> ContentQuery {
  ContentQuery {
    intent: QueryIntent::Article,
    groq: format!(
      "*[_type == \"article\" && slug.current == $slug][0] {}",
      ARTICLE_DETAIL_PROJECTION
    ),
    params: vec![("slug".to_string(), json!(slug))]
  }
}

pub fn category_list() -> ContentQuery {
  ContentQuery {
    intent: QueryIntent::CategoryList,
    groq: format!(
      "*[_type == \"category\"] | order(title asc) {}",
      CATEGORY_PROJECTION
    ),
    params: Vec::new()
  }
}

pub fn category_by_slug(slug: &str) -> ContentQuery {
  ContentQuery {
    intent: QueryIntent::Category,
    groq: format!(
      "*[_type == \"category\" && slug.current == $slug][0] {}",
      CATEGORY_PROJECTION
    ),
    params: vec![("slug".to_string(), json!(slug))]
  }
}

// Dedicated search flow: free text against title, excerpt
// and the full body text, capped, no pagination.
pub fn search(text: &str, max_results: usize) -> ContentQuery {
  ContentQuery {
    intent: QueryIntent::Search,
    groq: format!(
      "*[_type == \"article\" && (title match $query \
      || excerpt match $query || pt::text(body) match $query)] \
      | order(publishedAt desc) [0...{}] {}",
      max_results,
      ARTICLE_PROJECTION
    ),
    params: vec![("query".to_string(), json!(format!("*{}*", text)))]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn param_names(query: &ContentQuery) -> Vec<&str> {
    query.params.iter().map(|(n, _)| n.as_str()).collect()
  }

  #[test]
  fn offset_is_page_minus_one_times_limit() {
    let page = PageParams { page: 2, limit: 9 };
    assert_eq!(page.offset(), 9);
    let query = article_list(&ArticleFilters::default(), &page);
    // Page 2 with limit 9 requests items 9 to 18:
    assert!(query.groq.contains("[9...18]"));
  }

  #[test]
  fn first_page_starts_at_zero() {
    let page = PageParams { page: 1, limit: 10 };
    assert_eq!(page.offset(), 0);
  }

  #[test]
  fn malformed_page_and_limit_fall_back_to_defaults() {
    let page = PageParams::from_raw(Some("banana"), Some("-3"), 9);
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 9);
    let page = PageParams::from_raw(None, Some("0"), 9);
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 9);
  }

  #[test]
  fn huge_page_numbers_fall_back_instead_of_overflowing() {
    // usize::MAX parses fine but would overflow the offset
    // multiplication, it has to be treated like any other
    // bad input:
    let page = PageParams::from_raw(
      Some("18446744073709551615"),
      Some("18446744073709551615"),
      9
    );
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 9);
    // And a directly constructed out-of-range value still
    // produces a query rather than a panic:
    let page = PageParams { page: usize::MAX, limit: usize::MAX };
    let query = article_list(&ArticleFilters::default(), &page);
    assert_eq!(page.offset(), usize::MAX);
    assert!(query.groq.contains("| order(publishedAt desc)"));
  }

  #[test]
  fn predicate_only_contains_supplied_filters() {
    let filters = ArticleFilters {
      category: Some("ai".to_string()),
      ..Default::default()
    };
    let query = article_list(&filters, &PageParams { page: 1, limit: 9 });
    assert!(query.groq.contains("slug.current==$category"));
    assert!(!query.groq.contains("$tag"));
    assert!(!query.groq.contains("$author"));
    assert!(!query.groq.contains("$search"));
    assert_eq!(param_names(&query), vec!["category"]);
  }

  #[test]
  fn all_filters_are_anded_together() {
    let filters = ArticleFilters {
      category: Some("ai".to_string()),
      tag: Some("rust".to_string()),
      author: Some("jane".to_string()),
      search: Some("llm".to_string())
    };
    let query = article_list(&filters, &PageParams { page: 1, limit: 9 });
    assert_eq!(query.groq.matches(" && ").count() >= 4, true);
    assert_eq!(
      param_names(&query),
      vec!["category", "tag", "author", "search"]
    );
    // Search text gets wrapped for wildcard matching:
    assert_eq!(query.params[3].1, serde_json::json!("*llm*"));
  }

  #[test]
  fn list_and_count_share_the_same_predicate() {
    let filters = ArticleFilters {
      tag: Some("webdev".to_string()),
      ..Default::default()
    };
    let list = article_list(&filters, &PageParams { page: 1, limit: 9 });
    let count = article_count(&filters);
    assert!(count.groq.starts_with("count(*["));
    assert!(count.groq.contains("$tag in tags"));
    assert!(list.groq.contains("$tag in tags"));
    // The count query has no slice or ordering:
    assert!(!count.groq.contains("order("));
    assert!(!count.groq.contains("..."));
  }

  #[test]
  fn lists_are_ordered_newest_first() {
    let query = article_list(
      &ArticleFilters::default(),
      &PageParams { page: 1, limit: 9 }
    );
    assert!(query.groq.contains("| order(publishedAt desc)"));
  }

  #[test]
  fn search_is_capped_and_matches_body_text() {
    let query = search("quantum", 12);
    assert!(query.groq.contains("[0...12]"));
    assert!(query.groq.contains("pt::text(body) match $query"));
    assert_eq!(query.params[0].1, serde_json::json!("*quantum*"));
    assert_eq!(query.intent, QueryIntent::Search);
  }

  #[test]
  fn intents_are_carried_by_the_queries() {
    assert_eq!(featured_article().intent, QueryIntent::FeaturedArticle);
    assert_eq!(latest_articles(6).intent, QueryIntent::LatestArticles);
    assert_eq!(category_list().intent, QueryIntent::CategoryList);
    assert_eq!(article_by_slug("abc").intent, QueryIntent::Article);
  }
}
