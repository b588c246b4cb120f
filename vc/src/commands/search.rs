//! Search commands
//!
//! Options are layered: command line over the command's config section over
//! `[general.search]`. Query input is parsed before anything is sent.

use tracing::debug;

use super::CommandContext;
use crate::cli::SearchArgs;
use crate::client::VantageApi;
use crate::error::{ApiError, ValidationError};
use crate::output::{ContentKind, Printable};
use crate::search::{SearchQuery, SearchRequest, build_options, parse_embedding, parse_more_like_these};
use crate::util::on_not_found;

const NOT_FOUND: &str = "Collection not found.";

fn build_request(
    ctx: &CommandContext,
    section: &str,
    search: &SearchArgs,
    query: SearchQuery,
) -> Result<SearchRequest, ValidationError> {
    debug!(%section, "build_request: called");
    let defaults = ctx.config.search_defaults(section).overlay(&search.to_defaults());
    let (collection_id, options) = build_options(&defaults)?;
    Ok(SearchRequest::new(collection_id, query, options))
}

fn run_search(ctx: &CommandContext, client: &dyn VantageApi, request: SearchRequest) -> Printable {
    debug!(
        collection_id = %request.collection_id,
        endpoint = request.query.endpoint(),
        "run_search: called"
    );
    let classifier = on_not_found(NOT_FOUND);
    ctx.executor.run(
        || -> Result<_, ApiError> { Ok(client.search(&request)?.results) },
        ContentKind::List,
        Some(&classifier),
    )
}

pub fn embedding_search(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    embedding: &str,
    search: &SearchArgs,
) -> Result<Printable, ValidationError> {
    debug!("embedding_search: called");
    let embedding = parse_embedding(embedding)?;
    let request = build_request(ctx, "embedding-search", search, SearchQuery::Embedding(embedding))?;
    Ok(run_search(ctx, client, request))
}

pub fn semantic_search(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    text: String,
    search: &SearchArgs,
) -> Result<Printable, ValidationError> {
    debug!(%text, "semantic_search: called");
    let request = build_request(ctx, "semantic-search", search, SearchQuery::Semantic(text))?;
    Ok(run_search(ctx, client, request))
}

pub fn more_like_this_search(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    document_id: String,
    search: &SearchArgs,
) -> Result<Printable, ValidationError> {
    debug!(%document_id, "more_like_this_search: called");
    let request = build_request(ctx, "more-like-this-search", search, SearchQuery::MoreLikeThis(document_id))?;
    Ok(run_search(ctx, client, request))
}

pub fn more_like_these_search(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    these: &str,
    search: &SearchArgs,
) -> Result<Printable, ValidationError> {
    debug!("more_like_these_search: called");
    let items = parse_more_like_these(these)?;
    let request = build_request(ctx, "more-like-these-search", search, SearchQuery::MoreLikeThese(items))?;
    Ok(run_search(ctx, client, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockVantageApi;
    use crate::client::{SearchResult, SearchResultItem};
    use crate::commands::testing::parts;
    use crate::config::Config;
    use crate::output::Destination;
    use crate::search::{DEFAULT_ACCURACY, SearchDefaults};
    use serde_json::json;

    fn args(collection_id: Option<&str>) -> SearchArgs {
        SearchArgs {
            collection_id: collection_id.map(String::from),
            ..Default::default()
        }
    }

    fn client_with_results() -> MockVantageApi {
        MockVantageApi::new().with_search_result(SearchResult {
            request_id: Some(7),
            results: vec![
                SearchResultItem {
                    id: "doc1".to_string(),
                    score: 0.9,
                    sort_score: None,
                },
                SearchResultItem {
                    id: "doc2".to_string(),
                    score: 0.5,
                    sort_score: None,
                },
            ],
        })
    }

    #[test]
    fn test_semantic_search_returns_results_list() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = client_with_results();

        let printable = semantic_search(&ctx, &client, "shoes".to_string(), &args(Some("c1"))).unwrap();
        assert_eq!(printable.kind, ContentKind::List);
        assert_eq!(
            printable.content,
            Some(json!([
                {"id": "doc1", "score": 0.9, "sort_score": null},
                {"id": "doc2", "score": 0.5, "sort_score": null}
            ]))
        );

        let searches = client.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].collection_id, "c1");
        assert_eq!(searches[0].query, SearchQuery::Semantic("shoes".to_string()));
        assert_eq!(searches[0].options.accuracy, DEFAULT_ACCURACY);
    }

    #[test]
    fn test_missing_collection_id_is_validation_error() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let result = more_like_this_search(&ctx, &client, "doc1".to_string(), &args(None));
        assert_eq!(result, Err(ValidationError::MissingOption("--collection-id".to_string())));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_config_section_supplies_defaults() {
        let (executor, printer, _) = parts();
        let mut config = Config::default();
        config.general.search.accuracy = Some(0.5);
        config.commands.insert(
            "semantic-search".to_string(),
            SearchDefaults {
                collection_id: Some("from-config".to_string()),
                page_count: Some(20),
                ..Default::default()
            },
        );
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        semantic_search(&ctx, &client, "shoes".to_string(), &args(None)).unwrap();
        let request = &client.searches()[0];
        assert_eq!(request.collection_id, "from-config");
        assert_eq!(request.options.accuracy, 0.5);
        assert_eq!(request.options.pagination.as_ref().unwrap().count, Some(20));

        semantic_search(&ctx, &client, "shoes".to_string(), &args(Some("from-flag"))).unwrap();
        assert_eq!(client.searches()[1].collection_id, "from-flag");
    }

    #[test]
    fn test_embedding_search_rejects_bad_embedding() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let result = embedding_search(&ctx, &client, "0.1,abc", &args(Some("c1")));
        assert!(matches!(result, Err(ValidationError::Embedding(_))));
        assert!(client.calls().is_empty());

        embedding_search(&ctx, &client, "0.1, 0.2", &args(Some("c1"))).unwrap();
        assert_eq!(client.searches()[0].query, SearchQuery::Embedding(vec![0.1, 0.2]));
    }

    #[test]
    fn test_more_like_these_rejects_bad_json() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let result = more_like_these_search(&ctx, &client, "not json", &args(Some("c1")));
        assert!(matches!(result, Err(ValidationError::MoreLikeThese(_))));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_more_like_these_search() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        more_like_these_search(
            &ctx,
            &client,
            r#"[{"text": "red shoes", "weight": 1.0}, {"query_text": "boots", "weight": 0.5}]"#,
            &args(Some("c1")),
        )
        .unwrap();
        assert_eq!(client.calls(), vec!["search:more-like-these"]);
    }

    #[test]
    fn test_search_not_found() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::failing(ApiError::NotFound(String::new()));

        let printable = semantic_search(&ctx, &client, "shoes".to_string(), &args(Some("c1"))).unwrap();
        assert_eq!(printable.destination, Destination::Stderr);
        assert_eq!(printable, Printable::error("Collection not found."));
    }
}
