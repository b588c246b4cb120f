//! Search requests and their options
//!
//! Options come from three layers (flags, the per-command config section,
//! `[general.search]`) merged into one [`SearchDefaults`] before
//! [`build_options`] turns them into a request.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ValidationError;

/// Accuracy used when no layer sets one
pub const DEFAULT_ACCURACY: f32 = 0.3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ValidationError::SearchOption(format!(
                "sort order must be asc or desc, got '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Semantic,
    Field,
    Compound,
}

impl FromStr for SortMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "field" => Ok(Self::Field),
            "compound" => Ok(Self::Compound),
            _ => Err(ValidationError::SearchOption(format!(
                "sort mode must be semantic, field or compound, got '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
    pub mode: SortMode,
}

/// One `FIELD:VALUE:WEIGHT` boost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedFieldValue {
    pub field: String,
    pub value: String,
    pub weight: f32,
}

impl FromStr for WeightedFieldValue {
    type Err = ValidationError;

    /// The value may itself contain colons; field and weight may not
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ValidationError::SearchOption(format!(
                "weighted field value must look like FIELD:VALUE:WEIGHT, got '{}'",
                s
            ))
        };

        let (field, rest) = s.split_once(':').ok_or_else(invalid)?;
        let (value, weight) = rest.rsplit_once(':').ok_or_else(invalid)?;
        if field.is_empty() || value.is_empty() {
            return Err(invalid());
        }
        let weight: f32 = weight.trim().parse().map_err(|_| invalid())?;

        Ok(Self {
            field: field.to_string(),
            value: value.to_string(),
            weight,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValueWeighting {
    #[serde(rename = "query_key_word_weighting_mode", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(rename = "query_key_word_max_overall_weight", skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub weighted_field_values: Vec<WeightedFieldValue>,
}

/// Options shared by every search kind
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub accuracy: f32,
    pub boolean_filter: Option<String>,
    pub pagination: Option<Pagination>,
    pub sort: Option<Sort>,
    pub weighting: Option<FieldValueWeighting>,
}

/// Unresolved search options from one layer
///
/// Also the shape of `[general.search]` and per-command config sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_max: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub weighted_field_values: Vec<String>,
}

impl SearchDefaults {
    /// Layer `higher` over `self`; set fields in `higher` win
    pub fn overlay(self, higher: &SearchDefaults) -> SearchDefaults {
        let higher = higher.clone();
        SearchDefaults {
            collection_id: higher.collection_id.or(self.collection_id),
            accuracy: higher.accuracy.or(self.accuracy),
            page: higher.page.or(self.page),
            page_count: higher.page_count.or(self.page_count),
            page_threshold: higher.page_threshold.or(self.page_threshold),
            boolean_filter: higher.boolean_filter.or(self.boolean_filter),
            sort_field: higher.sort_field.or(self.sort_field),
            sort_order: higher.sort_order.or(self.sort_order),
            sort_mode: higher.sort_mode.or(self.sort_mode),
            weight_mode: higher.weight_mode.or(self.weight_mode),
            weight_max: higher.weight_max.or(self.weight_max),
            weighted_field_values: if higher.weighted_field_values.is_empty() {
                self.weighted_field_values
            } else {
                higher.weighted_field_values
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == SearchDefaults::default()
    }
}

/// Resolve merged options into a collection id and request options
pub fn build_options(defaults: &SearchDefaults) -> Result<(String, SearchOptions), ValidationError> {
    debug!(?defaults, "build_options: called");
    let collection_id = defaults
        .collection_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ValidationError::MissingOption("--collection-id".to_string()))?
        .to_string();

    let pagination = if defaults.page.is_some() || defaults.page_count.is_some() || defaults.page_threshold.is_some() {
        debug!("build_options: pagination set");
        Some(Pagination {
            page: defaults.page,
            count: defaults.page_count,
            threshold: defaults.page_threshold,
        })
    } else {
        None
    };

    let sort = match &defaults.sort_field {
        Some(field) => {
            debug!(%field, "build_options: sort set");
            Some(Sort {
                field: field.clone(),
                order: defaults.sort_order.as_deref().map(SortOrder::from_str).transpose()?.unwrap_or_default(),
                mode: defaults.sort_mode.as_deref().map(SortMode::from_str).transpose()?.unwrap_or_default(),
            })
        }
        None => None,
    };

    let weighted_field_values = defaults
        .weighted_field_values
        .iter()
        .map(|v| v.parse::<WeightedFieldValue>())
        .collect::<Result<Vec<_>, _>>()?;
    let weighting =
        if defaults.weight_mode.is_some() || defaults.weight_max.is_some() || !weighted_field_values.is_empty() {
            debug!("build_options: field value weighting set");
            Some(FieldValueWeighting {
                mode: defaults.weight_mode.clone(),
                max_weight: defaults.weight_max,
                weighted_field_values,
            })
        } else {
            None
        };

    let options = SearchOptions {
        accuracy: defaults.accuracy.unwrap_or(DEFAULT_ACCURACY),
        boolean_filter: defaults.boolean_filter.clone().filter(|f| !f.trim().is_empty()),
        pagination,
        sort,
        weighting,
    };
    Ok((collection_id, options))
}

/// One weighted text in a more-like-these search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoreLikeTheseItem {
    #[serde(alias = "text")]
    pub query_text: String,
    pub weight: f32,
}

/// Parse `[{"text": "...", "weight": 1.0}, ...]`
pub fn parse_more_like_these(input: &str) -> Result<Vec<MoreLikeTheseItem>, ValidationError> {
    debug!(len = input.len(), "parse_more_like_these: called");
    let items: Vec<MoreLikeTheseItem> =
        serde_json::from_str(input).map_err(|e| ValidationError::MoreLikeThese(e.to_string()))?;
    if items.is_empty() {
        return Err(ValidationError::MoreLikeThese("at least one item is required".to_string()));
    }
    Ok(items)
}

/// Parse an embedding given as `0.1,0.2,...` or as a JSON array
pub fn parse_embedding(input: &str) -> Result<Vec<f32>, ValidationError> {
    debug!(len = input.len(), "parse_embedding: called");
    let input = input.trim();
    let embedding: Vec<f32> = if input.starts_with('[') {
        serde_json::from_str(input).map_err(|e| ValidationError::Embedding(e.to_string()))?
    } else {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f32>()
                    .map_err(|_| ValidationError::Embedding(format!("'{}' is not a number", s)))
            })
            .collect::<Result<_, _>>()?
    };

    if embedding.is_empty() {
        return Err(ValidationError::Embedding("embedding is empty".to_string()));
    }
    Ok(embedding)
}

/// What to search by
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    Embedding(Vec<f32>),
    Semantic(String),
    MoreLikeThis(String),
    MoreLikeThese(Vec<MoreLikeTheseItem>),
}

impl SearchQuery {
    /// Path segment under `/v1/search/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Embedding(_) => "embedding",
            Self::Semantic(_) => "semantic",
            Self::MoreLikeThis(_) => "more-like-this",
            Self::MoreLikeThese(_) => "more-like-these",
        }
    }
}

/// A complete search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub collection_id: String,
    pub query: SearchQuery,
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn new(collection_id: String, query: SearchQuery, options: SearchOptions) -> Self {
        Self {
            collection_id,
            query,
            options,
        }
    }

    /// Request body; unset option groups are omitted
    pub fn to_body(&self, account_id: &str) -> Value {
        debug!(endpoint = self.query.endpoint(), "to_body: called");
        let mut body = json!({
            "collection": {
                "account_id": account_id,
                "collection_id": self.collection_id,
                "accuracy": self.options.accuracy,
            }
        });

        match &self.query {
            SearchQuery::Embedding(embedding) => body["embedding"] = json!(embedding),
            SearchQuery::Semantic(text) => body["text"] = json!(text),
            SearchQuery::MoreLikeThis(document_id) => body["document_id"] = json!(document_id),
            SearchQuery::MoreLikeThese(items) => body["these"] = json!(items),
        }

        if let Some(filter) = &self.options.boolean_filter {
            body["filter"] = json!({ "boolean_filter": filter });
        }
        if let Some(pagination) = &self.options.pagination {
            body["pagination"] = json!(pagination);
        }
        if let Some(sort) = &self.options.sort {
            body["sort"] = json!(sort);
        }
        if let Some(weighting) = &self.options.weighting {
            body["field_value_weighting"] = json!(weighting);
        }
        body
    }
}
