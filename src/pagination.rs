//! This modules defines the common functionality for paging and sorting lists.

use serde::{Deserialize, Serialize};

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_limit: 10,
        }
    }
}

/// The raw query parameters of a list request.
///
/// Every parameter is kept as text so that a malformed value falls back to
/// its default instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

impl ListParams {
    /// Collect the list parameters from decoded query string pairs.
    ///
    /// Each parameter is taken on its own, so a key that is repeated is
    /// treated as missing without affecting the other parameters. Unknown
    /// keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = ListParams::default();
        let mut repeated: Vec<String> = Vec::new();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "sort" => &mut params.sort,
                "order" => &mut params.order,
                "type" => &mut params.transaction_type,
                _ => continue,
            };

            if slot.is_some() {
                repeated.push(key);
            } else {
                *slot = Some(value);
            }
        }

        for key in repeated {
            tracing::debug!("Ignoring repeated query parameter {key:?}");
            match key.as_str() {
                "page" => params.page = None,
                "limit" => params.limit = None,
                "sort" => params.sort = None,
                "order" => params.order = None,
                "type" => params.transaction_type = None,
                _ => {}
            }
        }

        params
    }
}

/// A field that lists can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Description,
    Category,
    Amount,
    Date,
    Paid,
    Type,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Look up a field by the name clients use for it, e.g. "createdAt".
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "id" | "_id" => SortField::Id,
            "name" => SortField::Name,
            "description" => SortField::Description,
            "category" => SortField::Category,
            "amount" => SortField::Amount,
            "date" => SortField::Date,
            "paid" => SortField::Paid,
            "type" => SortField::Type,
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            _ => return None,
        };

        Some(field)
    }
}

/// The direction to sort a list in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    #[serde(rename = "asc")]
    Ascending,
    /// Sort in order of decreasing value.
    #[serde(rename = "desc")]
    Descending,
}

/// A single-field sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: SortOrder::Descending,
        }
    }
}

/// The resolved paging and sorting of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of items per page.
    pub limit: u64,
    /// The number of items before the requested page.
    pub skip: u64,
    pub sort: SortSpec,
}

/// Turn raw list parameters into a page, limit, skip and sort.
///
/// `page` and `limit` must be positive integers, anything else falls back to
/// the defaults in `config`. A sort is only applied when both `sort` and
/// `order` are given and `sort` names a known field. An order of "asc" sorts
/// in ascending order, any other order sorts in descending order.
pub fn resolve_list_query(params: &ListParams, config: &PaginationConfig) -> ListQuery {
    let page = parse_positive(params.page.as_deref()).unwrap_or(config.default_page);
    let limit = parse_positive(params.limit.as_deref()).unwrap_or(config.default_limit);

    let sort = match (params.sort.as_deref(), params.order.as_deref()) {
        (Some(sort), Some(order)) if !sort.is_empty() && !order.is_empty() => {
            match SortField::from_name(sort) {
                Some(field) => SortSpec {
                    field,
                    order: if order == "asc" {
                        SortOrder::Ascending
                    } else {
                        SortOrder::Descending
                    },
                },
                None => SortSpec::default(),
            }
        }
        _ => SortSpec::default(),
    };

    ListQuery {
        page,
        limit,
        skip: page.saturating_sub(1).saturating_mul(limit),
        sort,
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&value| value > 0)
}

/// One page of a list along with the information needed to fetch the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub items: Vec<T>,
    /// The number of items matching the filter across all pages.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Wrap a page of `items` with the total count and the paging used to fetch it.
pub fn build_list_envelope<T>(total: u64, items: Vec<T>, page: u64, limit: u64) -> ListEnvelope<T> {
    ListEnvelope {
        items,
        total,
        page,
        limit,
    }
}

#[cfg(test)]
mod tests {
    use crate::pagination::{
        ListParams, ListQuery, PaginationConfig, SortField, SortOrder, SortSpec,
        build_list_envelope, resolve_list_query,
    };

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "limit" => params.limit = value,
                "sort" => params.sort = value,
                "order" => params.order = value,
                "type" => params.transaction_type = value,
                other => panic!("unexpected parameter {other}"),
            }
        }
        params
    }

    fn resolve(pairs: &[(&str, &str)]) -> ListQuery {
        resolve_list_query(&params(pairs), &PaginationConfig::default())
    }

    #[test]
    fn uses_defaults_without_params() {
        let got = resolve(&[]);

        assert_eq!(
            got,
            ListQuery {
                page: 1,
                limit: 10,
                skip: 0,
                sort: SortSpec {
                    field: SortField::CreatedAt,
                    order: SortOrder::Descending
                },
            }
        );
    }

    #[test]
    fn computes_skip_from_page_and_limit() {
        let got = resolve(&[("page", "2"), ("limit", "10")]);

        assert_eq!(got.skip, 10);
        assert_eq!(got.page, 2);
        assert_eq!(got.limit, 10);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        for value in ["0", "-3", "abc", "", "2.5"] {
            let got = resolve(&[("page", value), ("limit", value)]);

            assert_eq!(got.page, 1, "page={value:?}");
            assert_eq!(got.limit, 10, "limit={value:?}");
            assert_eq!(got.skip, 0, "page={value:?}");
        }
    }

    #[test]
    fn skip_saturates_on_huge_pages() {
        let huge_page = u64::MAX.to_string();
        let got = resolve(&[("page", huge_page.as_str()), ("limit", "50")]);

        assert_eq!(got.skip, u64::MAX);
    }

    #[test]
    fn sort_needs_both_field_and_order() {
        assert_eq!(resolve(&[("sort", "amount")]).sort, SortSpec::default());
        assert_eq!(resolve(&[("order", "asc")]).sort, SortSpec::default());
    }

    #[test]
    fn ascending_sort() {
        let got = resolve(&[("sort", "amount"), ("order", "asc")]);

        assert_eq!(
            got.sort,
            SortSpec {
                field: SortField::Amount,
                order: SortOrder::Ascending
            }
        );
    }

    #[test]
    fn any_other_order_is_descending() {
        for order in ["desc", "DESC", "up", "1"] {
            let got = resolve(&[("sort", "date"), ("order", order)]);

            assert_eq!(
                got.sort,
                SortSpec {
                    field: SortField::Date,
                    order: SortOrder::Descending
                },
                "order={order}"
            );
        }
    }

    #[test]
    fn unknown_sort_field_uses_default_sort() {
        let got = resolve(&[("sort", "colour; DROP TABLE"), ("order", "asc")]);

        assert_eq!(got.sort, SortSpec::default());
    }

    fn pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn from_pairs_reads_each_parameter() {
        let got = ListParams::from_pairs(pairs(&[
            ("page", "2"),
            ("limit", "5"),
            ("sort", "amount"),
            ("order", "asc"),
            ("type", "income"),
            ("skip", "5"),
        ]));

        assert_eq!(got, params(&[
            ("page", "2"),
            ("limit", "5"),
            ("sort", "amount"),
            ("order", "asc"),
            ("type", "income"),
        ]));
    }

    #[test]
    fn repeated_parameter_only_resets_itself() {
        let got = ListParams::from_pairs(pairs(&[
            ("type", "income"),
            ("page", "1"),
            ("page", "2"),
            ("limit", "20"),
        ]));

        assert_eq!(got.page, None);
        assert_eq!(got.limit.as_deref(), Some("20"));
        assert_eq!(got.transaction_type.as_deref(), Some("income"));
    }

    #[test]
    fn envelope_keeps_total_independent_of_page() {
        let envelope = build_list_envelope(25, vec![11, 12, 13], 2, 10);

        assert_eq!(envelope.items, [11, 12, 13]);
        assert_eq!(envelope.total, 25);
        assert_eq!(envelope.page, 2);
        assert_eq!(envelope.limit, 10);
    }
}
