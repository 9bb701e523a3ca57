//! Translates query-string parameters into a filtered, sorted, projected and
//! paginated SELECT against a collection description.

use std::collections::HashMap;

pub const DEFAULT_LIMIT: i64 = 100;
/// Upper bound on `limit`; unbounded result sets are never produced.
pub const MAX_LIMIT: i64 = 1000;

/// Keys that shape the query rather than filter it.
const CONTROL_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gte,
    Gt,
    Lte,
    Lt,
}

impl CmpOp {
    fn from_suffix(suffix: &str) -> Option<CmpOp> {
        match suffix {
            "gte" => Some(CmpOp::Gte),
            "gt" => Some(CmpOp::Gt),
            "lte" => Some(CmpOp::Lte),
            "lt" => Some(CmpOp::Lt),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Gte => ">=",
            CmpOp::Gt => ">",
            CmpOp::Lte => "<=",
            CmpOp::Lt => "<",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: CmpOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub dir: SortDir,
}

/// One column of a collection: the name clients use, the SQL column behind
/// it, and the cast applied to bound parameters so text values compare with
/// the column's own type.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub api_name: &'static str,
    pub column: &'static str,
    pub cast: &'static str,
    pub array: bool,
}

impl Column {
    pub const fn new(api_name: &'static str, column: &'static str, cast: &'static str) -> Self {
        Self {
            api_name,
            column,
            cast,
            array: false,
        }
    }

    pub const fn array(api_name: &'static str, column: &'static str, cast: &'static str) -> Self {
        Self {
            api_name,
            column,
            cast,
            array: true,
        }
    }

    fn render_select(&self) -> String {
        if self.api_name == self.column {
            self.column.to_string()
        } else {
            format!("{} AS \"{}\"", self.column, self.api_name)
        }
    }
}

/// Static description of a queryable collection. `hidden` columns are
/// invisible to this layer entirely: they cannot be projected and filtering
/// on them matches nothing.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub table: &'static str,
    pub columns: &'static [Column],
    pub hidden: &'static [&'static str],
    pub default_sort: &'static str,
}

impl CollectionSpec {
    fn resolve(&self, api_name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.api_name == api_name && !self.hidden.contains(&c.column))
    }

    fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(&c.column))
    }
}

/// A rendered read plan: SQL text plus the text parameters to bind, in order.
#[derive(Debug, Clone)]
pub struct SqlPlan {
    pub sql: String,
    pub binds: Vec<String>,
}

/// Parsed query parameters, independent of any collection. Parsing performs
/// no I/O and cannot fail; nonsense values fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub sort: Vec<SortKey>,
    pub fields: Option<Vec<String>>,
    pub page: i64,
    pub limit: i64,
}

impl ListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut filters = Vec::new();
        for (key, value) in params {
            if CONTROL_KEYS.contains(&key.as_str()) {
                continue;
            }
            let (field, op) = parse_filter_key(key);
            filters.push(Filter {
                field: field.to_string(),
                op,
                value: value.clone(),
            });
        }
        // Filters render in field order; plans for the same params are identical.
        filters.sort_by(|a, b| a.field.cmp(&b.field).then(a.op.as_sql().cmp(b.op.as_sql())));

        let sort = params
            .get("sort")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty() && *part != "-")
                    .map(|part| match part.strip_prefix('-') {
                        Some(field) => SortKey {
                            field: field.to_string(),
                            dir: SortDir::Desc,
                        },
                        None => SortKey {
                            field: part.to_string(),
                            dir: SortDir::Asc,
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();

        let fields = params.get("fields").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        });

        let page = params
            .get("page")
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = params
            .get("limit")
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);

        Self {
            filters,
            sort,
            fields,
            page,
            limit,
        }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Renders the plan against a collection. `base` is an extra WHERE
    /// condition AND-ed in front of the client filters (e.g. the active-only
    /// predicate on users).
    pub fn to_sql(&self, spec: &CollectionSpec, base: Option<&str>) -> SqlPlan {
        let mut binds: Vec<String> = Vec::new();

        let select_list = self.render_select_list(spec);

        let mut conditions: Vec<String> = base.map(|b| vec![b.to_string()]).unwrap_or_default();
        for filter in &self.filters {
            match spec.resolve(&filter.field) {
                Some(col) => {
                    binds.push(filter.value.clone());
                    let n = binds.len();
                    if col.array {
                        conditions.push(match filter.op {
                            CmpOp::Eq => format!("${}::{} = ANY({})", n, col.cast, col.column),
                            op => format!(
                                "EXISTS (SELECT 1 FROM UNNEST({}) AS _elem WHERE _elem {} ${}::{})",
                                col.column,
                                op.as_sql(),
                                n,
                                col.cast
                            ),
                        });
                    } else {
                        conditions.push(format!(
                            "{} {} ${}::{}",
                            col.column,
                            filter.op.as_sql(),
                            n,
                            col.cast
                        ));
                    }
                }
                // Unknown fields match nothing; no schema validation here.
                None => conditions.push("1 = 0".to_string()),
            }
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let mut order_parts: Vec<String> = self
            .sort
            .iter()
            .filter_map(|key| {
                spec.resolve(&key.field)
                    .filter(|col| !col.array)
                    .map(|col| {
                        let dir = match key.dir {
                            SortDir::Asc => "ASC",
                            SortDir::Desc => "DESC",
                        };
                        format!("{} {}", col.column, dir)
                    })
            })
            .collect();
        if order_parts.is_empty() {
            order_parts.push(format!("{} DESC", spec.default_sort));
        }

        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
            select_list,
            spec.table,
            where_clause,
            order_parts.join(", "),
            self.limit,
            self.skip()
        );

        SqlPlan { sql, binds }
    }

    fn render_select_list(&self, spec: &CollectionSpec) -> String {
        match &self.fields {
            Some(requested) => {
                let mut parts: Vec<String> = Vec::new();
                // The identifier is always returned, projection or not.
                parts.push("id".to_string());
                for name in requested {
                    if name == "id" {
                        continue;
                    }
                    if let Some(col) = spec.resolve(name) {
                        parts.push(col.render_select());
                    }
                }
                parts.join(", ")
            }
            None => spec
                .visible()
                .map(Column::render_select)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn parse_filter_key(key: &str) -> (&str, CmpOp) {
    if let Some(open) = key.find('[') {
        if let Some(stripped) = key[open + 1..].strip_suffix(']') {
            if let Some(op) = CmpOp::from_suffix(stripped) {
                return (&key[..open], op);
            }
        }
    }
    (key, CmpOp::Eq)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: CollectionSpec = CollectionSpec {
        table: "tours",
        columns: &[
            Column::new("id", "id", "uuid"),
            Column::new("name", "name", "text"),
            Column::new("price", "price", "numeric"),
            Column::new("difficulty", "difficulty", "text"),
            Column::new("ratingsAverage", "ratings_average", "float8"),
            Column::new("secret", "secret", "text"),
            Column::array("startDates", "start_dates", "timestamptz"),
            Column::new("createdAt", "created_at", "timestamptz"),
        ],
        hidden: &["secret"],
        default_sort: "created_at",
    };

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn plain_params_become_equality_filters() {
        let query = ListQuery::from_params(&params(&[
            ("difficulty", "easy"),
            ("name", "The Forest Hiker"),
        ]));
        assert_eq!(query.filters.len(), 2);
        assert!(query
            .filters
            .iter()
            .all(|filter| filter.op == CmpOp::Eq));
        assert_eq!(query.filters[0].field, "difficulty");
        assert_eq!(query.filters[0].value, "easy");
        assert_eq!(query.filters[1].field, "name");
    }

    #[test]
    fn control_keys_are_stripped_from_filters() {
        let query = ListQuery::from_params(&params(&[
            ("page", "3"),
            ("sort", "price"),
            ("limit", "10"),
            ("fields", "name"),
            ("difficulty", "easy"),
        ]));
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].field, "difficulty");
    }

    #[test]
    fn operator_suffixes_become_range_comparisons() {
        let query = ListQuery::from_params(&params(&[("price[gte]", "500")]));
        assert_eq!(query.filters[0].op, CmpOp::Gte);
        assert_eq!(query.filters[0].field, "price");

        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.contains("price >= $1::numeric"));
        assert_eq!(plan.binds, vec!["500".to_string()]);
    }

    #[test]
    fn unknown_fields_match_nothing() {
        let query = ListQuery::from_params(&params(&[("bogus", "1")]));
        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.contains("1 = 0"));
    }

    #[test]
    fn hidden_fields_are_treated_as_unknown() {
        let query = ListQuery::from_params(&params(&[("secret", "x")]));
        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.contains("1 = 0"));
        assert!(!plan.sql.contains("secret ="));
    }

    #[test]
    fn sort_parses_direction_and_tie_break() {
        let query = ListQuery::from_params(&params(&[("sort", "-price,name")]));
        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.contains("ORDER BY price DESC, name ASC"));
    }

    #[test]
    fn missing_sort_defaults_to_newest_first() {
        let query = ListQuery::from_params(&params(&[]));
        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn pagination_computes_skip_and_take() {
        let query = ListQuery::from_params(&params(&[("page", "2"), ("limit", "10")]));
        assert_eq!(query.skip(), 10);
        assert_eq!(query.limit, 10);

        let defaults = ListQuery::from_params(&params(&[]));
        assert_eq!(defaults.skip(), 0);
        assert_eq!(defaults.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn limit_is_capped() {
        let query = ListQuery::from_params(&params(&[("limit", "999999")]));
        assert_eq!(query.limit, MAX_LIMIT);
    }

    #[test]
    fn projection_excludes_hidden_columns_even_when_requested() {
        let query = ListQuery::from_params(&params(&[("fields", "name,secret,price")]));
        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.starts_with("SELECT id, name, price FROM tours"));
        assert!(!plan.sql.contains("secret"));
    }

    #[test]
    fn missing_fields_selects_all_visible_columns() {
        let query = ListQuery::from_params(&params(&[]));
        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.contains("ratings_average AS \"ratingsAverage\""));
        assert!(!plan.sql.contains("secret"));
    }

    #[test]
    fn base_condition_is_anded_before_client_filters() {
        let query = ListQuery::from_params(&params(&[("difficulty", "easy")]));
        let plan = query.to_sql(&SPEC, Some("active = TRUE"));
        assert!(plan
            .sql
            .contains("WHERE active = TRUE AND difficulty = $1::text"));
    }

    #[test]
    fn array_columns_use_element_comparisons() {
        let query = ListQuery::from_params(&params(&[("startDates", "2026-06-01T00:00:00Z")]));
        let plan = query.to_sql(&SPEC, None);
        assert!(plan.sql.contains("$1::timestamptz = ANY(start_dates)"));
    }
}
