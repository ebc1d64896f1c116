//! This module renders a [PropertyDefinitionQuery] into a postgres query.
//!
//! Every predicate is rendered into a [Fragment]: a sequence of static sql text and bound
//! values. Sql text can only come from `&'static str`, so caller input always ends up as a
//! bound parameter.

use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{PropertyDefinitionRow, PropertyDefinitionStorageErr};
use crate::domain::{
    models::PropertyDefinition,
    query::{
        Direction, Nulls, OrderColumn, OrderTerm, Predicate, PropertyDefinitionQuery, SearchField,
    },
};

#[cfg(test)]
mod tests;

static SELECT_CLAUSE: &str = r#"SELECT id, team_id, name, is_numerical, query_usage_30_day, property_type, "#;

static FROM_CLAUSE: &str = r#" AS is_event_property FROM posthog_propertydefinition"#;

static EVENT_PROPERTY_PREFIX: &str = r#"(SELECT count(1) > 0 FROM posthog_eventproperty WHERE posthog_eventproperty.team_id = posthog_propertydefinition.team_id AND posthog_eventproperty.event = ANY("#;

static EVENT_PROPERTY_SUFFIX: &str =
    r#") AND posthog_eventproperty.property = posthog_propertydefinition.name)"#;

static NUMERICAL_FILTER: &str =
    r#"is_numerical = true AND name NOT IN ('distinct_id', 'timestamp')"#;

/// A value which is sent to postgres as a bound parameter
#[derive(Debug, Clone, PartialEq)]
enum Bind {
    Int(i64),
    Bool(bool),
    Text(String),
    TextList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Sql(&'static str),
    Bind(Bind),
}

/// A piece of sql which owns the values bound inside of it
#[derive(Debug, Clone, Default, PartialEq)]
struct Fragment {
    segments: Vec<Segment>,
}

impl Fragment {
    fn sql(mut self, sql: &'static str) -> Self {
        self.segments.push(Segment::Sql(sql));
        self
    }

    fn bind(mut self, value: Bind) -> Self {
        self.segments.push(Segment::Bind(value));
        self
    }

    #[cfg(test)]
    fn binds(&self) -> Vec<&Bind> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Bind(bind) => Some(bind),
                Segment::Sql(_) => None,
            })
            .collect()
    }

    fn push_into(self, builder: &mut QueryBuilder<'_, Postgres>) {
        for segment in self.segments {
            match segment {
                Segment::Sql(sql) => {
                    builder.push(sql);
                }
                Segment::Bind(Bind::Int(value)) => {
                    builder.push_bind(value);
                }
                Segment::Bind(Bind::Bool(value)) => {
                    builder.push_bind(value);
                }
                Segment::Bind(Bind::Text(value)) => {
                    builder.push_bind(value);
                }
                Segment::Bind(Bind::TextList(value)) => {
                    builder.push_bind(value);
                }
            }
        }
    }
}

/// The derived `is_event_property` column.
/// Without event names this is a typed null so the row still decodes as an optional bool.
fn event_property_column(event_names: Option<Vec<String>>) -> Fragment {
    match event_names {
        Some(event_names) => Fragment::default()
            .sql(EVENT_PROPERTY_PREFIX)
            .bind(Bind::TextList(event_names))
            .sql(EVENT_PROPERTY_SUFFIX),
        None => Fragment::default().sql("NULL::boolean"),
    }
}

fn search_field_column(field: SearchField) -> &'static str {
    match field {
        SearchField::Name => "name",
    }
}

fn search_fragment(fields: &[SearchField], terms: Vec<String>) -> Fragment {
    terms
        .into_iter()
        .enumerate()
        .fold(Fragment::default(), |fragment, (term_idx, term)| {
            let fragment = if term_idx > 0 {
                fragment.sql(" AND (")
            } else {
                fragment.sql("(")
            };

            fields
                .iter()
                .enumerate()
                .fold(fragment, |fragment, (field_idx, field)| {
                    let fragment = if field_idx > 0 {
                        fragment.sql(" OR ")
                    } else {
                        fragment
                    };
                    fragment
                        .sql(search_field_column(*field))
                        .sql(" ILIKE ")
                        .bind(Bind::Text(format!("%{term}%")))
                })
                .sql(")")
        })
}

fn predicate_fragment(predicate: Predicate, event_property: &Fragment) -> Fragment {
    match predicate {
        Predicate::Team(team_id) => Fragment::default()
            .sql("team_id = ")
            .bind(Bind::Int(team_id)),
        Predicate::NameNotIn(names) => Fragment::default()
            .sql("name <> ALL(")
            .bind(Bind::TextList(names))
            .sql(")"),
        Predicate::NameIn(names) => Fragment::default()
            .sql("name = ANY(")
            .bind(Bind::TextList(names))
            .sql(")"),
        Predicate::NumericalOnly => Fragment::default().sql(NUMERICAL_FILTER),
        Predicate::EventPropertyIs(value) => event_property
            .clone()
            .sql(" = ")
            .bind(Bind::Bool(value)),
        Predicate::Search { fields, terms } => search_fragment(fields, terms),
    }
}

fn order_term_sql(term: OrderTerm) -> [&'static str; 3] {
    let column = match term.column {
        OrderColumn::IsEventProperty => "is_event_property",
        OrderColumn::QueryUsage30Day => "query_usage_30_day",
        OrderColumn::Name => "name",
    };
    let direction = match term.direction {
        Direction::Asc => " ASC",
        Direction::Desc => " DESC",
    };
    let nulls = match term.nulls {
        Some(Nulls::First) => " NULLS FIRST",
        Some(Nulls::Last) => " NULLS LAST",
        None => "",
    };
    [column, direction, nulls]
}

fn build_query(query: PropertyDefinitionQuery) -> QueryBuilder<'static, Postgres> {
    let PropertyDefinitionQuery {
        event_names,
        predicates,
        order_by,
        page,
    } = query;

    let event_property = event_property_column(event_names);

    let mut builder = QueryBuilder::new(SELECT_CLAUSE);
    event_property.clone().push_into(&mut builder);
    builder.push(FROM_CLAUSE);

    for (idx, predicate) in predicates.into_iter().enumerate() {
        builder.push(if idx == 0 { " WHERE (" } else { " AND (" });
        predicate_fragment(predicate, &event_property).push_into(&mut builder);
        builder.push(")");
    }

    for (idx, term) in order_by.terms().iter().enumerate() {
        builder.push(if idx == 0 { " ORDER BY " } else { ", " });
        for sql in order_term_sql(*term) {
            builder.push(sql);
        }
    }

    if let Some(limit) = page.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }
    if let Some(offset) = page.offset {
        builder.push(" OFFSET ").push_bind(i64::from(offset));
    }

    builder
}

pub(super) async fn dynamic_list_property_definitions(
    db: &PgPool,
    query: PropertyDefinitionQuery,
) -> Result<Vec<PropertyDefinition>, PropertyDefinitionStorageErr> {
    let rows = build_query(query)
        .build_query_as::<PropertyDefinitionRow>()
        .fetch_all(db)
        .await?;

    rows.into_iter().map(PropertyDefinition::try_from).collect()
}
