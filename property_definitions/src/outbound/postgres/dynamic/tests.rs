//! Tests for rendering composed queries into sql

use super::*;
use crate::domain::models::{Page, PropertyDefinitionFilters};

fn render(filters: PropertyDefinitionFilters) -> String {
    build_query(PropertyDefinitionQuery::compose(1, &filters))
        .sql()
        .to_string()
}

#[test]
fn it_should_render_the_unfiltered_query() {
    assert_eq!(
        render(PropertyDefinitionFilters::default()),
        "SELECT id, team_id, name, is_numerical, query_usage_30_day, property_type, \
         NULL::boolean AS is_event_property FROM posthog_propertydefinition \
         WHERE (team_id = $1) AND (name <> ALL($2)) \
         ORDER BY is_event_property DESC, query_usage_30_day DESC NULLS LAST, name ASC"
    );
}

#[test]
fn it_should_render_the_event_property_subquery_in_select_and_where() {
    let sql = render(PropertyDefinitionFilters {
        event_names: vec!["login".to_string()],
        is_event_property: Some(true),
        ..Default::default()
    });

    assert!(sql.starts_with(
        "SELECT id, team_id, name, is_numerical, query_usage_30_day, property_type, (SELECT count(1) > 0"
    ));
    assert!(sql.contains("posthog_eventproperty.event = ANY($1)"));
    assert!(sql.contains("WHERE (team_id = $2) AND (name <> ALL($3))"));
    assert!(sql.contains("posthog_eventproperty.event = ANY($4)"));
    assert!(sql.contains("posthog_propertydefinition.name) = $5)"));
    assert!(!sql.contains("NULL::boolean"));
}

#[test]
fn it_should_render_the_numerical_filter_as_fixed_text() {
    let sql = render(PropertyDefinitionFilters {
        names: Some(vec!["revenue".to_string()]),
        numerical_only: true,
        ..Default::default()
    });

    assert!(sql.contains(
        "AND (name = ANY($3)) AND (is_numerical = true AND name NOT IN ('distinct_id', 'timestamp'))"
    ));
}

#[test]
fn it_should_render_one_group_per_search_term() {
    let sql = render(PropertyDefinitionFilters {
        search: Some("utm source".to_string()),
        ..Default::default()
    });

    assert!(sql.contains("AND ((name ILIKE $3) AND (name ILIKE $4)) ORDER BY"));

    let fragment = predicate_fragment(
        Predicate::Search {
            fields: &[SearchField::Name],
            terms: vec!["utm".to_string(), "source".to_string()],
        },
        &event_property_column(None),
    );
    assert_eq!(
        fragment.binds(),
        vec![
            &Bind::Text("%utm%".to_string()),
            &Bind::Text("%source%".to_string())
        ]
    );
}

#[test]
fn it_should_render_pagination_last() {
    let sql = render(PropertyDefinitionFilters {
        page: Page {
            limit: Some(10),
            offset: Some(20),
        },
        ..Default::default()
    });

    assert!(sql.ends_with("name ASC LIMIT $3 OFFSET $4"));
}

#[test]
fn it_should_never_interpolate_caller_input() {
    let hostile = "x'); DROP TABLE posthog_propertydefinition; --".to_string();
    let sql = render(PropertyDefinitionFilters {
        names: Some(vec![hostile.clone()]),
        event_names: vec![hostile.clone()],
        excluded_properties: vec![hostile.clone()],
        search: Some(hostile.clone()),
        ..Default::default()
    });

    assert!(!sql.contains("DROP"));

    let fragment = predicate_fragment(
        Predicate::NameIn(vec![hostile.clone()]),
        &event_property_column(None),
    );
    assert_eq!(fragment.binds(), vec![&Bind::TextList(vec![hostile])]);
}
