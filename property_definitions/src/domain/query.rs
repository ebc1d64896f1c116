//! Composition of the property definition listing query.
//!
//! [PropertyDefinitionQuery::compose] turns a set of [PropertyDefinitionFilters] into an
//! ordered list of [Predicate]s that must all hold, the source of the derived
//! `is_event_property` column and the final ordering. Storage adapters render this
//! into their own query language, binding every caller supplied value as a parameter.

use crate::domain::{
    hidden::excluded_with_hidden,
    models::{Page, PropertyDefinitionFilters, TeamId},
};


/// Names which are never returned when only numerical properties are requested
pub const NUMERICAL_EXCLUDED_NAMES: [&str; 2] = ["distinct_id", "timestamp"];

/// Columns the free text search matches against
pub const SEARCH_FIELDS: &[SearchField] = &[SearchField::Name];

/// A column which can be searched with a free text term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// the property name
    Name,
}

/// A single condition on a property definition row. All predicates of a query are AND-combined.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// the row belongs to this team
    Team(TeamId),
    /// the name is none of these
    NameNotIn(Vec<String>),
    /// the name is one of these
    NameIn(Vec<String>),
    /// the row is numerical and not one of [NUMERICAL_EXCLUDED_NAMES]
    NumericalOnly,
    /// the derived `is_event_property` column equals this value
    EventPropertyIs(bool),
    /// every term matches at least one of the fields, case insensitively
    Search {
        /// fields matched against
        fields: &'static [SearchField],
        /// the terms, each of which must match
        terms: Vec<String>,
    },
}

/// A column the result set can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    /// the derived column
    IsEventProperty,
    /// usage in the last 30 days
    QueryUsage30Day,
    /// the property name
    Name,
}

/// Direction of an [OrderTerm]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// ascending
    Asc,
    /// descending
    Desc,
}

/// Where nulls are placed by an [OrderTerm]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// nulls before any value
    First,
    /// nulls after any value
    Last,
}

/// One term of an `ORDER BY` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    /// the column to order by
    pub column: OrderColumn,
    /// ascending or descending
    pub direction: Direction,
    /// explicit null placement, if any
    pub nulls: Option<Nulls>,
}

impl OrderTerm {
    /// order ascending by the input column
    pub fn asc(column: OrderColumn) -> Self {
        OrderTerm {
            column,
            direction: Direction::Asc,
            nulls: None,
        }
    }

    /// order descending by the input column
    pub fn desc(column: OrderColumn) -> Self {
        OrderTerm {
            column,
            direction: Direction::Desc,
            nulls: None,
        }
    }

    /// place nulls after every value
    pub fn nulls_last(self) -> Self {
        OrderTerm {
            nulls: Some(Nulls::Last),
            ..self
        }
    }
}

/// Builder for an ordered list of [OrderTerm]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    terms: Vec<OrderTerm>,
}

impl OrderBy {
    /// append a term which is applied when all previous terms compare equal
    pub fn then(mut self, term: OrderTerm) -> Self {
        self.terms.push(term);
        self
    }

    /// the terms in application order
    pub fn terms(&self) -> &[OrderTerm] {
        &self.terms
    }
}

/// Split a free text search into its terms.
/// NUL characters are dropped and commas separate terms just like whitespace does.
pub fn search_terms(search: &str) -> Vec<String> {
    search
        .replace('\0', "")
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// A fully composed listing query for one team
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinitionQuery {
    /// event names the derived `is_event_property` column is computed against.
    /// When this is [None] the column is null for every row.
    pub event_names: Option<Vec<String>>,
    /// conditions which must all hold
    pub predicates: Vec<Predicate>,
    /// final ordering of the rows
    pub order_by: OrderBy,
    /// pagination applied after ordering
    pub page: Page,
}

impl PropertyDefinitionQuery {
    /// Compose the listing query for a team.
    ///
    /// The hidden property set is always excluded. An inclusion through `names` never
    /// overrides an exclusion since both predicates must hold.
    pub fn compose(team_id: TeamId, filters: &PropertyDefinitionFilters) -> Self {
        let mut predicates = vec![
            Predicate::Team(team_id),
            Predicate::NameNotIn(excluded_with_hidden(
                filters.excluded_properties.iter().cloned(),
            )),
        ];

        if let Some(names) = &filters.names {
            predicates.push(Predicate::NameIn(names.clone()));
        }

        if filters.numerical_only {
            predicates.push(Predicate::NumericalOnly);
        }

        let event_names = (!filters.event_names.is_empty()).then(|| filters.event_names.clone());

        if let (Some(_), Some(is_event_property)) = (&event_names, filters.is_event_property) {
            predicates.push(Predicate::EventPropertyIs(is_event_property));
        }

        let terms = filters
            .search
            .as_deref()
            .map(search_terms)
            .unwrap_or_default();
        if !terms.is_empty() {
            predicates.push(Predicate::Search {
                fields: SEARCH_FIELDS,
                terms,
            });
        }

        PropertyDefinitionQuery {
            event_names,
            predicates,
            order_by: Self::default_order(),
            page: filters.page,
        }
    }

    /// associated properties first, then most used, then alphabetical
    pub fn default_order() -> OrderBy {
        OrderBy::default()
            .then(OrderTerm::desc(OrderColumn::IsEventProperty))
            .then(OrderTerm::desc(OrderColumn::QueryUsage30Day).nulls_last())
            .then(OrderTerm::asc(OrderColumn::Name))
    }
}
