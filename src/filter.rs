//! Record filtering and column projection.
//!
//! A [`FilterCriteria`] is a conjunction of per-field [`Constraint`]s. Fields
//! without a constraint are unrestricted; an explicit `OneOf` with an empty
//! set matches nothing.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::error::{DashboardError, Result};
use crate::models::{Field, FieldKind, Record, RecordCollection, Value};

// ---------------------------------------------------------------------------
// Constraint
// ---------------------------------------------------------------------------

/// A predicate over one field. Ranges are closed on both ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Text value must be one of the set.
    OneOf(BTreeSet<String>),
    /// Decimal or float value within `[lo, hi]`.
    Between(f64, f64),
    /// Integer value within `[lo, hi]`.
    IntBetween(i64, i64),
    /// Calendar date within `[lo, hi]`.
    DateBetween(NaiveDate, NaiveDate),
}

impl Constraint {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    fn accepts(&self, value: Value<'_>) -> bool {
        match (self, value) {
            (Constraint::OneOf(allowed), Value::Text(s)) => allowed.contains(s),
            (Constraint::Between(lo, hi), Value::Number(n)) => *lo <= n && n <= *hi,
            (Constraint::IntBetween(lo, hi), Value::Integer(n)) => *lo <= n && n <= *hi,
            (Constraint::DateBetween(lo, hi), Value::Date(d)) => *lo <= d && d <= *hi,
            _ => false,
        }
    }

    fn validate(&self, field: Field) -> Result<()> {
        let fits = matches!(
            (self, field.kind()),
            (Constraint::OneOf(_), FieldKind::Text)
                | (Constraint::Between(..), FieldKind::Number)
                | (Constraint::IntBetween(..), FieldKind::Integer)
                | (Constraint::DateBetween(..), FieldKind::Date)
        );
        if !fits {
            return Err(DashboardError::InvalidCriteria(format!(
                "{} constraint does not apply to {:?} field {}",
                self.kind_name(),
                field.kind(),
                field
            )));
        }

        let ordered = match self {
            Constraint::OneOf(_) => true,
            // Written so that a NaN bound is rejected too
            Constraint::Between(lo, hi) => lo <= hi,
            Constraint::IntBetween(lo, hi) => lo <= hi,
            Constraint::DateBetween(lo, hi) => lo <= hi,
        };
        if !ordered {
            return Err(DashboardError::InvalidCriteria(format!(
                "range for {} has its lower bound above its upper bound",
                field
            )));
        }
        Ok(())
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Constraint::OneOf(_) => "membership",
            Constraint::Between(..) => "number range",
            Constraint::IntBetween(..) => "integer range",
            Constraint::DateBetween(..) => "date range",
        }
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria
// ---------------------------------------------------------------------------

/// The active constraints of one filter pass, at most one per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    constraints: BTreeMap<Field, Constraint>,
}

impl FilterCriteria {
    /// Criteria with no constraints: every record passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the constraint on `field`.
    ///
    /// Fails with `InvalidCriteria` if the constraint does not fit the
    /// field's type or its range is inverted.
    pub fn with(mut self, field: Field, constraint: Constraint) -> Result<Self> {
        constraint.validate(field)?;
        self.constraints.insert(field, constraint);
        Ok(self)
    }

    /// Like [`with`](Self::with), addressing the field by its column name.
    pub fn with_named(self, name: &str, constraint: Constraint) -> Result<Self> {
        let field: Field = name.parse()?;
        self.with(field, constraint)
    }

    pub fn get(&self, field: Field) -> Option<&Constraint> {
        self.constraints.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Fields carrying a constraint, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.constraints.keys().copied()
    }

    /// Re-check every constraint against its field.
    pub fn validate(&self) -> Result<()> {
        self.constraints
            .iter()
            .try_for_each(|(field, constraint)| constraint.validate(*field))
    }

    /// Whether `record` satisfies every active constraint.
    pub fn matches(&self, record: &Record) -> bool {
        self.constraints
            .iter()
            .all(|(field, constraint)| constraint.accepts(record.value(*field)))
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Every schema column, in schema order.
pub fn all_columns() -> BTreeSet<Field> {
    Field::ALL.iter().copied().collect()
}

/// Resolve column names into a projection, rejecting unknown names.
pub fn parse_columns<S: AsRef<str>>(names: &[S]) -> Result<BTreeSet<Field>> {
    names.iter().map(|n| n.as_ref().parse::<Field>()).collect()
}

/// Keep the records matching `criteria`, exposing only `columns`.
///
/// Row order is preserved and the projection follows schema order whatever
/// order `columns` was built in. `records` itself is left untouched.
///
/// Both the requested columns and the constrained fields must be exposed by
/// `records`; a column hidden by an earlier projection cannot be filtered on
/// or brought back.
pub fn apply(
    records: &RecordCollection,
    criteria: &FilterCriteria,
    columns: &BTreeSet<Field>,
) -> Result<RecordCollection> {
    criteria.validate()?;
    if columns.is_empty() {
        return Err(DashboardError::InvalidCriteria(
            "at least one column must be selected".to_string(),
        ));
    }
    let exposed: BTreeSet<Field> = records.columns().iter().copied().collect();
    if let Some(hidden) = columns
        .iter()
        .copied()
        .chain(criteria.fields())
        .find(|f| !exposed.contains(f))
    {
        return Err(DashboardError::InvalidCriteria(format!(
            "column {} is not part of the table",
            hidden
        )));
    }

    let kept: Vec<Record> = records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect();

    tracing::debug!(
        input = records.len(),
        kept = kept.len(),
        constraints = criteria.len(),
        "applied filter"
    );

    Ok(RecordCollection::projected(
        kept,
        columns.iter().copied().collect(),
    ))
}
