//! Filter expressions
//!
//! Every list endpoint describes what it wants as a filter value. The
//! repositories render filters into a `WHERE` clause with
//! [`sqlx::QueryBuilder`], so the selection logic lives here and can be
//! tested without touching HTTP.
//!
//! Dates are compared as RFC 3339 text in SQLite. That ordering only holds
//! for one fixed offset, so repositories must always bind `DateTime<Utc>`
//! and never a preformatted string.

use chrono::{DateTime, Duration, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::models::ObjectId;

/// Limit used by the recent-ratings query when none (or a bad one) is given
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Interpret the `limit` query parameter.
///
/// Absent, unparsable and non-positive values all fall back to
/// [`DEFAULT_RECENT_LIMIT`].
pub fn recent_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_RECENT_LIMIT)
}

/// Appends `WHERE a AND b ...` as conditions are pushed.
struct WhereClause<'q, 'a> {
    qb: &'a mut QueryBuilder<'q, Sqlite>,
    first: bool,
}

impl<'q, 'a> WhereClause<'q, 'a> {
    fn new(qb: &'a mut QueryBuilder<'q, Sqlite>) -> Self {
        Self { qb, first: true }
    }

    fn next(&mut self) -> &mut QueryBuilder<'q, Sqlite> {
        self.qb.push(if self.first { " WHERE " } else { " AND " });
        self.first = false;
        self.qb
    }
}

/// Selection over bookings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub user_id: Option<ObjectId>,
    pub restaurant_id: Option<ObjectId>,
    /// Inclusive lower bound on `date`
    pub date_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `date`
    pub date_before: Option<DateTime<Utc>>,
    /// Skip cancelled bookings
    pub active_only: bool,
}

impl BookingFilter {
    pub fn for_user(user_id: ObjectId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_restaurant(restaurant_id: ObjectId) -> Self {
        Self {
            restaurant_id: Some(restaurant_id),
            ..Self::default()
        }
    }

    /// Bookings in `[date, date + 1 day)`
    pub fn on_day(date: DateTime<Utc>) -> Self {
        Self {
            date_from: Some(date),
            date_before: Some(date + Duration::days(1)),
            ..Self::default()
        }
    }

    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    /// Bookings at or after `now`
    pub fn upcoming(mut self, now: DateTime<Utc>) -> Self {
        self.date_from = Some(now);
        self
    }

    /// Bookings strictly before `now`
    pub fn past(mut self, now: DateTime<Utc>) -> Self {
        self.date_before = Some(now);
        self
    }

    /// Append this filter's `WHERE` clause.
    pub fn push_where<'q>(&self, qb: &mut QueryBuilder<'q, Sqlite>) {
        let mut clause = WhereClause::new(qb);

        if let Some(id) = self.user_id {
            clause.next().push("user_id = ").push_bind(id.to_hex());
        }
        if let Some(id) = self.restaurant_id {
            clause.next().push("restaurant_id = ").push_bind(id.to_hex());
        }
        if let Some(from) = self.date_from {
            clause.next().push("date >= ").push_bind(from);
        }
        if let Some(before) = self.date_before {
            clause.next().push("date < ").push_bind(before);
        }
        if self.active_only {
            clause.next().push("(cancelled IS NULL OR cancelled = 0)");
        }
    }

    /// Check an in-memory booking against the filter.
    pub fn matches(&self, booking: &crate::models::Booking) -> bool {
        self.user_id.map_or(true, |id| booking.user_id == id)
            && self.restaurant_id.map_or(true, |id| booking.restaurant_id == id)
            && self.date_from.map_or(true, |from| booking.date >= from)
            && self.date_before.map_or(true, |before| booking.date < before)
            && (!self.active_only || booking.is_active())
    }
}

/// Selection over rates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateFilter {
    pub user_id: Option<ObjectId>,
    pub restaurant_id: Option<ObjectId>,
}

impl RateFilter {
    pub fn for_user(user_id: ObjectId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_restaurant(restaurant_id: ObjectId) -> Self {
        Self {
            restaurant_id: Some(restaurant_id),
            ..Self::default()
        }
    }

    pub fn push_where<'q>(&self, qb: &mut QueryBuilder<'q, Sqlite>) {
        let mut clause = WhereClause::new(qb);

        if let Some(id) = self.user_id {
            clause.next().push("user_id = ").push_bind(id.to_hex());
        }
        if let Some(id) = self.restaurant_id {
            clause.next().push("restaurant_id = ").push_bind(id.to_hex());
        }
    }
}
