//! Query planner: filter → sort → paginate over a record slice.
//!
//! RULES:
//!   - Every sort is stable. Descending order flips the comparator, never
//!     the list, so ties always keep insertion order.
//!   - `severity` compares severity scores and ALE amounts as one number
//!     when the collection mixes types. This matches the stored data's
//!     historical behaviour and is deliberately not "fixed" here.
//!   - `ale` drops qualitative records before sorting.
//!   - The planner never clamps page or page size; range checks belong to
//!     `RiskQuery::validate`, which callers run upstream.

use crate::{
    error::{RiskError, RiskResult},
    record::{RiskKind, RiskRecord},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, str::FromStr};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    CreatedAt,
    Severity,
    Ale,
    Id,
    #[serde(rename = "type")]
    Kind,
}

impl FromStr for SortKey {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "severity"  => Ok(Self::Severity),
            "ale"       => Ok(Self::Ale),
            "id"        => Ok(Self::Id),
            "type"      => Ok(Self::Kind),
            other => Err(RiskError::validation(
                "sortBy",
                format!("unknown sort key '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc"  => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(RiskError::validation(
                "order",
                format!("expected 'asc' or 'desc', got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskQuery {
    #[serde(rename = "type")]
    pub kind:      Option<RiskKind>,
    pub sort_by:   SortKey,
    pub order:     SortOrder,
    pub page:      usize,
    /// None takes the configured default page size.
    pub page_size: Option<usize>,
}

impl Default for RiskQuery {
    fn default() -> Self {
        Self {
            kind:      None,
            sort_by:   SortKey::default(),
            order:     SortOrder::default(),
            page:      DEFAULT_PAGE,
            page_size: None,
        }
    }
}

impl RiskQuery {
    pub fn of_kind(mut self, kind: RiskKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn sorted_by(mut self, sort_by: SortKey, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.order = order;
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }

    /// Fill an omitted page size with `default_page_size`.
    pub fn with_default_page_size(mut self, default_page_size: usize) -> Self {
        self.page_size.get_or_insert(default_page_size);
        self
    }

    pub fn effective_page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Upstream range check: page ≥ 1, page size within 1..=max_page_size.
    pub fn validate(&self, max_page_size: usize) -> RiskResult<()> {
        if self.page < 1 {
            return Err(RiskError::validation("page", "must be at least 1"));
        }
        let page_size = self.effective_page_size();
        if page_size < 1 || page_size > max_page_size {
            return Err(RiskError::validation(
                "pageSize",
                format!("must be between 1 and {max_page_size}, got {page_size}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items:     Vec<T>,
    pub total:     usize,
    pub page:      usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }
}

/// Plan and execute `query` over `records` (insertion order).
pub fn plan(records: &[RiskRecord], query: &RiskQuery) -> Page<RiskRecord> {
    let mut selected: Vec<&RiskRecord> = records
        .iter()
        .filter(|r| query.kind.map_or(true, |kind| r.kind() == kind))
        .collect();

    if query.sort_by == SortKey::Ale {
        selected.retain(|r| r.kind() == RiskKind::Quantitative);
    }

    // sort_by is a stable merge sort.
    selected.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort_by);
        match query.order {
            SortOrder::Asc  => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = selected.len();
    let page_size = query.effective_page_size();
    let offset = query.page.saturating_sub(1).saturating_mul(page_size);
    let items = selected
        .into_iter()
        .skip(offset)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        total,
        page: query.page,
        page_size,
    }
}

fn compare(a: &RiskRecord, b: &RiskRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::Id        => a.id.cmp(&b.id),
        SortKey::Kind      => a.kind().cmp(&b.kind()),
        SortKey::Severity  => a
            .assessment
            .inherent_magnitude()
            .total_cmp(&b.assessment.inherent_magnitude()),
        SortKey::Ale => {
            let a_ale = a.assessment.ale_inherent().unwrap_or(0.0);
            let b_ale = b.assessment.ale_inherent().unwrap_or(0.0);
            a_ale.total_cmp(&b_ale)
        }
    }
}
