//! Stored sites and the paged listing query over them

use serde::{Deserialize, Serialize};

use crate::config::defaults::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

// ============================================================================
// Site records
// ============================================================================

/// A previously scored candidate site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: u64,
    pub name: String,
    pub region: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub score: f64,
}

/// A site that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSite {
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub score: f64,
}

impl NewSite {
    pub fn into_site(self, id: u64) -> Site {
        Site {
            id,
            name: self.name,
            region: self.region,
            latitude: self.latitude,
            longitude: self.longitude,
            score: self.score,
        }
    }
}

// ============================================================================
// Listing query
// ============================================================================

/// Allow-listed sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Score,
    Name,
    Id,
}

impl SortField {
    /// Parse a user-supplied sort key, falling back to `score` for anything
    /// outside the allow-list.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some("score") => Self::Score,
            Some("name") => Self::Name,
            Some("id") => Self::Id,
            _ => Self::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc` (any case) is ascending, everything else is descending.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some(dir) if dir.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Normalized listing request: region filter, ordering and page window.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteQuery {
    pub region: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
    pub page: usize,
    pub size: usize,
}

impl Default for SiteQuery {
    fn default() -> Self {
        Self {
            region: None,
            sort: SortField::default(),
            direction: SortDirection::default(),
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SiteQuery {
    /// Build a query from raw request parameters, clamping everything into range.
    pub fn from_params(
        region: Option<&str>,
        sort: Option<&str>,
        dir: Option<&str>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Self {
        let region = region
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let page = usize::try_from(page.unwrap_or(0).max(0)).unwrap_or(0);
        let size = size
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(MIN_PAGE_SIZE as i64, MAX_PAGE_SIZE as i64);
        let size = usize::try_from(size).unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            region,
            sort: SortField::parse_or_default(sort),
            direction: SortDirection::parse_or_default(dir),
            page,
            size,
        }
    }

    /// Whether `site` passes the region filter (case-insensitive exact match).
    pub fn matches(&self, site: &Site) -> bool {
        match &self.region {
            Some(region) => site.region.to_lowercase() == region.to_lowercase(),
            None => true,
        }
    }

    /// Filter, order and slice an unordered set of sites into one page.
    ///
    /// Equal sort keys fall back to ascending id so pages never overlap.
    pub fn apply(&self, sites: impl IntoIterator<Item = Site>) -> SitePage {
        let mut matched: Vec<Site> = sites.into_iter().filter(|s| self.matches(s)).collect();

        matched.sort_by(|a, b| {
            let primary = match self.sort {
                SortField::Score => a.score.total_cmp(&b.score),
                SortField::Name => a.name.cmp(&b.name),
                SortField::Id => a.id.cmp(&b.id),
            };
            let primary = match self.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(self.page.saturating_mul(self.size))
            .take(self.size)
            .collect();

        SitePage {
            page: self.page,
            size: self.size,
            total,
            items,
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePage {
    pub page: usize,
    pub size: usize,
    pub total: usize,
    pub items: Vec<Site>,
}
