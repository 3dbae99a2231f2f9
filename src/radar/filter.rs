//! Radar filtering, listing and paging

use serde::Serialize;

use super::Radar;

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Client side filters over the radars snapshot
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RadarFilter {
    /// Accepted type codes, all of them when empty
    pub types: Vec<String>,
    /// Min controlled speed, inclusive
    pub speed_min: Option<u32>,
    /// Max controlled speed, inclusive
    pub speed_max: Option<u32>,
    /// Lowercased text searched in the lane, direction and location
    pub(super) search: Option<String>,
}

impl RadarFilter {
    pub fn types(mut self, types: Vec<String>) -> Self {
        self.types = types;
        self
    }

    pub fn speed_min(mut self, min: u32) -> Self {
        self.speed_min = Some(min);
        self
    }

    pub fn speed_max(mut self, max: u32) -> Self {
        self.speed_max = Some(max);
        self
    }

    pub fn search(mut self, text: &str) -> Self {
        let text = text.trim();
        self.search = if text.is_empty() {
            None
        } else {
            Some(text.to_lowercase())
        };
        self
    }

    pub fn matches(&self, radar: &Radar) -> bool {
        if !self.types.is_empty() && !self.types.iter().any(|t| t == radar.kind.code()) {
            return false;
        }

        if let Some(min) = self.speed_min {
            match radar.speed_limit {
                Some(speed) if speed >= min => {}
                _ => return false,
            }
        }

        if let Some(max) = self.speed_max {
            match radar.speed_limit {
                Some(speed) if speed <= max => {}
                _ => return false,
            }
        }

        if let Some(needle) = &self.search {
            let found = [&radar.lane, &radar.direction, &radar.location]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !found {
                return false;
            }
        }

        true
    }

    /// Matching radars, in the snapshot order
    pub fn apply<'a>(&self, radars: &'a [Radar]) -> Vec<&'a Radar> {
        radars.iter().filter(|r| self.matches(r)).collect()
    }
}

/// One page of a radars listing
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RadarPage {
    pub data: Vec<Radar>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Page over the radars ordered by id, radars without id at the end
pub fn paginate(radars: &[&Radar], page: usize, limit: usize) -> RadarPage {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);

    let mut sorted = radars.to_vec();
    sorted.sort_by_key(|r| (r.id.is_none(), r.id));

    let total = sorted.len();
    let total_pages = (total + limit - 1) / limit;

    let data = sorted
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .cloned()
        .collect();

    RadarPage {
        data,
        total,
        page,
        limit,
        total_pages,
    }
}

pub fn find_by_id(radars: &[Radar], id: i64) -> Option<&Radar> {
    radars.iter().find(|r| r.id == Some(id))
}

/// Distinct type codes available in the snapshot, sorted
pub fn radar_types(radars: &[Radar]) -> Vec<String> {
    let mut types: Vec<String> = radars.iter().map(|r| r.kind.code().to_string()).collect();
    types.sort();
    types.dedup();

    types
}
