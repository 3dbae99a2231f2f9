//! Radars statistics

use std::collections::BTreeMap;

use serde::Serialize;

use super::Radar;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeDistribution {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
}

/// Global figures over a radars snapshot
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RadarStats {
    pub total: usize,
    /// Count per type, most frequent first
    pub types_distribution: Vec<TypeDistribution>,
    /// Average controlled speed, one decimal
    pub average_speed: Option<f64>,
    pub min_speed: Option<u32>,
    pub max_speed: Option<u32>,
}

impl RadarStats {
    pub fn compute(radars: &[Radar]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for radar in radars {
            *counts.entry(radar.kind.code()).or_insert(0) += 1;
        }

        let mut types_distribution: Vec<TypeDistribution> = counts
            .into_iter()
            .map(|(kind, count)| TypeDistribution {
                kind: kind.to_string(),
                count,
            })
            .collect();
        // stable: ties stay in type order
        types_distribution.sort_by(|a, b| b.count.cmp(&a.count));

        let speeds: Vec<u32> = radars.iter().filter_map(|r| r.speed_limit).collect();

        let average_speed = if speeds.is_empty() {
            None
        } else {
            let sum: f64 = speeds.iter().map(|s| *s as f64).sum();
            Some((sum / speeds.len() as f64 * 10.0).round() / 10.0)
        };

        Self {
            total: radars.len(),
            types_distribution,
            average_speed,
            min_speed: speeds.iter().min().copied(),
            max_speed: speeds.iter().max().copied(),
        }
    }
}
