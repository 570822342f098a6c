//! Визуализация верёвки - провисающая дуга между двумя точками
//!
//! Не физическая catenary: `lerp(start, end, t) + down·sag·sin(πt)`.
//! Провис 0 на концах, максимум `sag` в середине.

use std::f32::consts::PI;

use bevy::prelude::*;

use super::hand::HandSlots;
use crate::config::RopeConfig;

/// Точки от origin до anchor. Генерируются заново каждый render тик.
pub type RopeSample = Vec<Vec3>;

/// `segments` точек (минимум 2). Первая == start, последняя == end ровно.
pub fn sample_rope(start: Vec3, end: Vec3, segments: usize, sag: f32) -> RopeSample {
    let segments = segments.max(2);
    let last = segments - 1;

    (0..segments)
        .map(|i| {
            if i == 0 {
                return start;
            }
            if i == last {
                return end;
            }
            let t = i as f32 / last as f32;
            start.lerp(end, t) + Vec3::NEG_Y * (sag * (t * PI).sin())
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RopeCurveRenderer {
    pub segments: usize,
    pub sag: f32,
}

impl RopeCurveRenderer {
    pub fn from_config(config: &RopeConfig) -> Self {
        Self {
            segments: config.line_segments,
            sag: config.sag_amount,
        }
    }

    /// `None` на входе (нет wire) → `None` на выходе: line renderer скрыт
    pub fn render(&self, endpoints: Option<(Vec3, Vec3)>) -> Option<RopeSample> {
        endpoints.map(|(start, end)| sample_rope(start, end, self.segments, self.sag))
    }
}

/// Текущие точки верёвок (lateTick output). `None` - рука без wire.
#[derive(Component, Debug, Clone, Default)]
pub struct RopeVisual {
    pub lines: HandSlots<Option<RopeSample>>,
}

impl RopeVisual {
    pub fn is_visible(&self) -> bool {
        self.lines.iter().any(|(_, line)| line.is_some())
    }
}
