//! Active and passive continental margins.

use log::debug;

use super::size_scale;
use crate::context::MapContext;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarginsSummary {
    pub active: usize,
    pub passive: usize,
    pub target_active: usize,
    pub target_passive: usize,
    pub min_segment_length: usize,
}

/// Scan rows for long runs of coastal land and alternately mark them active
/// or passive until each quota is met.
pub fn story_tag_continental_margins(ctx: &mut MapContext<'_>) -> MarginsSummary {
    let (width, height) = (ctx.width, ctx.height);
    let cfg = ctx.config.story.margins.clone();
    let sqrt = size_scale(width, height);

    let active_frac = (cfg.active_fraction + 0.05 * (sqrt - 1.0)).min(0.35);
    let passive_frac = (cfg.passive_fraction + 0.05 * (sqrt - 1.0)).min(0.35);
    let min_seg = 10.max((cfg.min_segment_length as f64 * (0.9 + 0.4 * sqrt)).round() as usize);

    let mut coastal = vec![false; width * height];
    for y in 0..height {
        for x in 0..width {
            coastal[y * width + x] = ctx.is_coastal_land(x, y);
        }
    }
    let total = coastal.iter().filter(|&&c| c).count();

    let mut summary = MarginsSummary {
        target_active: (total as f64 * active_frac).floor() as usize,
        target_passive: (total as f64 * passive_frac).floor() as usize,
        min_segment_length: min_seg,
        ..MarginsSummary::default()
    };

    let mut prefer_active = true;
    for y in 1..height.saturating_sub(1) {
        let row = &coastal[y * width..(y + 1) * width];
        let mut x = 1;
        while x < width - 1 {
            while x < width - 1 && !row[x] {
                x += 1;
            }
            if x >= width - 1 {
                break;
            }
            let start = x;
            while x < width - 1 && row[x] {
                x += 1;
            }
            if x - start < min_seg {
                continue;
            }

            let roll = ctx.random("MarginSelect", 100);
            let pick_active = (prefer_active && roll < 60) || (!prefer_active && roll < 40);
            let active = if pick_active && summary.active < summary.target_active {
                Some(true)
            } else if summary.passive < summary.target_passive {
                Some(false)
            } else {
                None
            };

            if let Some(active) = active {
                let (set, marked, quota) = if active {
                    (&mut ctx.story.active_margin, &mut summary.active, summary.target_active)
                } else {
                    (&mut ctx.story.passive_shelf, &mut summary.passive, summary.target_passive)
                };
                for sx in start..x {
                    if *marked >= quota {
                        break;
                    }
                    if set.insert((sx, y)) {
                        *marked += 1;
                    }
                }
            }
            prefer_active = !prefer_active;
        }
    }

    debug!(
        "Margins: active {}/{} passive {}/{} (min segment {})",
        summary.active, summary.target_active, summary.passive, summary.target_passive, min_seg
    );
    summary
}
