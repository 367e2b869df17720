//! Greedy lane packing and geometry for span annotations.
//!
//! Spans are drawn to the left of the grid. Each lane is a vertical rail at
//! a fixed offset from the grid's left edge; a pill with the span title sits
//! left of the rail at the span's vertical midpoint.

use lifegrid_protocol::{Color, Point, Rect};

use crate::config::LaneConfig;
use crate::field::CellField;
use crate::labels::TextMeasure;
use crate::model::{SpanBounds, WEEKS_PER_YEAR};

/// Geometry of one laid-out span, in world units.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanPlacement {
    pub span_id: String,
    pub title: String,
    pub color: Color,
    pub lane: usize,
    pub open_ended: bool,
    pub pill: Rect,
    /// Title as drawn inside the pill, shortened with an ellipsis when the
    /// full title would not fit between two lanes.
    pub pill_text: String,
    /// Pill right edge to the rail, at the vertical midpoint.
    pub connector: (Point, Point),
    pub rail_top: Point,
    pub rail_bottom: Point,
    pub start_cap: Point,
    pub end_cap: Option<Point>,
    /// Dashed continuation below the rail for ongoing spans.
    pub tail: Option<(Point, Point)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanLayout {
    pub placements: Vec<SpanPlacement>,
    pub lane_count: usize,
}

/// Assign a lane to each span. `bounds` must already be sorted by
/// `(start_week_index, end_week_index)`.
///
/// A span reuses the lowest lane whose last span ended strictly before it
/// starts, or ended in an earlier year than the one it starts in.
pub fn assign_lanes(bounds: &[&SpanBounds]) -> Vec<usize> {
    let mut lane_ends: Vec<usize> = Vec::new();
    bounds
        .iter()
        .map(|b| {
            let start = b.start_week_index;
            let free = lane_ends
                .iter()
                .position(|&end| end < start || end / WEEKS_PER_YEAR < start / WEEKS_PER_YEAR);
            match free {
                Some(lane) => {
                    lane_ends[lane] = b.end_week_index;
                    lane
                }
                None => {
                    lane_ends.push(b.end_week_index);
                    lane_ends.len() - 1
                }
            }
        })
        .collect()
}

/// Sort, pack and place every span that has cells to anchor to.
pub fn layout_spans(
    bounds: &[SpanBounds],
    field: &CellField,
    config: &LaneConfig,
    measurer: &dyn TextMeasure,
) -> SpanLayout {
    let Some(grid) = field.bounds() else {
        if !bounds.is_empty() {
            tracing::debug!(spans = bounds.len(), "no cells to anchor spans to");
        }
        return SpanLayout::default();
    };

    let mut placeable: Vec<&SpanBounds> = bounds
        .iter()
        .filter(|b| {
            let anchored =
                field.cell(b.start_week_index).is_some() && field.cell(b.end_week_index).is_some();
            if !anchored {
                tracing::debug!(
                    span_id = %b.span.id,
                    start = b.start_week_index,
                    end = b.end_week_index,
                    cells = field.len(),
                    "skipping span outside the rendered weeks"
                );
            }
            anchored
        })
        .collect();
    placeable.sort_by_key(|b| (b.start_week_index, b.end_week_index));

    let lanes = assign_lanes(&placeable);
    let lane_count = lanes.iter().max().map_or(0, |l| l + 1);

    let placements = placeable
        .iter()
        .zip(&lanes)
        .filter_map(|(b, &lane)| {
            let top = field.cell(b.start_week_index)?.base_position.y;
            let bottom = field.cell(b.end_week_index)?.base_position.y;
            Some(place(b, lane, grid.x, top, bottom, config, measurer))
        })
        .collect();

    SpanLayout {
        placements,
        lane_count,
    }
}

fn place(
    bounds: &SpanBounds,
    lane: usize,
    grid_left: f64,
    top: f64,
    bottom: f64,
    config: &LaneConfig,
    measurer: &dyn TextMeasure,
) -> SpanPlacement {
    let rail_x = grid_left - (config.inset + lane as f64 * config.spacing);
    let mid_y = (top + bottom) / 2.0;

    // a pill never reaches past the next lane's rail
    let max_w = (config.spacing - config.pill_gap).max(config.pill_height);
    let text_width = measurer.measure(&bounds.span.title, config.font_size);
    let pill_w = (text_width + 2.0 * config.pill_padding)
        .max(config.pill_min_width)
        .min(max_w);
    let pill_text = fit_text(
        &bounds.span.title,
        pill_w - 2.0 * config.pill_padding,
        config.font_size,
        measurer,
    );
    let pill_right = rail_x - config.pill_gap;
    let pill = Rect::new(
        pill_right - pill_w,
        mid_y - config.pill_height / 2.0,
        pill_w,
        config.pill_height,
    );

    let rail_top = Point::new(rail_x, top);
    let rail_bottom = Point::new(rail_x, bottom);
    let (end_cap, tail) = if bounds.open_ended {
        (None, Some((rail_bottom, rail_bottom.offset(0.0, config.tail_length))))
    } else {
        (Some(rail_bottom), None)
    };

    SpanPlacement {
        span_id: bounds.span.id.clone(),
        title: bounds.span.title.clone(),
        color: bounds.span.color,
        lane,
        open_ended: bounds.open_ended,
        pill,
        pill_text,
        connector: (Point::new(pill_right, mid_y), Point::new(rail_x, mid_y)),
        rail_top,
        rail_bottom,
        start_cap: rail_top,
        end_cap,
        tail,
    }
}

/// Longest prefix of `text` that fits `max_width` once suffixed with `…`.
fn fit_text(text: &str, max_width: f64, font_size: f64, measurer: &dyn TextMeasure) -> String {
    if measurer.measure(text, font_size) <= max_width {
        return text.to_string();
    }
    let mut fitted = String::new();
    let mut prefix = String::new();
    for ch in text.chars() {
        prefix.push(ch);
        let candidate = format!("{}…", prefix.trim_end());
        if measurer.measure(&candidate, font_size) > max_width {
            break;
        }
        fitted = candidate;
    }
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::labels::ApproxMeasure;
    use crate::model::{LifeProfile, Span, TemporalSnapshot};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn bounds(id: &str, start: usize, end: usize) -> SpanBounds {
        SpanBounds {
            span: Span {
                id: id.into(),
                title: id.into(),
                start: NaiveDate::default(),
                end: None,
                color: Color::rgb(1, 2, 3),
            },
            start_week_index: start,
            end_week_index: end,
            open_ended: false,
        }
    }

    fn field(years: u32) -> CellField {
        let birth = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        let snap = TemporalSnapshot::build(&LifeProfile::new(birth, years), birth);
        let snap = snap.unwrap_or_default();
        CellField::build(&snap.weeks, &snap.spans, &GridConfig::default().layout)
    }

    #[test]
    fn overlapping_spans_get_separate_lanes() {
        let a = bounds("a", 0, 30);
        let b = bounds("b", 10, 20);
        let c = bounds("c", 31, 40);
        assert_eq!(assign_lanes(&[&a, &b, &c]), vec![0, 1, 0]);
    }

    #[test]
    fn earlier_year_frees_a_lane() {
        // ends in year 0, next starts in year 1 at the same week index
        let a = bounds("a", 10, 52);
        let b = bounds("b", 52, 60);
        assert_eq!(assign_lanes(&[&a, &b]), vec![0, 1]);
        let a = bounds("a", 10, 51);
        let b = bounds("b", 51, 60);
        assert_eq!(assign_lanes(&[&a, &b]), vec![0, 1]);
        let b = bounds("b", 52, 60);
        assert_eq!(assign_lanes(&[&a, &b]), vec![0, 0]);
    }

    #[test]
    fn lowest_free_lane_is_reused() {
        let spans = [
            bounds("a", 0, 100),
            bounds("b", 5, 10),
            bounds("c", 6, 200),
            bounds("d", 11, 12),
        ];
        let refs: Vec<&SpanBounds> = spans.iter().collect();
        assert_eq!(assign_lanes(&refs), vec![0, 1, 2, 1]);
    }

    #[test]
    fn geometry_follows_lane_and_cells() {
        let field = field(3);
        let config = LaneConfig::default();
        let mut open = bounds("open", 60, 120);
        open.open_ended = true;
        let spans = vec![open, bounds("closed", 0, 70)];
        let layout = layout_spans(&spans, &field, &config, &ApproxMeasure::default());
        assert_eq!(layout.lane_count, 2);

        let closed = &layout.placements[0];
        assert_eq!(closed.span_id, "closed");
        assert_eq!(closed.lane, 0);
        assert_eq!(closed.rail_top.x, -config.inset);
        assert_eq!(closed.rail_top.y, field.cells()[0].base_position.y);
        assert_eq!(closed.rail_bottom.y, field.cells()[70].base_position.y);
        assert_eq!(closed.end_cap, Some(closed.rail_bottom));
        assert!(closed.tail.is_none());
        assert_eq!(closed.pill.w, config.pill_min_width);
        assert!((closed.pill.right() - (closed.rail_top.x - config.pill_gap)).abs() < 1e-9);
        let mid = (closed.rail_top.y + closed.rail_bottom.y) / 2.0;
        assert!((closed.pill.center().y - mid).abs() < 1e-9);
        assert_eq!(closed.connector.1, Point::new(closed.rail_top.x, mid));

        let open = &layout.placements[1];
        assert_eq!(open.lane, 1);
        assert_eq!(open.rail_top.x, -(config.inset + config.spacing));
        assert!(open.end_cap.is_none());
        assert!(open.tail.is_some());
    }

    #[test]
    fn pill_grows_with_long_titles() {
        let field = field(1);
        let config = LaneConfig::default();
        let mut long = bounds("long", 0, 5);
        long.span.title = "Long span title".into();
        let layout = layout_spans(&[long], &field, &config, &ApproxMeasure::default());
        let expected = ApproxMeasure::default().measure("Long span title", config.font_size)
            + 2.0 * config.pill_padding;
        assert!((layout.placements[0].pill.w - expected).abs() < 1e-9);
        assert_eq!(layout.placements[0].pill_text, "Long span title");
    }

    #[test]
    fn oversized_titles_stay_clear_of_the_next_lane() {
        let field = field(2);
        let config = LaneConfig::default();
        let measure = ApproxMeasure::default();
        let title = "An exceptionally long title for a span annotation";
        let mut wide = bounds("wide", 0, 60);
        wide.span.title = title.into();
        let spans = vec![wide, bounds("other", 10, 30)];
        let layout = layout_spans(&spans, &field, &config, &measure);
        assert_eq!(layout.lane_count, 2);

        let first = &layout.placements[0];
        let next_rail = layout.placements[1].rail_top.x;
        assert!(first.pill.x >= next_rail - 1e-9);
        assert_eq!(first.title, title);
        assert!(first.pill_text.ends_with('…'));
        assert!(title.starts_with(first.pill_text.trim_end_matches('…')));
        let text_w = measure.measure(&first.pill_text, config.font_size);
        assert!(text_w <= first.pill.w - 2.0 * config.pill_padding + 1e-9);
    }

    #[test]
    fn spans_without_cells_are_skipped() {
        let field = field(1);
        let spans = vec![bounds("inside", 0, 3), bounds("outside", 10, 400)];
        let layout = layout_spans(&spans, &field, &LaneConfig::default(), &ApproxMeasure::default());
        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.placements[0].span_id, "inside");

        let empty = layout_spans(&spans, &CellField::default(), &LaneConfig::default(), &ApproxMeasure::default());
        assert!(empty.placements.is_empty());
        assert_eq!(empty.lane_count, 0);
    }

    proptest! {
        #[test]
        fn lane_assignment_is_deterministic_and_valid(
            raw in proptest::collection::vec((0usize..500, 0usize..120), 0..40),
        ) {
            let mut spans: Vec<SpanBounds> = raw
                .iter()
                .enumerate()
                .map(|(i, &(start, len))| bounds(&format!("s{i}"), start, start + len))
                .collect();
            spans.sort_by_key(|b| (b.start_week_index, b.end_week_index));
            let refs: Vec<&SpanBounds> = spans.iter().collect();
            let first = assign_lanes(&refs);
            prop_assert_eq!(&first, &assign_lanes(&refs));

            let lane_count = first.iter().max().map_or(0, |l| l + 1);
            for lane in 0..lane_count {
                let members: Vec<&SpanBounds> = refs
                    .iter()
                    .zip(&first)
                    .filter(|(_, l)| **l == lane)
                    .map(|(b, _)| *b)
                    .collect();
                prop_assert!(!members.is_empty());
                for pair in members.windows(2) {
                    let (prev, next) = (pair[0], pair[1]);
                    prop_assert!(
                        prev.end_week_index < next.start_week_index
                            || prev.end_week_index / 52 < next.start_week_index / 52
                    );
                }
            }
        }
    }
}
