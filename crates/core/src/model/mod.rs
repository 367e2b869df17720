pub mod life;
pub mod weeks;

pub use life::{Event, LifeProfile, MAX_LIFE_EXPECTANCY_YEARS, Span};
pub use weeks::{
    SpanBounds, TemporalSnapshot, WEEKS_PER_YEAR, WeekInterval, generate_weeks, spans_with_bounds,
};
