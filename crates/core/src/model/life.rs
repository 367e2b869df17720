use chrono::NaiveDate;
use lifegrid_protocol::Color;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Longest life expectancy the grid will lay out.
pub const MAX_LIFE_EXPECTANCY_YEARS: u32 = 150;

/// A point-in-time marker, attached to the week that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
}

/// A named time range rendered as an annotation beside the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Unique within a profile.
    pub id: String,
    pub title: String,
    pub start: NaiveDate,
    /// `None` means the span is still ongoing.
    #[serde(default)]
    pub end: Option<NaiveDate>,
    pub color: Color,
}

impl Span {
    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }
}

/// Everything the temporal model needs to produce a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeProfile {
    pub birth_date: NaiveDate,
    pub life_expectancy_years: u32,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl LifeProfile {
    pub fn new(birth_date: NaiveDate, life_expectancy_years: u32) -> Self {
        Self {
            birth_date,
            life_expectancy_years,
            events: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Parse a profile from JSON and validate it.
    pub fn from_json(data: &str) -> Result<Self, ModelError> {
        let profile: LifeProfile = serde_json::from_str(data)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.life_expectancy_years == 0
            || self.life_expectancy_years > MAX_LIFE_EXPECTANCY_YEARS
        {
            return Err(ModelError::InvalidLifeExpectancy(self.life_expectancy_years));
        }
        Ok(())
    }

    /// A small built-in profile used by the shells at startup.
    pub fn demo() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self {
            birth_date: date(1990, 6, 15),
            life_expectancy_years: 80,
            events: vec![
                Event {
                    id: "first-job".into(),
                    title: "First job".into(),
                    date: date(2012, 9, 3),
                },
                Event {
                    id: "moved".into(),
                    title: "Moved abroad".into(),
                    date: date(2018, 4, 21),
                },
            ],
            spans: vec![
                Span {
                    id: "school".into(),
                    title: "School".into(),
                    start: date(1996, 9, 1),
                    end: Some(date(2008, 6, 30)),
                    color: Color::rgb(0x89, 0xb4, 0xfa),
                },
                Span {
                    id: "university".into(),
                    title: "University".into(),
                    start: date(2008, 10, 1),
                    end: Some(date(2012, 7, 15)),
                    color: Color::rgb(0xcb, 0xa6, 0xf7),
                },
                Span {
                    id: "band".into(),
                    title: "Played in a band".into(),
                    start: date(2006, 3, 1),
                    end: Some(date(2011, 11, 1)),
                    color: Color::rgb(0xfa, 0xb3, 0x87),
                },
                Span {
                    id: "career".into(),
                    title: "Career".into(),
                    start: date(2012, 9, 3),
                    end: None,
                    color: Color::rgb(0xa6, 0xe3, 0xa1),
                },
            ],
        }
    }
}
