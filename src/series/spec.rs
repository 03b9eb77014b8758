use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Display attributes – opaque to the core, read by the renderer
// ---------------------------------------------------------------------------

/// Colour and line thickness handed through to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayAttributes {
    /// sRGB colour as `[r, g, b]`.
    pub color: [u8; 3],
    pub thickness: f32,
}

impl Default for DisplayAttributes {
    fn default() -> Self {
        Self {
            color: [128, 128, 128],
            thickness: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesSpec
// ---------------------------------------------------------------------------

/// One series to extract: a name, the column its values come from, and how
/// the renderer should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub name: String,
    pub column: String,
    pub display: DisplayAttributes,
}

impl SeriesSpec {
    /// A series named after its column.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            column,
            display: DisplayAttributes::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_display(mut self, display: DisplayAttributes) -> Self {
        self.display = display;
        self
    }
}

// ---------------------------------------------------------------------------
// Months, seasons and presets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(n: u32) -> Option<Month> {
        n.checked_sub(1)
            .and_then(|i| Month::ALL.get(i as usize))
            .copied()
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// Column name in the wide layout, e.g. `Jan_Value`.
    pub fn column(self) -> String {
        format!("{}_Value", self.abbrev())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn months(self) -> [Month; 3] {
        match self {
            Season::Winter => [Month::Dec, Month::Jan, Month::Feb],
            Season::Spring => [Month::Mar, Month::Apr, Month::May],
            Season::Summer => [Month::Jun, Month::Jul, Month::Aug],
            Season::Autumn => [Month::Sep, Month::Oct, Month::Nov],
        }
    }
}

/// Named month selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesPreset {
    AllMonths,
    /// Jan, Apr, Jul, Oct.
    Quarterly,
    Season(Season),
}

impl SeriesPreset {
    pub fn months(self) -> Vec<Month> {
        match self {
            SeriesPreset::AllMonths => Month::ALL.to_vec(),
            SeriesPreset::Quarterly => vec![Month::Jan, Month::Apr, Month::Jul, Month::Oct],
            SeriesPreset::Season(season) => season.months().to_vec(),
        }
    }

    /// Value-column names for the preset, in month order of the preset.
    pub fn columns(self) -> Vec<String> {
        self.months().into_iter().map(Month::column).collect()
    }
}
