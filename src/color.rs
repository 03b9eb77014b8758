use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::series::spec::{DisplayAttributes, Month};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

/// Fixed month colours of the sea-ice charts, keyed by column name.
pub fn month_colors() -> BTreeMap<String, [u8; 3]> {
    Month::ALL
        .iter()
        .map(|&m| {
            let color = match m {
                Month::Jan => [0, 0, 255],
                Month::Feb => [0, 255, 255],
                Month::Mar => [0, 128, 0],
                Month::Apr => [128, 128, 0],
                Month::May => [255, 255, 0],
                Month::Jun => [255, 165, 0],
                Month::Jul => [255, 0, 0],
                Month::Aug => [139, 69, 19],
                Month::Sep => [128, 0, 128],
                Month::Oct => [238, 130, 238],
                Month::Nov => [128, 128, 128],
                Month::Dec => [0, 0, 0],
            };
            (m.column(), color)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Display attribute assignment: series name → attributes
// ---------------------------------------------------------------------------

/// Resolve display attributes for each `(series name, column)` pair, keyed
/// by series name.
///
/// Explicit entries (by name) win, then the month colours (by column, with
/// default thickness), then evenly spaced hues for whatever is left.
pub fn assign_display(
    series: &[(String, String)],
    explicit: &BTreeMap<String, DisplayAttributes>,
) -> BTreeMap<String, DisplayAttributes> {
    let months = month_colors();
    let mut assigned = BTreeMap::new();
    let mut unassigned = Vec::new();

    for (name, column) in series {
        if let Some(attrs) = explicit.get(name) {
            assigned.insert(name.clone(), *attrs);
        } else if let Some(color) = months.get(column) {
            assigned.insert(
                name.clone(),
                DisplayAttributes {
                    color: *color,
                    ..DisplayAttributes::default()
                },
            );
        } else {
            unassigned.push(name.clone());
        }
    }

    let palette = generate_palette(unassigned.len());
    for (name, color) in unassigned.into_iter().zip(palette) {
        assigned.insert(
            name,
            DisplayAttributes {
                color,
                ..DisplayAttributes::default()
            },
        );
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn explicit_then_month_then_generated() {
        let series: Vec<(String, String)> = [
            ("Jan_Value", "Jan_Value"),
            ("Jul_Value", "Jul_Value"),
            ("Arctic", "north"),
            ("Antarctic", "south"),
        ]
        .iter()
        .map(|(n, c)| (n.to_string(), c.to_string()))
        .collect();
        let mut explicit = BTreeMap::new();
        explicit.insert(
            "Jul_Value".to_string(),
            DisplayAttributes {
                color: [1, 2, 3],
                thickness: 4.0,
            },
        );

        let assigned = assign_display(&series, &explicit);
        assert_eq!(assigned.len(), 4);
        assert_eq!(assigned["Jan_Value"].color, [0, 0, 255]);
        assert_eq!(assigned["Jul_Value"].thickness, 4.0);
        assert_ne!(assigned["Arctic"].color, assigned["Antarctic"].color);
    }

    #[test]
    fn month_colour_follows_the_column() {
        let series = vec![
            ("January".to_string(), "Jan_Value".to_string()),
            ("Jan_Value".to_string(), "extent".to_string()),
        ];
        let assigned = assign_display(&series, &BTreeMap::new());
        assert_eq!(assigned["January"].color, [0, 0, 255]);
        assert_ne!(assigned["Jan_Value"].color, [0, 0, 255]);
    }
}
