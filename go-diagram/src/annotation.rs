use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::error::DiagramError;
use crate::source::{DiagramConfig, ParsedBoard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Label,
    Triangle,
    Square,
    Circle,
    Cross,
}

/// A marking the renderer draws on a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub point: Point,
    pub label: Option<String>,
    pub shape: Shape,
}

/// A point tinted by an area prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub point: Point,
    pub color: String,
}

/// Turn the board's marks into annotations.
///
/// Marks listed under a shape key are drawn as that shape; every other mark
/// becomes a text label unless it is in `hidden`.
pub fn annotate(
    parsed: &ParsedBoard,
    config: &DiagramConfig,
    hidden: &BTreeSet<&str>,
) -> Result<Vec<Annotation>, DiagramError> {
    let mut annotations = Vec::new();
    let mut shaped = BTreeSet::new();

    for (shape, marks) in &config.shapes {
        for mark in marks {
            for &point in parsed.mark_points(mark)? {
                annotations.push(Annotation {
                    point,
                    label: None,
                    shape: *shape,
                });
            }
            shaped.insert(mark.as_str());
        }
    }

    for (mark, points) in &parsed.other_marks {
        if shaped.contains(mark.as_str()) || hidden.contains(mark.as_str()) {
            continue;
        }
        annotations.extend(points.iter().map(|&point| Annotation {
            point,
            label: Some(mark.clone()),
            shape: Shape::Label,
        }));
    }

    annotations.sort_by_key(|a| (a.point.1, a.point.0, a.shape));
    Ok(annotations)
}

/// Resolve each prefixed point to its configured color.
pub fn areas(parsed: &ParsedBoard, config: &DiagramConfig) -> Vec<Area> {
    parsed
        .area_prefixes
        .iter()
        .filter_map(|(&point, prefix)| {
            config.area_colors.get(prefix).map(|color| Area {
                point,
                color: color.clone(),
            })
        })
        .collect()
}
