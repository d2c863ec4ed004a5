use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::annotation::Shape;
use crate::board::{MAX_SIZE, MIN_SIZE};
use crate::error::DiagramError;
use crate::stone::Stone;

/// One YAML scalar, kept as the text it was written as.
///
/// Marks such as `1` or `12` arrive as numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ListItem {
    pub fn text(&self) -> String {
        match self {
            ListItem::Text(s) => s.clone(),
            ListItem::Int(n) => n.to_string(),
            ListItem::Float(x) => x.to_string(),
            ListItem::Bool(b) => b.to_string(),
        }
    }
}

/// A list option written either as `a, b, c` or as a YAML sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListValue {
    Joined(ListItem),
    List(Vec<ListItem>),
}

impl ListValue {
    pub fn items(&self) -> Vec<String> {
        let texts: Vec<String> = match self {
            ListValue::Joined(item) => item.text().split(',').map(str::to_string).collect(),
            ListValue::List(items) => items.iter().map(ListItem::text).collect(),
        };
        texts
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Target of an entry in the `moves` table: an earlier move number or a board mark.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MoveRef {
    Number(i64),
    Mark(String),
}

/// The configuration block as written, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    size: Option<i64>,
    #[serde(default)]
    area_colors: BTreeMap<String, String>,
    black: Option<ListValue>,
    white: Option<ListValue>,
    triangles: Option<ListValue>,
    squares: Option<ListValue>,
    circles: Option<ListValue>,
    crosses: Option<ListValue>,
    solutions: Option<ListValue>,
    sequences: Option<ListValue>,
    to_play: Option<String>,
    turn: Option<String>,
    ko: Option<bool>,
    #[serde(default)]
    moves: BTreeMap<i64, MoveRef>,
    initial_move: Option<i64>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_yaml::Value>,
}

/// Whose stone a freeplay click places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnMode {
    Black,
    White,
    #[default]
    Alternate,
}

impl std::str::FromStr for TurnMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(TurnMode::Black),
            "white" => Ok(TurnMode::White),
            "alternate" => Ok(TurnMode::Alternate),
            _ => Err(format!("invalid turn mode: {s}")),
        }
    }
}

/// Validated diagram configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramConfig {
    pub size: Option<u8>,
    pub area_colors: BTreeMap<char, String>,
    pub black: Vec<String>,
    pub white: Vec<String>,
    pub shapes: Vec<(Shape, Vec<String>)>,
    pub solutions: Vec<String>,
    pub sequences: Vec<String>,
    pub to_play: Option<Stone>,
    pub turn: TurnMode,
    pub ko: bool,
    pub moves: BTreeMap<i64, MoveRef>,
    pub initial_move: Option<i64>,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        DiagramConfig {
            size: None,
            area_colors: BTreeMap::new(),
            black: Vec::new(),
            white: Vec::new(),
            shapes: Vec::new(),
            solutions: Vec::new(),
            sequences: Vec::new(),
            to_play: None,
            turn: TurnMode::default(),
            ko: true,
            moves: BTreeMap::new(),
            initial_move: None,
        }
    }
}

impl DiagramConfig {
    /// Parse the `key: value` block that follows the board rows.
    pub fn parse(lines: &[&str]) -> Result<Self, DiagramError> {
        let text = lines
            .iter()
            .map(|line| quote_wildcard(line))
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Ok(DiagramConfig::default());
        }
        let raw: RawConfig =
            serde_yaml::from_str(&text).map_err(|e| DiagramError::ConfigError(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, DiagramError> {
        for key in raw.unknown.keys() {
            tracing::warn!("ignoring unknown diagram option '{key}'");
        }

        let size = raw
            .size
            .map(|size| match u8::try_from(size) {
                Ok(s) if (MIN_SIZE..=MAX_SIZE).contains(&s) => Ok(s),
                _ => Err(DiagramError::ConfigError(format!(
                    "size must be between {MIN_SIZE} and {MAX_SIZE}, got {size}"
                ))),
            })
            .transpose()?;

        let mut area_colors = BTreeMap::new();
        for (prefix, color) in raw.area_colors {
            let mut chars = prefix.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_lowercase() => {
                    area_colors.insert(c, color);
                }
                _ => {
                    return Err(DiagramError::ConfigError(format!(
                        "area prefix '{prefix}' must be a single lowercase letter"
                    )));
                }
            }
        }

        let to_play = raw
            .to_play
            .map(|s| {
                s.parse::<Stone>()
                    .map_err(|_| invalid_value("to-play", &s, "black, white"))
            })
            .transpose()?;
        let turn = raw
            .turn
            .map(|s| {
                s.parse::<TurnMode>()
                    .map_err(|_| invalid_value("turn", &s, "black, white, alternate"))
            })
            .transpose()?
            .unwrap_or_default();

        let list = |value: Option<ListValue>| value.map(|v| v.items()).unwrap_or_default();
        let shapes = [
            (Shape::Triangle, raw.triangles),
            (Shape::Square, raw.squares),
            (Shape::Circle, raw.circles),
            (Shape::Cross, raw.crosses),
        ]
        .into_iter()
        .map(|(shape, marks)| (shape, list(marks)))
        .filter(|(_, marks)| !marks.is_empty())
        .collect();

        Ok(DiagramConfig {
            size,
            area_colors,
            black: list(raw.black),
            white: list(raw.white),
            shapes,
            solutions: list(raw.solutions),
            sequences: list(raw.sequences),
            to_play,
            turn,
            ko: raw.ko.unwrap_or(true),
            moves: raw.moves,
            initial_move: raw.initial_move,
        })
    }
}

/// YAML reads a value starting with `*` as an alias, so a path that opens
/// with a wildcard is single-quoted first. Covers `key: *>b` and `- *>b`.
fn quote_wildcard(line: &str) -> Cow<'_, str> {
    let value_start = match line.trim_start().strip_prefix('-') {
        Some(rest) if rest.starts_with(' ') => line.len() - rest.len(),
        _ => match line.find(':') {
            Some(i) => i + 1,
            None => return Cow::Borrowed(line),
        },
    };
    let (head, value) = line.split_at(value_start);
    let value = value.trim();
    if !value.starts_with('*') {
        return Cow::Borrowed(line);
    }
    Cow::Owned(format!("{head} '{}'", value.replace('\'', "''")))
}

fn invalid_value(key: &str, value: &str, expected: &str) -> DiagramError {
    DiagramError::ConfigError(format!(
        "invalid value '{value}' for {key}; expected one of: {expected}"
    ))
}
