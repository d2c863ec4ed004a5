use std::collections::{BTreeMap, BTreeSet};

use crate::Point;
use crate::board::{Board, MAX_SIZE, MIN_SIZE};
use crate::error::{DiagramError, describe};
use crate::stone::Stone;

/// Where the board rows and the configuration block sit within the source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSplit<'a> {
    pub rows: Vec<&'a str>,
    pub config_start_index: usize,
}

/// Validation switches chosen by the diagram type.
#[derive(Debug, Clone, Default)]
pub struct GridOptions {
    pub size: Option<u8>,
    pub prefixes: BTreeSet<char>,
    pub strict: bool,
    pub unique_marks: bool,
    pub allow_empty: bool,
}

/// The validated board of a diagram source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBoard {
    pub board: Board,
    pub row_count: u8,
    pub column_count: u8,
    /// Every token that is neither a stone nor empty, keyed by its literal text.
    pub other_marks: BTreeMap<String, Vec<Point>>,
    pub area_prefixes: BTreeMap<Point, char>,
    pub config_start_index: usize,
}

enum Token<'a> {
    Empty,
    Stone(Stone),
    Mark(&'a str),
}

/// Collect the board rows that follow the keyword on line 0.
///
/// Leading blank lines are skipped; the run of rows ends at a blank line, a
/// `---` separator or a `key:value` line. The configuration starts at the
/// first line after the rows that is neither blank nor `---`.
pub fn split_rows<'a>(lines: &[&'a str], keyword_index: usize) -> RowSplit<'a> {
    let mut i = keyword_index + 1;
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }

    let mut rows = Vec::new();
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() || line == "---" || looks_like_config(line) {
            break;
        }
        rows.push(line);
        i += 1;
    }

    while i < lines.len() && (lines[i].trim().is_empty() || lines[i].trim() == "---") {
        i += 1;
    }

    RowSplit {
        rows,
        config_start_index: i,
    }
}

/// `identifier:` at the start of a line, where the identifier is a letter
/// followed by letters, digits or dashes.
pub fn looks_like_config(line: &str) -> bool {
    let Some((key, _)) = line.split_once(':') else {
        return false;
    };
    let mut chars = key.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl ParsedBoard {
    pub fn parse(split: &RowSplit<'_>, options: &GridOptions) -> Result<Self, DiagramError> {
        let rows: Vec<Vec<&str>> = split
            .rows
            .iter()
            .map(|row| row.split_whitespace().collect())
            .collect();

        if rows.is_empty() {
            return Self::empty(split, options);
        }

        let columns = rows[0].len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(DiagramError::MalformedBoard(format!(
                "row {} has {} points but row 1 has {columns}",
                i + 1,
                row.len()
            )));
        }

        let (row_count, column_count) = (rows.len(), columns);
        let size = match options.size {
            Some(size) => {
                if row_count > size as usize || column_count > size as usize {
                    return Err(DiagramError::SizeConflict(format!(
                        "a {row_count}x{column_count} board does not fit in size {size}"
                    )));
                }
                size
            }
            None => {
                if row_count != column_count {
                    return Err(DiagramError::SizeConflict(format!(
                        "{row_count} rows and {column_count} columns need an explicit size"
                    )));
                }
                if !(MIN_SIZE as usize..=MAX_SIZE as usize).contains(&row_count) {
                    return Err(DiagramError::SizeConflict(format!(
                        "board size must be between {MIN_SIZE} and {MAX_SIZE}, got {row_count}"
                    )));
                }
                row_count as u8
            }
        };

        let mut board = Board::new(size);
        let mut other_marks: BTreeMap<String, Vec<Point>> = BTreeMap::new();
        let mut area_prefixes = BTreeMap::new();

        for (row, tokens) in rows.iter().enumerate() {
            for (col, &raw) in tokens.iter().enumerate() {
                let point = (col as u8, row as u8);
                let text = match strip_prefix(raw, &options.prefixes) {
                    Some((prefix, rest)) => {
                        area_prefixes.insert(point, prefix);
                        rest
                    }
                    None => raw,
                };
                match classify(text) {
                    Token::Empty => {}
                    Token::Stone(stone) => {
                        board = board.place_unchecked(point, Some(stone)).map_err(|e| {
                            DiagramError::MalformedBoard(format!("{e} at {}", describe(point)))
                        })?;
                    }
                    Token::Mark(mark) if options.strict => {
                        return Err(DiagramError::MalformedBoard(format!(
                            "unexpected token '{mark}' at {}",
                            describe(point)
                        )));
                    }
                    Token::Mark(mark) => other_marks.entry(mark.to_string()).or_default().push(point),
                }
            }
        }

        if options.unique_marks {
            if let Some((mark, points)) = other_marks.iter().find(|(_, pts)| pts.len() > 1) {
                return Err(DiagramError::MarkError(format!(
                    "mark '{mark}' appears {} times; marks must be unique",
                    points.len()
                )));
            }
        }

        Ok(ParsedBoard {
            board,
            row_count: row_count as u8,
            column_count: column_count as u8,
            other_marks,
            area_prefixes,
            config_start_index: split.config_start_index,
        })
    }

    fn empty(split: &RowSplit<'_>, options: &GridOptions) -> Result<Self, DiagramError> {
        if !options.allow_empty {
            return Err(DiagramError::MalformedBoard("the board has no rows".to_string()));
        }
        let Some(size) = options.size else {
            return Err(DiagramError::MalformedBoard(
                "an empty board needs an explicit size".to_string(),
            ));
        };
        Ok(ParsedBoard {
            board: Board::new(size),
            row_count: size,
            column_count: size,
            other_marks: BTreeMap::new(),
            area_prefixes: BTreeMap::new(),
            config_start_index: split.config_start_index,
        })
    }

    /// Resolve a mark that must label exactly one point.
    pub fn mark_point(&self, mark: &str) -> Result<Point, DiagramError> {
        match self.other_marks.get(mark).map(Vec::as_slice) {
            Some([point]) => Ok(*point),
            Some(points) if points.len() > 1 => Err(DiagramError::MarkError(format!(
                "mark '{mark}' labels {} points",
                points.len()
            ))),
            _ => Err(DiagramError::MarkError(format!(
                "mark '{mark}' is not on the board"
            ))),
        }
    }

    /// All points labelled by a mark, which must be present.
    pub fn mark_points(&self, mark: &str) -> Result<&[Point], DiagramError> {
        self.other_marks
            .get(mark)
            .map(Vec::as_slice)
            .ok_or_else(|| DiagramError::MarkError(format!("mark '{mark}' is not on the board")))
    }

    /// Whether a point lies inside the displayed window.
    pub fn contains(&self, (col, row): Point) -> bool {
        col < self.column_count && row < self.row_count
    }
}

fn strip_prefix<'a>(token: &'a str, prefixes: &BTreeSet<char>) -> Option<(char, &'a str)> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    (!rest.is_empty() && prefixes.contains(&first)).then_some((first, rest))
}

fn classify(token: &str) -> Token<'_> {
    match token {
        "." | "+" => Token::Empty,
        "X" | "x" => Token::Stone(Stone::Black),
        "O" | "o" => Token::Stone(Stone::White),
        mark => Token::Mark(mark),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> RowSplit<'_> {
        let lines: Vec<&str> = text.lines().collect();
        split_rows(&lines, 0)
    }

    fn parse(text: &str, options: &GridOptions) -> Result<ParsedBoard, DiagramError> {
        ParsedBoard::parse(&split(text), options)
    }

    #[test]
    fn splits_rows_from_config() {
        let lines = ["static", "", ". X", "O a", "", "---", "size: 5"];
        let split = split_rows(&lines, 0);
        assert_eq!(split.rows, vec![". X", "O a"]);
        assert_eq!(split.config_start_index, 6);
    }

    #[test]
    fn rows_stop_at_key_value_line() {
        let lines = ["problem", ". X", "X .", "to-play: white"];
        let split = split_rows(&lines, 0);
        assert_eq!(split.rows.len(), 2);
        assert_eq!(split.config_start_index, 3);
    }

    #[test]
    fn detects_config_lines() {
        assert!(looks_like_config("area-colors:"));
        assert!(looks_like_config("size: 9"));
        assert!(!looks_like_config("a b c"));
        assert!(!looks_like_config(": x"));
        assert!(!looks_like_config("1: a"));
    }

    #[test]
    fn classifies_tokens() {
        let parsed = parse("static\n. X a\nO + 12\nx o b", &GridOptions::default()).unwrap();
        let board = &parsed.board;
        assert_eq!(board.size(), 3);
        assert_eq!(board.stone_at((1, 0)), Some(Stone::Black));
        assert_eq!(board.stone_at((0, 1)), Some(Stone::White));
        assert_eq!(board.stone_at((0, 2)), Some(Stone::Black));
        assert_eq!(board.stone_at((1, 2)), Some(Stone::White));
        assert_eq!(parsed.other_marks["a"], vec![(2, 0)]);
        assert_eq!(parsed.other_marks["12"], vec![(2, 1)]);
    }

    #[test]
    fn every_token_lands_inside_the_window() {
        let options = GridOptions {
            size: Some(9),
            ..GridOptions::default()
        };
        let parsed = parse("static\nX a .\nb O c", &options).unwrap();
        assert_eq!((parsed.row_count, parsed.column_count), (2, 3));
        let marked: usize = parsed.other_marks.values().map(Vec::len).sum();
        let stones = parsed.board.stones().iter().filter(|&&s| s != 0).count();
        assert_eq!(marked + stones + 1, 6);
        assert!(parsed.other_marks.values().flatten().all(|&p| parsed.contains(p)));
        assert!(parsed.board.points_of(Stone::Black).all(|p| parsed.contains(p)));
        assert!(!parsed.contains((3, 0)));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse("static\n. .\n. . .", &GridOptions::default()).unwrap_err();
        assert!(matches!(err, DiagramError::MalformedBoard(_)));
    }

    #[test]
    fn rectangular_board_needs_size() {
        let err = parse("static\n. . .", &GridOptions::default()).unwrap_err();
        assert!(matches!(err, DiagramError::SizeConflict(_)));
    }

    #[test]
    fn board_larger_than_size_conflicts() {
        let options = GridOptions {
            size: Some(2),
            ..GridOptions::default()
        };
        let err = parse("static\n. . .\n. . .\n. . .", &options).unwrap_err();
        assert!(matches!(err, DiagramError::SizeConflict(_)));
    }

    #[test]
    fn strict_rejects_marks() {
        let options = GridOptions {
            strict: true,
            ..GridOptions::default()
        };
        let err = parse("freeplay\n. a\n. .", &options).unwrap_err();
        assert_eq!(
            err,
            DiagramError::MalformedBoard("unexpected token 'a' at column 2, row 1".to_string())
        );
    }

    #[test]
    fn strips_area_prefixes() {
        let options = GridOptions {
            prefixes: BTreeSet::from(['r']),
            ..GridOptions::default()
        };
        let parsed = parse("static\nrX r.\nr b", &options).unwrap();
        assert_eq!(parsed.board.stone_at((0, 0)), Some(Stone::Black));
        assert_eq!(parsed.area_prefixes.get(&(1, 0)), Some(&'r'));
        // A lone prefix letter is a mark, not an area.
        assert_eq!(parsed.other_marks["r"], vec![(0, 1)]);
        assert!(!parsed.area_prefixes.contains_key(&(0, 1)));
    }

    #[test]
    fn duplicate_marks_only_rejected_when_required() {
        let text = "static\na .\n. a";
        let parsed = parse(text, &GridOptions::default()).unwrap();
        assert_eq!(parsed.other_marks["a"].len(), 2);
        assert!(parsed.mark_point("a").is_err());

        let options = GridOptions {
            unique_marks: true,
            ..GridOptions::default()
        };
        assert!(matches!(parse(text, &options), Err(DiagramError::MarkError(_))));
    }

    #[test]
    fn empty_board_requires_permission_and_size() {
        assert!(parse("freeplay\n\nsize: 9", &GridOptions::default()).is_err());

        let no_size = GridOptions {
            allow_empty: true,
            ..GridOptions::default()
        };
        assert!(parse("freeplay", &no_size).is_err());

        let options = GridOptions {
            allow_empty: true,
            size: Some(9),
            ..GridOptions::default()
        };
        let parsed = parse("freeplay", &options).unwrap();
        assert_eq!((parsed.row_count, parsed.column_count), (9, 9));
        assert!(parsed.board.is_empty());
    }
}
