//! Line-oriented save format.
//!
//! ```text
//! score foods_eaten easy wrap speed b_active b_x b_y b_lifetime b_cooldown h_active h_x h_y h_cooldown
//! food_x food_y
//! body_length
//! x y            (one line per segment, head first)
//! heading_x heading_y
//! ```
//!
//! Both directions walk the same [`Field`] lists, so the writer and the
//! reader cannot drift apart.

use std::fmt::Write as _;

use crate::error::CodecError;
use crate::food::{FoodRules, Presence, TimedFood, BONUS_RULES, HAZARD_RULES};
use crate::game::{level_for, Foods, GameState, Modes, SpeedTier};
use crate::geometry::{Board, Direction, Position};
use crate::snake::Snake;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Field {
    Score,
    FoodsEaten,
    EasyMode,
    WrapMode,
    SpeedTier,
    BonusActive,
    BonusX,
    BonusY,
    BonusLifetime,
    BonusCooldown,
    HazardActive,
    HazardX,
    HazardY,
    HazardCooldown,
    FoodX,
    FoodY,
    BodyLength,
    SegmentX,
    SegmentY,
    HeadingX,
    HeadingY,
}

const HEADER: [Field; 14] = [
    Field::Score,
    Field::FoodsEaten,
    Field::EasyMode,
    Field::WrapMode,
    Field::SpeedTier,
    Field::BonusActive,
    Field::BonusX,
    Field::BonusY,
    Field::BonusLifetime,
    Field::BonusCooldown,
    Field::HazardActive,
    Field::HazardX,
    Field::HazardY,
    Field::HazardCooldown,
];
const REGULAR_FOOD: [Field; 2] = [Field::FoodX, Field::FoodY];
const SEGMENT: [Field; 2] = [Field::SegmentX, Field::SegmentY];
const HEADING: [Field; 2] = [Field::HeadingX, Field::HeadingY];

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Score => "score",
            Field::FoodsEaten => "foods eaten",
            Field::EasyMode => "easy mode",
            Field::WrapMode => "wrap mode",
            Field::SpeedTier => "speed tier",
            Field::BonusActive => "bonus active",
            Field::BonusX => "bonus x",
            Field::BonusY => "bonus y",
            Field::BonusLifetime => "bonus lifetime",
            Field::BonusCooldown => "bonus cooldown",
            Field::HazardActive => "hazard active",
            Field::HazardX => "hazard x",
            Field::HazardY => "hazard y",
            Field::HazardCooldown => "hazard cooldown",
            Field::FoodX => "food x",
            Field::FoodY => "food y",
            Field::BodyLength => "body length",
            Field::SegmentX => "segment x",
            Field::SegmentY => "segment y",
            Field::HeadingX => "heading x",
            Field::HeadingY => "heading y",
        }
    }

    /// Value written for this field. `segment` picks the body cell the
    /// segment fields refer to and is ignored by every other field.
    fn read(self, state: &GameState, segment: usize) -> i64 {
        let food = &state.food;
        match self {
            Field::Score => state.score.into(),
            Field::FoodsEaten => state.foods_eaten.into(),
            Field::EasyMode => state.modes.easy.into(),
            Field::WrapMode => state.modes.wrap.into(),
            Field::SpeedTier => speed_code(state.modes.speed),
            Field::BonusActive => food.bonus.is_active().into(),
            Field::BonusX => food.bonus.position().map_or(0, |p| p.x.into()),
            Field::BonusY => food.bonus.position().map_or(0, |p| p.y.into()),
            Field::BonusLifetime => food.bonus.remaining().unwrap_or(0).into(),
            Field::BonusCooldown => food.bonus.cooldown_left().into(),
            Field::HazardActive => food.hazard.is_active().into(),
            Field::HazardX => food.hazard.position().map_or(0, |p| p.x.into()),
            Field::HazardY => food.hazard.position().map_or(0, |p| p.y.into()),
            Field::HazardCooldown => food.hazard.cooldown_left().into(),
            Field::FoodX => food.regular.x.into(),
            Field::FoodY => food.regular.y.into(),
            Field::BodyLength => state.snake.len() as i64,
            Field::HeadingX => state.snake.direction().delta().0.into(),
            Field::HeadingY => state.snake.direction().delta().1.into(),
            Field::SegmentX => state.snake.body()[segment].x.into(),
            Field::SegmentY => state.snake.body()[segment].y.into(),
        }
    }
}

fn speed_code(tier: SpeedTier) -> i64 {
    match tier {
        SpeedTier::Slow => 0,
        SpeedTier::Normal => 1,
        SpeedTier::Fast => 2,
    }
}

fn write_fields(out: &mut String, state: &GameState, fields: &[Field], segment: usize) {
    let line: Vec<String> = fields.iter().map(|f| f.read(state, segment).to_string()).collect();
    let _ = writeln!(out, "{}", line.join(" "));
}

pub fn encode(state: &GameState) -> String {
    let mut out = String::new();

    write_fields(&mut out, state, &HEADER, 0);
    write_fields(&mut out, state, &REGULAR_FOOD, 0);
    write_fields(&mut out, state, &[Field::BodyLength], 0);
    for segment in 0..state.snake.len() {
        write_fields(&mut out, state, &SEGMENT, segment);
    }
    write_fields(&mut out, state, &HEADING, 0);

    out
}

/// Whitespace separated numbers consumed in schema order.
struct Reader<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    values: Vec<(Field, i64)>,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Reader { tokens: text.split_whitespace(), values: Vec::new() }
    }

    fn next(&mut self, field: Field) -> Result<i64, CodecError> {
        let token = self.tokens.next().ok_or(CodecError::MissingField(field.name()))?;
        let value = token
            .parse()
            .map_err(|_| CodecError::NotANumber { field: field.name(), value: token.to_string() })?;
        self.values.push((field, value));
        Ok(value)
    }

    fn fields(&mut self, fields: &[Field]) -> Result<(), CodecError> {
        for field in fields {
            self.next(*field)?;
        }
        Ok(())
    }

    fn get(&self, field: Field) -> i64 {
        self.values.iter().rev().find(|(f, _)| *f == field).map_or(0, |(_, v)| *v)
    }

    fn count(&self, field: Field) -> Result<u32, CodecError> {
        let value = self.get(field);
        u32::try_from(value).map_err(|_| CodecError::OutOfRange { field: field.name(), value })
    }

    fn flag(&self, field: Field) -> Result<bool, CodecError> {
        match self.get(field) {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::OutOfRange { field: field.name(), value }),
        }
    }

    fn cell(&self, board: &Board, x: Field, y: Field) -> Result<Position, CodecError> {
        let pos = Position::new(coord(x, self.get(x))?, coord(y, self.get(y))?);
        if !board.in_interior(pos) {
            let (field, value) = if board.in_interior(Position::new(pos.x, 1)) { (y, pos.y) } else { (x, pos.x) };
            return Err(CodecError::OutOfRange { field: field.name(), value: value.into() });
        }
        Ok(pos)
    }
}

fn coord(field: Field, value: i64) -> Result<i32, CodecError> {
    i32::try_from(value).map_err(|_| CodecError::OutOfRange { field: field.name(), value })
}

fn timed_food(
    reader: &Reader,
    board: &Board,
    rules: FoodRules,
    fields: (Field, Field, Field, Option<Field>, Field),
) -> Result<TimedFood, CodecError> {
    let (active, x, y, lifetime, cooldown) = fields;

    let presence = if reader.flag(active)? {
        let remaining = match lifetime {
            Some(field) => match reader.count(field)? {
                0 => return Err(CodecError::OutOfRange { field: field.name(), value: 0 }),
                n => Some(n),
            },
            None => None,
        };
        Presence::Active { at: reader.cell(board, x, y)?, remaining }
    } else {
        match reader.count(cooldown)? {
            0 => Presence::Ready,
            n => Presence::Cooling(n),
        }
    };

    Ok(TimedFood::with_presence(rules, presence))
}

/// Parses a save record into a fresh, running state. `high_score` is left at
/// zero for the caller to fill from its score store.
pub fn decode(text: &str) -> Result<GameState, CodecError> {
    let board = Board::default();
    let mut reader = Reader::new(text);

    reader.fields(&HEADER)?;
    reader.fields(&REGULAR_FOOD)?;

    let expected = reader.next(Field::BodyLength)?;
    let expected = usize::try_from(expected)
        .map_err(|_| CodecError::OutOfRange { field: Field::BodyLength.name(), value: expected })?;
    if expected == 0 {
        return Err(CodecError::EmptyBody);
    }

    let mut body = Vec::with_capacity(expected.min(board.interior().count()));
    for found in 0..expected {
        match reader.fields(&SEGMENT) {
            Ok(()) => body.push(reader.cell(&board, Field::SegmentX, Field::SegmentY)?),
            Err(CodecError::MissingField(_)) => return Err(CodecError::TruncatedBody { expected, found }),
            Err(err) => return Err(err),
        }
    }

    reader.fields(&HEADING)?;
    let (dx, dy) = (coord(Field::HeadingX, reader.get(Field::HeadingX))?, coord(Field::HeadingY, reader.get(Field::HeadingY))?);
    let direction = Direction::from_delta(dx, dy).ok_or(CodecError::InvalidHeading(dx, dy))?;
    let snake = Snake::from_parts(body, direction).ok_or(CodecError::EmptyBody)?;

    let speed = match reader.get(Field::SpeedTier) {
        0 => SpeedTier::Slow,
        1 => SpeedTier::Normal,
        2 => SpeedTier::Fast,
        value => return Err(CodecError::OutOfRange { field: Field::SpeedTier.name(), value }),
    };
    let modes = Modes { easy: reader.flag(Field::EasyMode)?, wrap: reader.flag(Field::WrapMode)?, speed };

    let food = Foods {
        regular: reader.cell(&board, Field::FoodX, Field::FoodY)?,
        bonus: timed_food(
            &reader,
            &board,
            BONUS_RULES,
            (Field::BonusActive, Field::BonusX, Field::BonusY, Some(Field::BonusLifetime), Field::BonusCooldown),
        )?,
        hazard: timed_food(
            &reader,
            &board,
            HAZARD_RULES,
            (Field::HazardActive, Field::HazardX, Field::HazardY, None, Field::HazardCooldown),
        )?,
    };

    let foods_eaten = reader.count(Field::FoodsEaten)?;

    Ok(GameState {
        board,
        snake,
        food,
        score: reader.count(Field::Score)?,
        high_score: 0,
        foods_eaten,
        level: level_for(foods_eaten),
        game_over: false,
        paused: false,
        modes,
        tick_count: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
120 7 1 0 2 1 4 5 12 0 0 0 0 17
9 9
3
10 10
9 10
8 10
1 0
";

    #[test]
    fn decodes_every_field() {
        let state = decode(SAMPLE).unwrap();

        assert_eq!(state.score, 120);
        assert_eq!(state.foods_eaten, 7);
        assert_eq!(state.level, 2);
        assert_eq!(state.modes, Modes { easy: true, wrap: false, speed: SpeedTier::Fast });
        assert_eq!(state.food.bonus.position(), Some(Position::new(4, 5)));
        assert_eq!(state.food.bonus.remaining(), Some(12));
        assert!(!state.food.hazard.is_active());
        assert_eq!(state.food.hazard.cooldown_left(), 17);
        assert_eq!(state.food.regular, Position::new(9, 9));
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), Position::new(10, 10));
        assert_eq!(state.snake.direction(), Direction::Right);
        assert!(!state.game_over);
        assert!(!state.paused);
        assert_eq!(state.tick_count, 0);
    }

    #[test]
    fn encode_reproduces_the_record() {
        let state = decode(SAMPLE).unwrap();
        assert_eq!(encode(&state), SAMPLE);
    }

    #[test]
    fn missing_header_field_fails() {
        assert_eq!(decode("120 7 1 0"), Err(CodecError::MissingField("speed tier")));
        assert_eq!(decode(""), Err(CodecError::MissingField("score")));
    }

    #[test]
    fn non_numeric_field_fails() {
        let text = SAMPLE.replacen("120", "lots", 1);
        assert_eq!(decode(&text), Err(CodecError::NotANumber { field: "score", value: "lots".into() }));
    }

    #[test]
    fn short_body_fails() {
        let text = "0 0 0 0 1 0 0 0 0 0 0 0 0 0\n9 9\n4\n10 10\n9 10\n";
        assert_eq!(decode(text), Err(CodecError::TruncatedBody { expected: 4, found: 2 }));
    }

    #[test]
    fn empty_body_fails() {
        let text = "0 0 0 0 1 0 0 0 0 0 0 0 0 0\n9 9\n0\n1 0\n";
        assert_eq!(decode(text), Err(CodecError::EmptyBody));
    }

    #[test]
    fn zero_heading_fails() {
        let text = "0 0 0 0 1 0 0 0 0 0 0 0 0 0\n9 9\n1\n10 10\n0 0\n";
        assert_eq!(decode(text), Err(CodecError::InvalidHeading(0, 0)));
    }

    #[test]
    fn flags_and_ranges_are_checked() {
        let bad_flag = "0 0 3 0 1 0 0 0 0 0 0 0 0 0\n9 9\n1\n10 10\n1 0\n";
        assert_eq!(decode(bad_flag), Err(CodecError::OutOfRange { field: "easy mode", value: 3 }));

        let negative = "-5 0 0 0 1 0 0 0 0 0 0 0 0 0\n9 9\n1\n10 10\n1 0\n";
        assert_eq!(decode(negative), Err(CodecError::OutOfRange { field: "score", value: -5 }));

        let off_board = "0 0 0 0 1 0 0 0 0 0 0 0 0 0\n9 40\n1\n10 10\n1 0\n";
        assert_eq!(decode(off_board), Err(CodecError::OutOfRange { field: "food y", value: 40 }));
    }

    #[test]
    fn inactive_food_without_cooldown_is_ready() {
        let text = "0 0 0 1 0 0 0 0 0 0 1 3 3 0\n9 9\n1\n10 10\n0 -1\n";
        let state = decode(text).unwrap();

        assert!(state.food.bonus.is_ready());
        assert_eq!(state.food.hazard.position(), Some(Position::new(3, 3)));
        assert_eq!(state.food.hazard.remaining(), None);
        assert_eq!(state.snake.direction(), Direction::Up);
        assert!(state.modes.wrap);
        assert_eq!(state.modes.speed, SpeedTier::Slow);
    }

    #[test]
    fn every_segment_is_written_head_first() {
        let mut state = decode(SAMPLE).unwrap();
        let body = vec![Position::new(6, 4), Position::new(6, 5), Position::new(7, 5), Position::new(8, 5)];
        state.snake = Snake::from_parts(body.clone(), Direction::Up).unwrap();

        let text = encode(&state);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "4");
        assert_eq!(&lines[3..7], &["6 4", "6 5", "7 5", "8 5"]);
        assert_eq!(lines[7], "0 -1");

        let reread = decode(&text).unwrap();
        assert_eq!(reread.snake.body().iter().copied().collect::<Vec<_>>(), body);
    }
}
