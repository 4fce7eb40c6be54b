use crate::Coords;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Down, Left, Right];

    pub fn opposite(self) -> Self {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// Displacement of one step in this direction, `cell` units long.
    pub fn offset(self, cell: i32) -> Coords {
        match self {
            Up => (0, -cell),
            Down => (0, cell),
            Left => (-cell, 0),
            Right => (cell, 0),
        }
    }
}

/// Axis-aligned box with its top-left corner at `(x, y)`; y grows downwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new((x, y): Coords, size: i32) -> Self {
        Rect { x, y, width: size, height: size }
    }

    pub fn top_left(&self) -> Coords {
        (self.x, self.y)
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn translate(&mut self, (dx, dy): Coords) {
        self.x += dx;
        self.y += dy;
    }

    /// Interiors intersect. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.width <= 0 || self.height <= 0 || other.width <= 0 || other.height <= 0 {
            return false;
        }

        self.x < other.x + other.width && other.x < self.x + self.width &&
        self.y < other.y + other.height && other.y < self.y + self.height
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Segment {
    pub rect: Rect,
    /// Where the segment went on its last step, `None` until it first moves.
    pub direction: Option<Direction>,
}

impl Segment {
    pub fn new(pos: Coords, size: i32, direction: Option<Direction>) -> Self {
        Segment { rect: Rect::new(pos, size), direction }
    }
}

/// Snake body, head first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Segment>,
    cell: i32,
}

impl Snake {
    pub fn new(start: Coords, cell: i32) -> Self {
        Snake { body: vec![Segment::new(start, cell, None)], cell }
    }

    pub fn from_segments(body: Vec<Segment>, cell: i32) -> Option<Self> {
        if body.is_empty() {
            None
        } else {
            Some(Snake { body, cell })
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.body
    }

    pub fn head(&self) -> &Segment {
        &self.body[0]
    }

    pub fn tail(&self) -> &Segment {
        &self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Shifts directions one segment towards the tail, then points the head at `head_direction`.
    pub fn update_direction(&mut self, head_direction: Option<Direction>) {
        // Tail first, so every segment reads its leader's value from before this call
        for i in (1..self.body.len()).rev() {
            self.body[i].direction = self.body[i - 1].direction;
        }
        self.body[0].direction = head_direction;
    }

    pub fn move_segments(&mut self) {
        let cell = self.cell;
        for segment in self.body.iter_mut() {
            move_segment(segment, cell);
        }
    }

    /// Appends a segment one cell behind the tail, travelling the same way.
    pub fn grow(&mut self) {
        let tail = *self.tail();
        let (dx, dy) = tail.direction
            .map(|dir| dir.opposite().offset(self.cell))
            .unwrap_or((0, 0));

        let pos = (tail.rect.x + dx, tail.rect.y + dy);
        self.body.push(Segment { rect: Rect { x: pos.0, y: pos.1, ..tail.rect }, direction: tail.direction });
    }

    pub fn head_collided_with(&self, other: &Rect) -> bool {
        self.head().rect.overlaps(other)
    }

    pub fn head_collided_with_self(&self) -> bool {
        let head = self.head().rect;
        self.body[1..].iter().any(|segment| head.overlaps(&segment.rect))
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.iter().any(|segment| segment.rect.top_left() == pos)
    }
}

/// Steps a segment one cell along its own direction. Direction-less segments stay put.
pub fn move_segment(segment: &mut Segment, cell: i32) {
    if let Some(dir) = segment.direction {
        segment.rect.translate(dir.offset(cell));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: i32 = 32;

    fn snake_of(segments: &[(Coords, Option<Direction>)]) -> Snake {
        let body = segments.iter().map(|&(pos, dir)| Segment::new(pos, CELL, dir)).collect();
        Snake::from_segments(body, CELL).unwrap()
    }

    #[test]
    fn direction_propagates_from_the_segment_ahead() {
        let mut snake = snake_of(&[((0, 0), Some(Up)), ((0, 32), Some(Left)), ((32, 32), Some(Left))]);
        snake.update_direction(Some(Down));

        let dirs: Vec<_> = snake.segments().iter().map(|s| s.direction).collect();
        assert_eq!(dirs, vec![Some(Down), Some(Up), Some(Left)]);
    }

    #[test]
    fn head_takes_the_given_direction() {
        let mut snake = Snake::new((320, 224), CELL);
        snake.update_direction(Some(Left));
        assert_eq!(snake.head().direction, Some(Left));

        snake.update_direction(None);
        assert_eq!(snake.head().direction, None);
    }

    #[test]
    fn segments_move_one_cell_along_their_axis() {
        for (dir, expected) in [(Up, (320, 192)), (Down, (320, 256)), (Left, (288, 224)), (Right, (352, 224))] {
            let mut segment = Segment::new((320, 224), CELL, Some(dir));
            move_segment(&mut segment, CELL);
            assert_eq!(segment.rect.top_left(), expected, "moving {:?}", dir);
        }
    }

    #[test]
    fn directionless_segment_does_not_move() {
        let mut segment = Segment::new((64, 64), CELL, None);
        move_segment(&mut segment, CELL);
        assert_eq!(segment.rect.top_left(), (64, 64));
    }

    #[test]
    fn grows_behind_the_tail() {
        let cases = [
            (Down, (32, 0)),
            (Up, (32, 64)),
            (Right, (0, 32)),
            (Left, (64, 32)),
        ];

        for (dir, expected) in cases {
            let mut snake = snake_of(&[((32, 32), Some(dir))]);
            snake.grow();

            assert_eq!(snake.len(), 2);
            let added = snake.segments()[1];
            assert_eq!(added.rect.top_left(), expected, "tail moving {:?}", dir);
            assert_eq!(added.rect.size(), snake.head().rect.size());
            assert_eq!(added.direction, Some(dir));
        }
    }

    #[test]
    fn grows_from_the_last_segment() {
        let mut snake = snake_of(&[((32, 32), Some(Up))]);
        snake.grow();
        snake.grow();

        assert_eq!(snake.len(), 3);
        assert_eq!(snake.tail().rect.top_left(), (32, 96));
    }

    #[test]
    fn growth_without_direction_stacks_on_the_tail() {
        let mut snake = snake_of(&[((96, 64), None)]);
        snake.grow();
        assert_eq!(snake.tail().rect.top_left(), (96, 64));
        assert_eq!(snake.tail().direction, None);
    }

    #[test]
    fn edge_adjacent_boxes_do_not_overlap() {
        let a = Rect::new((32, 32), CELL);
        assert!(a.overlaps(&Rect::new((32, 32), CELL)));
        assert!(a.overlaps(&Rect::new((48, 40), CELL)));
        assert!(!a.overlaps(&Rect::new((0, 0), CELL)));
        assert!(!a.overlaps(&Rect::new((64, 32), CELL)));
        assert!(!a.overlaps(&Rect::new((32, 0), CELL)));
        assert!(!a.overlaps(&Rect::new((32, 32), 0)));
    }

    #[test]
    fn self_collision() {
        assert!(!Snake::new((0, 0), CELL).head_collided_with_self());
        assert!(!snake_of(&[((0, 0), None), ((32, 0), None)]).head_collided_with_self());
        assert!(snake_of(&[((0, 0), None), ((32, 0), None), ((0, 0), None)]).head_collided_with_self());
    }

    #[test]
    fn opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.offset(CELL);
            assert_eq!(dir.opposite().offset(CELL), (-dx, -dy));
        }
    }
}
