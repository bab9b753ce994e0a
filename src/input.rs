// raw stdin bytes are collected in a circular buffer and decoded into input events.
// arrow keys are control sequences ending in A..D, mouse reports use the SGR encoding
// ESC [ < button ; column ; row followed by M (press or drag) or m (release)
use circular_buffer::CircularBuffer;

use crate::render::Point;
use crate::snake::Direction;

type InputBuffer = CircularBuffer<1024, u8>; // 1024 bytes in input buffer

const ESC: u8 = 27;
const CSI: u8 = b'[';
// longest sequence body we wait for before giving up on it
const MAX_SEQUENCE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Turn(Direction),
    StartOrRestart,
    TogglePause,
    Quit,
    TouchStart { column: u16, row: u16 },
    TouchMove { column: u16, row: u16 },
    TouchEnd,
    /// Any other key
    Other,
}

#[derive(Debug)]
pub struct InputDecoder {
    buffer: InputBuffer,
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDecoder {
    pub fn new() -> Self {
        InputDecoder {
            buffer: InputBuffer::new(),
        }
    }

    pub fn push(&mut self, byte: u8) {
        // if the buffer is full, ignore the input
        if self.buffer.is_full() {
            return;
        }
        self.buffer.push_back(byte);
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Decodes the next complete event. Returns `None` when the buffer is empty or
    /// only holds the start of an escape sequence.
    pub fn next_event(&mut self) -> Option<InputEvent> {
        loop {
            let first = *self.buffer.front()?;
            if first != ESC {
                self.buffer.pop_front();
                return Some(key_event(first));
            }

            let second = *self.buffer.nth_front(1)?;
            if second != CSI {
                // a bare escape
                self.buffer.pop_front();
                return Some(InputEvent::Other);
            }

            let third = *self.buffer.nth_front(2)?;
            let sequence = if third == b'<' {
                self.take_mouse_report()
            } else {
                self.take_control_sequence()
            };
            match sequence {
                Sequence::Incomplete => return None,
                Sequence::Event(event) => return Some(event),
                Sequence::Skipped => continue,
            }
        }
    }

    // ESC [ then parameter and intermediate bytes (0x20..=0x3F), then one final byte.
    // Arrows arrive as ESC [ A..D, or ESC [ 1 ; <modifier> A..D with a modifier held
    fn take_control_sequence(&mut self) -> Sequence {
        let terminator = self
            .buffer
            .iter()
            .enumerate()
            .skip(2)
            .take(MAX_SEQUENCE)
            .find(|&(_, &b)| !(0x20..=0x3f).contains(&b))
            .map(|(index, _)| index);
        let Some(end) = terminator else {
            if self.buffer.len() > 2 + MAX_SEQUENCE {
                self.discard(2);
                return Sequence::Skipped;
            }
            return Sequence::Incomplete;
        };

        let final_byte = self.buffer.nth_front(end).copied();
        self.discard(end + 1);
        match final_byte {
            Some(b'A') => Sequence::Event(InputEvent::Turn(Direction::Up)),
            Some(b'B') => Sequence::Event(InputEvent::Turn(Direction::Down)),
            Some(b'C') => Sequence::Event(InputEvent::Turn(Direction::Right)),
            Some(b'D') => Sequence::Event(InputEvent::Turn(Direction::Left)),
            _ => Sequence::Skipped,
        }
    }

    fn take_mouse_report(&mut self) -> Sequence {
        let terminator = self
            .buffer
            .iter()
            .skip(3)
            .take(MAX_SEQUENCE)
            .position(|&b| b == b'M' || b == b'm')
            .map(|offset| offset + 3);
        let Some(end) = terminator else {
            if self.buffer.len() > 3 + MAX_SEQUENCE {
                self.discard(3);
                return Sequence::Skipped;
            }
            return Sequence::Incomplete;
        };

        let body: String = self
            .buffer
            .iter()
            .skip(3)
            .take(end - 3)
            .map(|&b| b as char)
            .collect();
        let released = self.buffer.nth_front(end) == Some(&b'm');
        self.discard(end + 1);

        match parse_mouse(&body, released) {
            Some(event) => Sequence::Event(event),
            None => Sequence::Skipped,
        }
    }

    fn discard(&mut self, count: usize) {
        for _ in 0..count {
            self.buffer.pop_front();
        }
    }
}

enum Sequence {
    Incomplete,
    Event(InputEvent),
    Skipped,
}

fn key_event(byte: u8) -> InputEvent {
    match byte {
        b'w' | b'W' => InputEvent::Turn(Direction::Up),
        b's' | b'S' => InputEvent::Turn(Direction::Down),
        b'a' | b'A' => InputEvent::Turn(Direction::Left),
        b'd' | b'D' => InputEvent::Turn(Direction::Right),
        b'\n' | b'\r' | b'r' | b'R' | b'n' | b'N' => InputEvent::StartOrRestart,
        b'p' | b'P' | b' ' => InputEvent::TogglePause,
        b'q' | b'Q' => InputEvent::Quit,
        _ => InputEvent::Other,
    }
}

fn parse_mouse(body: &str, released: bool) -> Option<InputEvent> {
    let mut fields = body.split(';').map(|field| field.parse::<u16>());
    let button = fields.next()?.ok()?;
    let column = fields.next()?.ok()?;
    let row = fields.next()?.ok()?;

    // only the primary button stands in for a finger
    if button & 0b11 != 0 || button & 64 != 0 {
        return None;
    }
    if released {
        Some(InputEvent::TouchEnd)
    } else if button & 32 != 0 {
        Some(InputEvent::TouchMove { column, row })
    } else {
        Some(InputEvent::TouchStart { column, row })
    }
}

/// Turns a drag into directional swipes.
///
/// Every evaluated sample becomes the new reference point, whether or not it was
/// long enough to count, so a single drag can produce several swipes.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    origin: Option<Point>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        SwipeTracker {
            threshold,
            origin: None,
        }
    }

    pub fn begin(&mut self, point: Point) {
        self.origin = Some(point);
    }

    pub fn drag(&mut self, point: Point) -> Option<Direction> {
        let origin = self.origin.replace(point)?;
        let dx = point.x - origin.x;
        let dy = point.y - origin.y;

        if dx.abs() > dy.abs() && dx.abs() > self.threshold {
            Some(if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else if dy.abs() > dx.abs() && dy.abs() > self.threshold {
            Some(if dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            })
        } else {
            None
        }
    }

    pub fn end(&mut self) {
        self.origin = None;
    }
}
