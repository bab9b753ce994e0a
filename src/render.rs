use crate::config::GameConfig;
use crate::engine::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GRID: Rgb = Rgb(0xee, 0xee, 0xee);
    pub const SNAKE_HEAD: Rgb = Rgb(0x38, 0x8e, 0x3c);
    pub const SNAKE_BODY: Rgb = Rgb(0x4c, 0xaf, 0x50);
    pub const FOOD: Rgb = Rgb(0xf4, 0x43, 0x36);
}

/// A point in logical surface units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f32,
        height: f32,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        width: f32,
    },
    FillRect {
        origin: Point,
        width: f32,
        height: f32,
        color: Rgb,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Rgb,
    },
}

/// Anything that can carry out drawing instructions
pub trait Surface {
    fn draw(&mut self, command: &DrawCommand);
}

pub fn paint<S: Surface + ?Sized>(surface: &mut S, commands: &[DrawCommand]) {
    for command in commands {
        surface.draw(command);
    }
}

/// Draws the board: guide lines, then the snake, then the food
pub fn render(state: &GameState, config: &GameConfig) -> Vec<DrawCommand> {
    let size = config.canvas_size;
    let cell = config.cell_size();
    let mut commands = vec![DrawCommand::Clear {
        width: size,
        height: size,
    }];

    for i in 0..=config.grid_size {
        let offset = i as f32 * cell;
        commands.push(DrawCommand::Line {
            from: Point::new(offset, 0.0),
            to: Point::new(offset, size),
            color: Rgb::GRID,
            width: 0.5,
        });
        commands.push(DrawCommand::Line {
            from: Point::new(0.0, offset),
            to: Point::new(size, offset),
            color: Rgb::GRID,
            width: 0.5,
        });
    }

    for (index, segment) in state.snake.segments().enumerate() {
        commands.push(DrawCommand::FillRect {
            origin: Point::new(segment.x as f32 * cell + 1.0, segment.y as f32 * cell + 1.0),
            width: cell - 2.0,
            height: cell - 2.0,
            color: if index == 0 {
                Rgb::SNAKE_HEAD
            } else {
                Rgb::SNAKE_BODY
            },
        });
    }

    if let Some(food) = state.food {
        commands.push(DrawCommand::FillCircle {
            center: Point::new(
                food.x as f32 * cell + cell / 2.0,
                food.y as f32 * cell + cell / 2.0,
            ),
            radius: cell / 2.0 - 2.0,
            color: Rgb::FOOD,
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameEngine, NoopListener};
    use crate::snake::Coordinates;
    use crate::storage::MemoryStore;
    use std::time::Instant;

    fn engine() -> GameEngine {
        GameEngine::new(
            GameConfig::default(),
            Box::new(MemoryStore::new()),
            Box::new(NoopListener),
        )
        .unwrap()
    }

    fn rects(commands: &[DrawCommand]) -> Vec<(Point, f32, Rgb)> {
        commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillRect {
                    origin,
                    width,
                    color,
                    ..
                } => Some((*origin, *width, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_idle_board_is_only_grid() {
        let engine = engine();
        let commands = render(engine.state(), engine.config());

        assert_eq!(
            commands[0],
            DrawCommand::Clear {
                width: 400.0,
                height: 400.0
            }
        );
        assert_eq!(commands.len(), 1 + 2 * 21);
        assert!(commands[1..]
            .iter()
            .all(|command| matches!(command, DrawCommand::Line { color: Rgb::GRID, .. })));
    }

    #[test]
    fn test_snake_and_food() {
        let mut engine = engine();
        engine.start(Instant::now());
        let commands = render(engine.state(), engine.config());

        let rects = rects(&commands);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], (Point::new(201.0, 201.0), 18.0, Rgb::SNAKE_HEAD));
        assert_eq!(rects[1], (Point::new(181.0, 201.0), 18.0, Rgb::SNAKE_BODY));
        assert_eq!(rects[2], (Point::new(161.0, 201.0), 18.0, Rgb::SNAKE_BODY));

        let food: Coordinates = engine.state().food.unwrap();
        assert_eq!(
            commands.last(),
            Some(&DrawCommand::FillCircle {
                center: Point::new(food.x as f32 * 20.0 + 10.0, food.y as f32 * 20.0 + 10.0),
                radius: 8.0,
                color: Rgb::FOOD,
            })
        );
    }

    #[test]
    fn test_grid_lines_span_the_surface() {
        let engine = engine();
        let commands = render(engine.state(), engine.config());

        assert!(commands.contains(&DrawCommand::Line {
            from: Point::new(400.0, 0.0),
            to: Point::new(400.0, 400.0),
            color: Rgb::GRID,
            width: 0.5,
        }));
        assert!(commands.contains(&DrawCommand::Line {
            from: Point::new(0.0, 20.0),
            to: Point::new(400.0, 20.0),
            color: Rgb::GRID,
            width: 0.5,
        }));
    }

    #[derive(Default)]
    struct Counter(usize);

    impl Surface for Counter {
        fn draw(&mut self, _command: &DrawCommand) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_paint_forwards_every_command() {
        let engine = engine();
        let commands = render(engine.state(), engine.config());
        let mut counter = Counter::default();
        paint(&mut counter, &commands);
        assert_eq!(counter.0, commands.len());
    }
}
