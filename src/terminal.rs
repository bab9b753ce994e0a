// terminal front end: stdin is switched to non-canonical, no-echo mode, a reader thread
// forwards bytes over a channel and the board is redrawn with coloured glyphs
use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use log::{info, warn};
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW};

use crate::engine::{Collision, GameEngine, GameEvent, GameOutcome};
use crate::error::{Result, SnakeError};
use crate::input::{InputDecoder, InputEvent, SwipeTracker};
use crate::render::{paint, render, DrawCommand, Point, Rgb, Surface};

const STDIN_FD: i32 = 0;
// button-event mouse tracking with SGR encoding, and a hidden cursor
const ENTER_SEQUENCE: &str = "\x1b[?1002h\x1b[?1006h\x1b[?25l";
const LEAVE_SEQUENCE: &str = "\x1b[?1006l\x1b[?1002l\x1b[?25h";
const IDLE_SLEEP: Duration = Duration::from_millis(3);

fn clear_screen() -> &'static str {
    "\x1b[2J\x1b[1;1H"
}

/// Restores the original terminal settings when dropped
pub struct TerminalGuard {
    old_termios: Termios,
}

impl TerminalGuard {
    pub fn enable() -> Result<Self> {
        let old_termios = Termios::from_fd(STDIN_FD)
            .map_err(|e| SnakeError::Terminal(format!("stdin is not a terminal: {}", e)))?;
        let mut new_termios = old_termios;
        new_termios.c_lflag &= !(ICANON | ECHO); // no echo and canonical mode for stdin
        tcsetattr(STDIN_FD, TCSANOW, &new_termios)?;

        let mut stdout = io::stdout();
        stdout.write_all(ENTER_SEQUENCE.as_bytes())?;
        stdout.flush()?;
        Ok(TerminalGuard { old_termios })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(LEAVE_SEQUENCE.as_bytes());
        let _ = stdout.flush();
        if let Err(e) = tcsetattr(STDIN_FD, TCSANOW, &self.old_termios) {
            warn!("Could not restore terminal settings: {}", e);
        }
    }
}

fn spawn_stdin_channel() -> Receiver<u8> {
    let (tx, rx) = mpsc::channel::<u8>();
    thread::spawn(move || {
        let mut reader = io::stdin();
        let mut buffer = [0u8; 1];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(buffer[0]).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("Stopped reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Glyph {
    Empty,
    Block(Rgb),
    Disc(Rgb),
}

/// Rasterises drawing commands onto a grid of character cells, two columns per cell
pub struct TerminalSurface {
    grid_size: usize,
    cell_size: f32,
    cells: Vec<Glyph>,
    grid_color: Option<Rgb>,
}

impl TerminalSurface {
    pub fn new(grid_size: usize, cell_size: f32) -> Self {
        TerminalSurface {
            grid_size,
            cell_size,
            cells: vec![Glyph::Empty; grid_size * grid_size],
            grid_color: None,
        }
    }

    fn cell_index(&self, point: Point) -> Option<usize> {
        let x = (point.x / self.cell_size).floor();
        let y = (point.y / self.cell_size).floor();
        let limit = self.grid_size as f32;
        if x < 0.0 || y < 0.0 || x >= limit || y >= limit {
            return None;
        }
        Some(y as usize * self.grid_size + x as usize)
    }

    fn set(&mut self, point: Point, glyph: Glyph) {
        if let Some(index) = self.cell_index(point) {
            self.cells[index] = glyph;
        }
    }

    /// The full frame: bordered board followed by the score lines
    pub fn compose(&self, hud: &Hud) -> String {
        let mut frame = String::new();
        //border up
        frame.push('▗');
        frame.push_str(&"▄▄".repeat(self.grid_size));
        frame.push_str("▖\n");
        for row in self.cells.chunks(self.grid_size) {
            frame.push('▐');
            for glyph in row {
                let text = match *glyph {
                    Glyph::Empty => match self.grid_color {
                        Some(Rgb(r, g, b)) => "· ".truecolor(r, g, b).to_string(),
                        None => "  ".to_string(),
                    },
                    Glyph::Block(Rgb(r, g, b)) => "⏺ ".truecolor(r, g, b).to_string(),
                    Glyph::Disc(Rgb(r, g, b)) => "♦ ".truecolor(r, g, b).to_string(),
                };
                frame.push_str(&text);
            }
            frame.push_str("▌\n");
        }
        //border down
        frame.push('▝');
        frame.push_str(&"▀▀".repeat(self.grid_size));
        frame.push_str("▘\n");

        let _ = writeln!(
            frame,
            "Score: {}    High Score: {}",
            hud.score.to_string().bold(),
            hud.high_score.to_string().bold()
        );
        match &hud.banner {
            Some(banner) => {
                let _ = writeln!(frame, "{}", banner.yellow().bold());
            }
            None => frame.push('\n'),
        }
        frame.push_str("arrows/WASD or drag: move | Enter: start/restart | P/space: pause | Q: quit\n");
        frame
    }

    pub fn present<W: Write>(&self, out: &mut W, hud: &Hud) -> io::Result<()> {
        out.write_all(clear_screen().as_bytes())?;
        out.write_all(self.compose(hud).as_bytes())?;
        out.flush()
    }
}

impl Surface for TerminalSurface {
    fn draw(&mut self, command: &DrawCommand) {
        match *command {
            DrawCommand::Clear { .. } => {
                self.cells.fill(Glyph::Empty);
                self.grid_color = None;
            }
            // the guide lines show up as dots in empty cells
            DrawCommand::Line { color, .. } => self.grid_color = Some(color),
            DrawCommand::FillRect {
                origin,
                width,
                height,
                color,
            } => {
                let center = Point::new(origin.x + width / 2.0, origin.y + height / 2.0);
                self.set(center, Glyph::Block(color));
            }
            DrawCommand::FillCircle { center, color, .. } => self.set(center, Glyph::Disc(color)),
        }
    }
}

/// Text shown under the board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub high_score: u32,
    pub banner: Option<String>,
}

pub struct TerminalHost {
    engine: GameEngine,
    events: Receiver<GameEvent>,
    decoder: InputDecoder,
    swipe: SwipeTracker,
    surface: TerminalSurface,
    hud: Hud,
    // set after game over until a key acknowledges it
    modal: bool,
    dirty: bool,
    quit: bool,
}

impl TerminalHost {
    pub fn new(engine: GameEngine, events: Receiver<GameEvent>) -> Self {
        let config = engine.config();
        let surface = TerminalSurface::new(config.grid_size, config.cell_size());
        let swipe = SwipeTracker::new(config.swipe_threshold);
        let hud = Hud {
            score: engine.state().score,
            high_score: engine.state().high_score,
            banner: Some("Press Enter to start".to_string()),
        };
        TerminalHost {
            engine,
            events,
            decoder: InputDecoder::new(),
            swipe,
            surface,
            hud,
            modal: false,
            dirty: true,
            quit: false,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn play(&mut self) -> Result<()> {
        let _guard = TerminalGuard::enable()?;
        let stdin_channel = spawn_stdin_channel();
        let mut stdout = io::stdout();
        info!("Terminal session started");

        // main Game Loop happens here
        while !self.quit {
            loop {
                match stdin_channel.try_recv() {
                    Ok(byte) => self.decoder.push(byte),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.quit = true;
                        break;
                    }
                }
            }
            while let Some(event) = self.decoder.next_event() {
                self.handle_input(event, Instant::now());
            }
            if self.engine.update(Instant::now()) {
                self.dirty = true;
            }
            self.drain_events();

            if self.dirty {
                self.redraw(&mut stdout)?;
            }
            // wake up early if the next tick is due sooner
            let nap = self
                .engine
                .ticker()
                .time_until_next(Instant::now())
                .map_or(IDLE_SLEEP, |until_tick| until_tick.min(IDLE_SLEEP));
            thread::sleep(nap);
        }
        info!("Terminal session ended");
        Ok(())
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        if event == InputEvent::Quit {
            self.quit = true;
            return;
        }
        if self.modal {
            // the game-over notice swallows the key that dismisses it
            if !matches!(event, InputEvent::TouchMove { .. } | InputEvent::TouchEnd) {
                self.modal = false;
                self.hud.banner = Some("Press Enter to play again".to_string());
                self.dirty = true;
            }
            return;
        }

        match event {
            InputEvent::Turn(direction) => {
                self.engine.set_direction(direction);
            }
            InputEvent::StartOrRestart => {
                self.engine.start(now);
                self.hud.banner = None;
                self.dirty = true;
            }
            InputEvent::TogglePause => {
                if self.engine.toggle_pause() {
                    self.hud.banner = self
                        .engine
                        .state()
                        .is_paused()
                        .then(|| "Paused".to_string());
                    self.dirty = true;
                }
            }
            InputEvent::TouchStart { column, row } => {
                let point = self.to_logical(column, row);
                self.swipe.begin(point);
            }
            InputEvent::TouchMove { column, row } => {
                if self.engine.state().accepts_input() {
                    let point = self.to_logical(column, row);
                    if let Some(direction) = self.swipe.drag(point) {
                        self.engine.set_direction(direction);
                    }
                }
            }
            InputEvent::TouchEnd => self.swipe.end(),
            InputEvent::Quit | InputEvent::Other => {}
        }
    }

    pub fn drain_events(&mut self) {
        for event in self.events.try_iter() {
            match event {
                GameEvent::ScoreChanged(score) => self.hud.score = score,
                GameEvent::HighScoreChanged(high_score) => self.hud.high_score = high_score,
                GameEvent::GameOver { score, outcome } => {
                    let reason = match outcome {
                        GameOutcome::Collision(Collision::Wall) => "You hit the wall",
                        GameOutcome::Collision(Collision::SelfBite) => "You bit yourself",
                        GameOutcome::BoardFilled => "You filled the board",
                    };
                    self.hud.banner =
                        Some(format!("Game over! {}. Your score: {}", reason, score));
                    self.modal = true;
                }
            }
            self.dirty = true;
        }
    }

    // one terminal column is half a cell wide, one row is a full cell high
    fn to_logical(&self, column: u16, row: u16) -> Point {
        let cell = self.surface.cell_size;
        Point::new(column as f32 * cell / 2.0, row as f32 * cell)
    }

    fn redraw<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let commands = render(self.engine.state(), self.engine.config());
        paint(&mut self.surface, &commands);
        self.surface.present(out, &self.hud)?;
        self.dirty = false;
        Ok(())
    }
}
