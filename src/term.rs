use crate::{TermInt, Coords};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

/// Character-cell screen with a shadow buffer of what is currently drawn.
///
/// At most one message box is shown at a time. Cells under the box keep being
/// tracked in the buffer, so hiding the box brings back the latest content.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error disabling raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking).context("Error showing cursor")?;
        execute!(self.stdout, LeaveAlternateScreen).context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1)).context("Error polling input")? {
            if let Event::Key(ev) = read().context("Error reading input")? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Draws a frame whose outer corners are `top_left` and
    /// `top_left + size - 1`.
    pub fn draw_borders(&mut self, top_left: Coords, size: Coords) -> Result<()> {
        let (width, height) = size;
        let (x0, y0) = top_left;

        let end_x = x0 + width - 1;
        let end_y = y0 + height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == width - 1 {'+'} else {'-'};
            self.print_at((x0 + x, y0), ch)?;
            self.print_at((x0 + x, end_y), ch)?;
        }

        for y in 1..height - 1 {
            self.print_at((x0, y0 + y), '|')?;
            self.print_at((end_x, y0 + y), '|')?;
        }

        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let pos = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(i) = self.index(pos) {
                    let ch = self.screen[i];
                    self.print_at_no_save(pos, ch)?;
                }
            }
        }

        self.flush()
    }

    /// Queues `ch` at `pos` unless it is already there. Cells under a message
    /// box only update the buffer.
    pub fn print_at(&mut self, pos: Coords, ch: char) -> Result<()> {
        let i = match self.index(pos) {
            Some(i) => i,
            None => return Ok(()),
        };

        if self.screen[i] == ch {
            return Ok(());
        }

        self.screen[i] = ch;

        if self.current_msg.as_ref().map_or(false, |msg| msg.covers(pos)) {
            return Ok(());
        }

        self.print_at_no_save(pos, ch)
    }

    pub fn print_str_at(&mut self, pos: Coords, text: &str) -> Result<()> {
        for (x_diff, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + x_diff as TermInt, pos.1), ch)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> Result<()> {
        // Bypasses the buffer, which keeps what the message box hides
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("Error printing")?;
        Ok(())
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn covers(&self, pos: Coords) -> bool {
        (self.top_left.0..self.top_left.0 + self.width).contains(&pos.0)
            && (self.top_left.1..self.top_left.1 + self.height).contains(&pos.1)
    }
}
