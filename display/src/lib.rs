use std::io::{self, Write};

use chip8_vm::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8_vm::FrameBuffer;

/// # Display
/// The Chip-8 display is composed of 64x32 black/white pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a 2d array.
///
/// This display draws frames as text, one character per pixel and one line per row,
/// so it works anywhere there's a terminal. The display only gets a call to
/// `render` when the Chip-8 FrameBuffer is updated.
pub struct Display {
    on: char,
    off: char,
    width: usize,
    height: usize,
}

impl Display {
    /// Creates a new text display.
    ///
    /// # Arguments
    /// * `on` the character drawn for a lit pixel
    /// * `off` the character drawn for an unlit pixel
    pub fn new(on: char, off: char) -> Self {
        Display {
            on,
            off,
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
        }
    }

    /// Formats a Chip-8 FrameBuffer as text.
    ///
    /// Each row becomes a line of `width` characters terminated by a newline.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn frame_to_text(&self, frame: &FrameBuffer) -> String {
        let mut text = String::with_capacity((self.width + 1) * self.height);
        for row in frame.iter() {
            text.extend(row.iter().map(|&p| if p == 0 { self.off } else { self.on }));
            text.push('\n');
        }
        text
    }

    /// Writes the frame to `out`.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    /// * `out` where to draw it, usually stdout
    pub fn render(&self, frame: &FrameBuffer, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.frame_to_text(frame).as_bytes())?;
        out.flush()
    }
}

impl Default for Display {
    fn default() -> Self {
        Display::new('█', ' ')
    }
}
