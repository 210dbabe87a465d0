use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use emuchip8::display::{HEIGHT, WIDTH};

pub struct Screen {
    window: Window,
}

impl Screen {
    pub fn new(scale: Scale) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "emuchip8 - ESC to exit",
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));
        Ok(Self { window })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
    }

    /// Presents a frame and pumps window events.
    pub fn sync(&mut self, pixels: &[u32]) -> Result<(), minifb::Error> {
        self.window.update_with_buffer(pixels, WIDTH, HEIGHT)
    }

    pub fn held_keys(&self) -> Vec<Key> {
        self.window.get_keys()
    }
}
