use std::time::Duration;
use uinput::device::Device;
use uinput::event::keyboard;
use uinput::event::relative;

/// Dispositivo virtual (/dev/uinput) para zoom y scroll
pub struct HidOutput {
    dev: Device,
}

impl HidOutput {
    pub fn new() -> Result<Self, uinput::Error> {
        let dev = uinput::default()?
            .name("zena-gesture-hid")?
            .event(uinput::event::Keyboard::All)?
            .event(uinput::event::Relative::Wheel(relative::Wheel::Vertical))?
            .create()?;

        Ok(HidOutput { dev })
    }

    fn sync(&mut self) -> Result<(), uinput::Error> {
        self.dev.synchronize()
    }

    fn ctrl_combo(&mut self, key: keyboard::Key) -> Result<(), uinput::Error> {
        self.dev
            .press(&keyboard::Keyboard::Key(keyboard::Key::LeftControl))?;
        self.sync()?;
        std::thread::sleep(Duration::from_millis(10));
        self.dev.press(&keyboard::Keyboard::Key(key))?;
        self.sync()?;
        std::thread::sleep(Duration::from_millis(10));
        self.dev.release(&keyboard::Keyboard::Key(key))?;
        self.sync()?;
        self.dev
            .release(&keyboard::Keyboard::Key(keyboard::Key::LeftControl))?;
        self.sync()
    }

    /// Ctrl + '='
    pub fn zoom_in(&mut self) -> Result<(), uinput::Error> {
        self.ctrl_combo(keyboard::Key::Equal)
    }

    /// Ctrl + '0' devuelve el zoom al 100%
    pub fn zoom_reset(&mut self) -> Result<(), uinput::Error> {
        self.ctrl_combo(keyboard::Key::_0)
    }

    /// Gira la rueda vertical; positivo = arriba
    pub fn scroll(&mut self, notches: i32) -> Result<(), uinput::Error> {
        if notches == 0 {
            return Ok(());
        }
        self.dev.send(relative::Wheel::Vertical, notches)?;
        self.sync()
    }
}
