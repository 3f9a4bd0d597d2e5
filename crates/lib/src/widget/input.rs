//! Input field seam for the controller.

/// Pending user text. The controller reads it on submit and clears it after accepting it.
pub trait InputField {
    fn value(&self) -> &str;
    fn clear(&mut self);
}

/// A plain string buffer, as edited by egui's `TextEdit` or filled from a terminal line.
impl InputField for String {
    fn value(&self) -> &str {
        self.as_str()
    }

    fn clear(&mut self) {
        String::clear(self)
    }
}
