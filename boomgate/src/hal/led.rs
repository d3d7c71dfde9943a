pub trait StatusLed {
    fn set(&self, on: bool);
}
