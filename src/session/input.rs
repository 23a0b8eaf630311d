use std::sync::mpsc;

use crate::morse::MorseSymbol;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Symbol(MorseSymbol),
    Backspace,
    Clear,
    /// Replace the whole buffer, as from a paste.
    Text(String),
}

/// Channel between input sources (keyboard, keyer) and the practice
/// session. Events are drained in arrival order on each loop iteration.
pub struct InputQueue {
    tx: mpsc::Sender<InputEvent>,
    rx: mpsc::Receiver<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> mpsc::Sender<InputEvent> {
        self.tx.clone()
    }

    pub fn push(&self, event: InputEvent) {
        // The receiver lives as long as self, so this cannot fail.
        let _ = self.tx.send(event);
    }

    pub fn drain(&self) -> Vec<InputEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep only dot/dash characters, cut to `max_len`.
pub fn sanitize(text: &str, max_len: usize) -> String {
    text.chars()
        .filter(|ch| MorseSymbol::from_char(*ch).is_some())
        .take(max_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_order() {
        let queue = InputQueue::new();
        let tx = queue.sender();
        tx.send(InputEvent::Symbol(MorseSymbol::Dot)).unwrap();
        queue.push(InputEvent::Backspace);
        tx.send(InputEvent::Symbol(MorseSymbol::Dash)).unwrap();
        assert_eq!(
            queue.drain(),
            vec![
                InputEvent::Symbol(MorseSymbol::Dot),
                InputEvent::Backspace,
                InputEvent::Symbol(MorseSymbol::Dash),
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn sanitize_filters_and_truncates() {
        assert_eq!(sanitize(" .-x.", 2), ".-");
        assert_eq!(sanitize("", 4), "");
    }
}
