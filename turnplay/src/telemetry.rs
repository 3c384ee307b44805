use log::warn;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Point-in-time picture of a network, published once per decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub player: String,
    pub variables: Vec<String>,
    pub actions: Vec<String>,
    pub layers: Vec<Vec<f32>>,       // input, hidden, output activations
    pub weights: Vec<Vec<Vec<f32>>>, // input->hidden, hidden->output
}

/// A sink for network snapshots. Publishing cannot fail: a sink that loses
/// a message keeps quiet about it apart from logging.
pub trait Telemetry {
    fn publish(&mut self, snapshot: &NetworkSnapshot);
}

impl Telemetry for Vec<NetworkSnapshot> {
    fn publish(&mut self, snapshot: &NetworkSnapshot) {
        self.push(snapshot.clone());
    }
}

impl<T: Telemetry> Telemetry for Rc<RefCell<T>> {
    fn publish(&mut self, snapshot: &NetworkSnapshot) {
        self.borrow_mut().publish(snapshot);
    }
}

/// Writes one JSON object per line.
pub struct JsonLines<W: Write> {
    writer: W,
    dropped: usize,
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, dropped: 0 }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, snapshot: &NetworkSnapshot) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> Telemetry for JsonLines<W> {
    fn publish(&mut self, snapshot: &NetworkSnapshot) {
        if let Err(e) = self.write(snapshot) {
            self.dropped += 1;
            warn!("dropped network snapshot for {}: {}", snapshot.player, e);
        }
    }
}
