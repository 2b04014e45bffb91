use serde::Serialize;

/// The seats of an elected president and chancellor.
#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
pub struct Government {
    pub president: usize,
    pub chancellor: usize,
}
