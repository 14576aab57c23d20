pub mod engine;
pub mod graph;
pub mod journal;
pub mod journal_file;
pub mod replay;
pub mod state;
pub mod types;

pub use engine::Navigator;
pub use graph::{Graph, LayoutError, ParsedLayout, parse_layout};
pub use journal::{InputJournal, InputPayload, InputRecord, layout_hash};
pub use journal_file::{JournalError, JournalWriter, load_journal};
pub use replay::*;
pub use state::{Ghost, PelletField};
pub use types::*;
