//! The table engine: per-dataset view state machine and the
//! multi-dataset session shell

pub mod edit;
pub mod reorder;
pub mod session;
pub mod state;
pub mod view;

pub use edit::{CellEdit, EditBuffer};
pub use reorder::{array_move, move_by_id};
pub use session::{ErasedTableView, TableSession};
pub use state::{DEFAULT_PAGE_SIZE, ViewState};
pub use view::{CellEditor, EditOutcome, TableView};
